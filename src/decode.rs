use crate::config::DecodeConfig;
use crate::error::{Error, Result};
use crate::raw::{frame_len, pixel_from_chunk, Stride};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageError, ImageResult, Rgb, RgbImage};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

/// One frame being filled in row-major order.
pub struct FrameBuffer {
    img: RgbImage,
    background: Rgb<u8>,
    cursor: u64,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32, background: Rgb<u8>) -> Self {
        Self {
            img: RgbImage::from_pixel(width, height, background),
            background,
            cursor: 0,
        }
    }

    /// Places `pixel` at the next free position. Returns true once the last
    /// one is filled; pushing into a full buffer is a bug.
    pub fn push(&mut self, pixel: Rgb<u8>) -> bool {
        let width = self.img.width() as u64;
        let (x, y) = (self.cursor % width, self.cursor / width);
        self.img.put_pixel(x as u32, y as u32, pixel);
        self.cursor += 1;
        self.is_full()
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    pub fn len(&self) -> u64 {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    pub fn capacity(&self) -> u64 {
        self.img.width() as u64 * self.img.height() as u64
    }

    pub fn frame(&self) -> &RgbImage {
        &self.img
    }

    pub fn reset(&mut self) {
        for p in self.img.pixels_mut() {
            *p = self.background;
        }
        self.cursor = 0;
    }
}

/// Receives every completed frame, numbered from 0.
pub trait FrameSink {
    fn emit(&mut self, index: u32, frame: &RgbImage) -> Result<()>;
}

/// Saves frame `n` as `<dir>/image<n>.png`.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| Error::CreateFile {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn frame_path(&self, index: u32) -> PathBuf {
        self.dir.join(format!("image{}.png", index))
    }
}

impl FrameSink for DirectorySink {
    fn emit(&mut self, index: u32, frame: &RgbImage) -> Result<()> {
        let path = self.frame_path(index);

        write_or_remove(&path, |bufwriter| {
            frame.write_with_encoder(PngEncoder::new_with_quality(
                bufwriter,
                CompressionType::Default,
                FilterType::Adaptive,
            ))
        })?;

        tracing::info!("saved frame {} to {}", index, path.display());
        Ok(())
    }
}

/// Creates `path` and runs `write` on it. On failure the file is removed so
/// no truncated frame is left behind.
fn write_or_remove(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> ImageResult<()>,
) -> Result<()> {
    let file_writer = File::create(path).map_err(|source| Error::CreateFile {
        path: path.to_path_buf(),
        source,
    })?;
    let mut bufwriter = BufWriter::new(file_writer);

    let written =
        write(&mut bufwriter).and_then(|()| bufwriter.flush().map_err(ImageError::IoError));

    if let Err(source) = written {
        drop(bufwriter);
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!("could not remove {}: {}", path.display(), e);
        }
        return Err(Error::ImageSave {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    pub frames: u32,
    pub pixels: u64,
    /// Pixels of a trailing frame that never filled up.
    pub dropped: u64,
}

/// Fills `len` bytes of `buf`, or returns `Ok(false)` when the stream ends
/// first. A short final chunk is discarded.
fn read_chunk(input: &mut impl Read, buf: &mut [u8]) -> Result<bool> {
    match input.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}

pub fn decode_stream(
    mut input: impl Read,
    config: &DecodeConfig,
    sink: &mut impl FrameSink,
) -> Result<DecodeSummary> {
    config.validate()?;

    let mut summary = DecodeSummary::default();
    if config.max_frames == 0 {
        return Ok(summary);
    }

    tracing::debug!(
        "decoding {}x{} frames, {} stride ({} bytes per frame), at most {} frames",
        config.width,
        config.height,
        config.stride,
        frame_len(config.width, config.height, config.stride),
        config.max_frames
    );

    let mut buffer = FrameBuffer::new(config.width, config.height, config.background);
    let mut chunk = [0u8; Stride::Padded.bytes()];
    let chunk = &mut chunk[..config.stride.bytes()];

    while read_chunk(&mut input, chunk)? {
        summary.pixels += 1;
        if !buffer.push(pixel_from_chunk(chunk)) {
            continue;
        }

        sink.emit(summary.frames, buffer.frame())?;
        buffer.reset();
        summary.frames += 1;

        if summary.frames == config.max_frames {
            tracing::info!("reached the {} frame limit", config.max_frames);
            break;
        }
    }

    if !buffer.is_empty() {
        summary.dropped = buffer.len();
        tracing::warn!(
            "stream ended mid-frame, dropping {} of {} pixels",
            buffer.len(),
            buffer.capacity()
        );
    }

    Ok(summary)
}

pub fn decode_file(config: &DecodeConfig) -> Result<DecodeSummary> {
    config.validate()?;

    let file = std::fs::File::open(&config.input)?;
    let mut sink = DirectorySink::new(&config.output_dir)?;

    let summary = decode_stream(BufReader::new(file), config, &mut sink)?;
    tracing::info!(
        "{} frames written to {} ({} pixels read)",
        summary.frames,
        config.output_dir.display(),
        summary.pixels
    );

    Ok(summary)
}
