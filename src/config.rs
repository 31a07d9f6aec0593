use crate::error::{Error, Result};
use crate::raw::{Stride, CHANNELS};
use image::Rgb;
use std::path::PathBuf;

pub const ENCODE_OUTPUT: &str = "image.dat";

pub const DECODE_INPUT: &str = "recording.dat";
pub const DECODE_OUTPUT_DIR: &str = "images";

pub const FRAME_WIDTH: u32 = 1920;
pub const FRAME_HEIGHT: u32 = 1080;

/// Decoding stops once this many frames are written, even with input left.
pub const MAX_FRAMES: u32 = 200;

pub const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

#[derive(Debug, Clone)]
pub struct EncodeConfig {
    pub output: PathBuf,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(ENCODE_OUTPUT),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecodeConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub width: u32,
    pub height: u32,
    pub max_frames: u32,
    pub stride: Stride,
    /// Color of pixels not yet written in the current frame.
    pub background: Rgb<u8>,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DECODE_INPUT),
            output_dir: PathBuf::from(DECODE_OUTPUT_DIR),
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            max_frames: MAX_FRAMES,
            stride: Stride::default(),
            background: BACKGROUND,
        }
    }
}

impl DecodeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidParameter {
                name: "resolution",
                reason: format!("{}x{} frame has no pixels", self.width, self.height),
            });
        }

        let bytes = (self.width as u64)
            .checked_mul(self.height as u64)
            .and_then(|pixels| pixels.checked_mul(CHANNELS as u64))
            .and_then(|bytes| usize::try_from(bytes).ok());
        if bytes.is_none() {
            return Err(Error::InvalidParameter {
                name: "resolution",
                reason: format!(
                    "{}x{} frame does not fit in memory",
                    self.width, self.height
                ),
            });
        }
        Ok(())
    }
}

/// Parses a `RRGGBB` hex color, with or without a leading `#`.
pub fn parse_color(s: &str) -> std::result::Result<Rgb<u8>, String> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format!("expected RRGGBB, got {s:?}"));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("bad color {s:?}: {e}"))
    };

    Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}
