use crate::config::EncodeConfig;
use crate::error::{Error, Result};
use crate::pixel::{ChannelLayout, PixelSource};
use crate::raw::encoded_len;
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct EncodeSummary {
    pub width: u32,
    pub height: u32,
    pub layout: ChannelLayout,
    pub bytes: u64,
}

/// Writes R, G, B for every pixel with nothing in between. Returns the byte
/// count.
pub fn encode_image(source: &PixelSource, out: impl Write) -> Result<u64> {
    let mut writer = BufWriter::new(out);
    let mut written = 0u64;

    for rgb in source.rows() {
        writer.write_all(&rgb)?;
        written += rgb.len() as u64;
    }

    writer.flush()?;
    Ok(written)
}

pub fn encode_file(input: &Path, config: &EncodeConfig) -> Result<EncodeSummary> {
    let image = image::open(input).map_err(|source| Error::ImageLoad {
        path: input.to_path_buf(),
        source,
    })?;

    let source = PixelSource::from_image(image)?;
    let (width, height) = source.dimensions();
    tracing::debug!(
        "{} is {}x{} {}",
        input.display(),
        width,
        height,
        source.layout()
    );

    let file = std::fs::File::create(&config.output).map_err(|source| Error::CreateFile {
        path: config.output.clone(),
        source,
    })?;

    let bytes = encode_image(&source, file)?;
    debug_assert_eq!(bytes, encoded_len(width, height));
    tracing::info!("wrote {} bytes to {}", bytes, config.output.display());

    Ok(EncodeSummary {
        width,
        height,
        layout: source.layout(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, Rgb, RgbImage, Rgba, RgbaImage};

    fn random_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |_, _| {
            Rgb([fastrand::u8(..), fastrand::u8(..), fastrand::u8(..)])
        })
    }

    #[test]
    fn test_byte_layout() {
        fastrand::seed(0);

        let (w, h) = (7, 5);
        let img = random_image(w, h);
        let src = PixelSource::Rgb(img.clone());

        let mut out = Vec::new();
        let n = encode_image(&src, &mut out).unwrap();

        assert_eq!(n, encoded_len(w, h));
        assert_eq!(out.len() as u64, n);

        for (x, y, p) in img.enumerate_pixels() {
            for c in 0..3 {
                assert_eq!(out[(3 * (y * w + x) + c) as usize], p.0[c as usize]);
            }
        }
    }

    #[test]
    fn test_rgba_matches_rgb() {
        fastrand::seed(1);

        let rgb = random_image(6, 4);
        let rgba = RgbaImage::from_fn(6, 4, |x, y| {
            let [r, g, b] = rgb.get_pixel(x, y).0;
            Rgba([r, g, b, fastrand::u8(..)])
        });

        let mut out_rgb = Vec::new();
        let mut out_rgba = Vec::new();
        encode_image(&PixelSource::Rgb(rgb), &mut out_rgb).unwrap();
        encode_image(&PixelSource::Rgba(rgba), &mut out_rgba).unwrap();

        assert_eq!(out_rgb, out_rgba);
    }

    #[test]
    fn test_encode_file() {
        fastrand::seed(2);

        let dir = std::env::temp_dir().join(format!("rawframes_encode_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let img = random_image(9, 3);
        let input = dir.join("in.png");
        img.save(&input).unwrap();

        let config = EncodeConfig {
            output: dir.join("image.dat"),
        };
        let summary = encode_file(&input, &config).unwrap();

        assert_eq!((summary.width, summary.height), (9, 3));
        assert_eq!(summary.layout, ChannelLayout::Rgb);
        assert_eq!(summary.bytes, 81);

        let data = std::fs::read(&config.output).unwrap();
        assert_eq!(data, img.into_raw());

        let gray = dir.join("gray.png");
        DynamicImage::ImageLuma8(GrayImage::new(2, 2))
            .save(&gray)
            .unwrap();
        let gray_config = EncodeConfig {
            output: dir.join("gray.dat"),
        };
        assert!(matches!(
            encode_file(&gray, &gray_config),
            Err(Error::UnsupportedColor { .. })
        ));
        assert!(!gray_config.output.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_input() {
        let res = encode_file(
            Path::new("does/not/exist.png"),
            &EncodeConfig {
                output: std::env::temp_dir().join("rawframes_never_written.dat"),
            },
        );
        assert!(matches!(res, Err(Error::ImageLoad { .. })));
    }
}
