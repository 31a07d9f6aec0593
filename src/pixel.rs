use crate::error::{Error, Result};
use image::{DynamicImage, RgbImage, RgbaImage};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    Rgb,
    Rgba,
}

impl fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelLayout::Rgb => write!(f, "rgb"),
            ChannelLayout::Rgba => write!(f, "rgba"),
        }
    }
}

/// Decoded image with its channel layout fixed up front.
pub enum PixelSource {
    Rgb(RgbImage),
    /// Alpha is kept in the buffer but never read out.
    Rgba(RgbaImage),
}

impl PixelSource {
    /// Picks the layout from the channel count of the decoded image. Sample
    /// types wider than 8 bits are narrowed; luma images are refused.
    pub fn from_image(image: DynamicImage) -> Result<Self> {
        let color = image.color();
        match color.channel_count() {
            3 => Ok(PixelSource::Rgb(image.into_rgb8())),
            4 => Ok(PixelSource::Rgba(image.into_rgba8())),
            _ => Err(Error::UnsupportedColor { color }),
        }
    }

    pub fn layout(&self) -> ChannelLayout {
        match self {
            PixelSource::Rgb(_) => ChannelLayout::Rgb,
            PixelSource::Rgba(_) => ChannelLayout::Rgba,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            PixelSource::Rgb(img) => img.dimensions(),
            PixelSource::Rgba(img) => img.dimensions(),
        }
    }

    pub fn rgb_at(&self, x: u32, y: u32) -> [u8; 3] {
        match self {
            PixelSource::Rgb(img) => img.get_pixel(x, y).0,
            PixelSource::Rgba(img) => {
                let [r, g, b, _a] = img.get_pixel(x, y).0;
                [r, g, b]
            }
        }
    }

    /// Every pixel, y outer and x inner.
    pub fn rows(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        let (width, height) = self.dimensions();
        (0..height).flat_map(move |y| (0..width).map(move |x| self.rgb_at(x, y)))
    }
}
