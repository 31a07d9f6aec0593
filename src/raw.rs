//! Layout of the raw pixel stream.
//!
//! The stream has no header and no framing: pixels follow each other in
//! row-major order, red first. The encoder always writes 3 bytes per pixel,
//! while the decoder reads 4 by default and ignores the last one. Decoding
//! an encoder stream therefore needs [`Stride::Packed`], otherwise every
//! fourth byte is dropped and the colors shear across the frame.

use image::Rgb;
use std::fmt;
use std::str::FromStr;

/// Payload bytes per pixel: R, G, B.
pub const CHANNELS: usize = 3;

/// Bytes consumed per pixel by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stride {
    /// R, G, B. Same layout the encoder writes.
    Packed,
    /// R, G, B and one ignored byte.
    #[default]
    Padded,
}

impl Stride {
    pub const fn bytes(self) -> usize {
        match self {
            Stride::Packed => CHANNELS,
            Stride::Padded => CHANNELS + 1,
        }
    }
}

impl FromStr for Stride {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "packed" | "3" => Ok(Stride::Packed),
            "padded" | "4" => Ok(Stride::Padded),
            _ => Err(format!("unknown stride {s:?}, expected packed or padded")),
        }
    }
}

impl fmt::Display for Stride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stride::Packed => write!(f, "packed"),
            Stride::Padded => write!(f, "padded"),
        }
    }
}

/// Reads one pixel out of a chunk of at least [`CHANNELS`] bytes; anything past
/// the blue byte is padding.
pub fn pixel_from_chunk(chunk: &[u8]) -> Rgb<u8> {
    Rgb([chunk[0], chunk[1], chunk[2]])
}

/// Size in bytes of an encoded image.
pub fn encoded_len(width: u32, height: u32) -> u64 {
    width as u64 * height as u64 * CHANNELS as u64
}

/// Bytes the decoder consumes for one full frame.
pub fn frame_len(width: u32, height: u32, stride: Stride) -> u64 {
    width as u64 * height as u64 * stride.bytes() as u64
}
