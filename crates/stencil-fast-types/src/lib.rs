//! Shared raster models for the stencil-fast workspace.
//!
//! This crate holds the binary mask handed between the raster front end and
//! the bridging engine, plus the RGBA codec used at that seam. Keep it free of
//! image-decoding dependencies so every crate can depend on it cheaply.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type MaskResult<T> = Result<T, MaskError>;

/// Mask value of a background pixel.
pub const BACKGROUND: u8 = 0;
/// Mask value of an ink pixel.
pub const INK: u8 = 1;

const RGBA_CHANNELS: usize = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MaskError {
    #[error("mask dimensions {width}x{height} overflow the addressable size")]
    DimensionsOverflow { width: usize, height: usize },

    #[error("buffer length mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("mask value {value} at index {index} is not binary")]
    NonBinary { index: usize, value: u8 },
}

/// Integer pixel coordinate, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PixelPoint {
    pub x: usize,
    pub y: usize,
}

impl PixelPoint {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn from_index(idx: usize, width: usize) -> Self {
        Self {
            x: idx % width,
            y: idx / width,
        }
    }

    pub fn index(&self, width: usize) -> usize {
        self.y * width + self.x
    }
}

/// Which RGBA value encodes ink when a mask crosses the RGBA boundary.
///
/// `White` treats channel 0 == 255 as ink; `Black` treats every other value
/// as ink. Encoding writes ink back with the same tone, so decoding an
/// encoded buffer yields the original mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InkTone {
    #[default]
    White,
    Black,
}

impl InkTone {
    pub fn as_str(self) -> &'static str {
        match self {
            InkTone::White => "white",
            InkTone::Black => "black",
        }
    }

    pub fn is_ink(self, channel: u8) -> bool {
        match self {
            InkTone::White => channel == u8::MAX,
            InkTone::Black => channel != u8::MAX,
        }
    }

    pub fn ink_value(self) -> u8 {
        match self {
            InkTone::White => u8::MAX,
            InkTone::Black => 0,
        }
    }

    pub fn background_value(self) -> u8 {
        u8::MAX - self.ink_value()
    }
}

#[derive(Debug)]
pub struct InkToneParseError(pub String);

impl fmt::Display for InkToneParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown ink tone '{}'", self.0)
    }
}

impl std::error::Error for InkToneParseError {}

impl FromStr for InkTone {
    type Err = InkToneParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "white" => Ok(InkTone::White),
            "black" => Ok(InkTone::Black),
            _ => Err(InkToneParseError(lower)),
        }
    }
}

/// Row-major binary raster. Every byte is either [`BACKGROUND`] or [`INK`].
#[derive(Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl fmt::Debug for BinaryMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryMask")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl BinaryMask {
    /// All-background mask.
    pub fn new(width: usize, height: usize) -> MaskResult<Self> {
        let len = pixel_count(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![BACKGROUND; len],
        })
    }

    pub fn from_vec(width: usize, height: usize, data: Vec<u8>) -> MaskResult<Self> {
        let expected = pixel_count(width, height)?;
        if data.len() != expected {
            return Err(MaskError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        if let Some((index, &value)) = data.iter().enumerate().find(|(_, v)| **v > INK) {
            return Err(MaskError::NonBinary { index, value });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_rgba(rgba: &[u8], width: usize, height: usize, tone: InkTone) -> MaskResult<Self> {
        let mut mask = Self {
            width: 0,
            height: 0,
            data: Vec::new(),
        };
        mask.decode_rgba(rgba, width, height, tone)?;
        Ok(mask)
    }

    /// Reshapes this mask to `width`x`height` and fills it from an RGBA8
    /// buffer, reusing the existing allocation where possible.
    pub fn decode_rgba(
        &mut self,
        rgba: &[u8],
        width: usize,
        height: usize,
        tone: InkTone,
    ) -> MaskResult<()> {
        let len = pixel_count(width, height)?;
        check_rgba_len(rgba, width, height)?;
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.extend(
            rgba.chunks_exact(RGBA_CHANNELS)
                .map(|px| if tone.is_ink(px[0]) { INK } else { BACKGROUND }),
        );
        debug_assert_eq!(self.data.len(), len);
        Ok(())
    }

    /// Writes the mask into an RGBA8 buffer of matching size. Alpha is always
    /// opaque.
    pub fn encode_rgba(&self, rgba: &mut [u8], tone: InkTone) -> MaskResult<()> {
        check_rgba_len(rgba, self.width, self.height)?;
        let ink = tone.ink_value();
        let background = tone.background_value();
        for (px, &value) in rgba.chunks_exact_mut(RGBA_CHANNELS).zip(self.data.iter()) {
            let tone_value = if value == INK { ink } else { background };
            px[0] = tone_value;
            px[1] = tone_value;
            px[2] = tone_value;
            px[3] = u8::MAX;
        }
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_ink(&self, idx: usize) -> bool {
        self.data[idx] == INK
    }

    pub fn get(&self, x: usize, y: usize) -> Option<bool> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y * self.width + x] == INK)
    }

    pub fn set_ink(&mut self, idx: usize) {
        self.data[idx] = INK;
    }

    pub fn set(&mut self, x: usize, y: usize, ink: bool) {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.data[y * self.width + x] = if ink { INK } else { BACKGROUND };
    }

    /// Sets every pixel of the inclusive rectangle to ink, clipped to bounds.
    pub fn fill_rect(&mut self, x0: usize, y0: usize, x1: usize, y1: usize) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let x1 = x1.min(self.width - 1);
        let y1 = y1.min(self.height - 1);
        for y in y0..=y1 {
            let row = y * self.width;
            for x in x0..=x1 {
                self.data[row + x] = INK;
            }
        }
    }

    pub fn ink_count(&self) -> usize {
        self.data.iter().filter(|&&v| v == INK).count()
    }

    pub fn point_of(&self, idx: usize) -> PixelPoint {
        PixelPoint::from_index(idx, self.width)
    }

    pub fn index_of(&self, point: PixelPoint) -> usize {
        point.index(self.width)
    }

    pub fn is_on_border(&self, idx: usize) -> bool {
        let PixelPoint { x, y } = self.point_of(idx);
        x == 0 || y == 0 || x + 1 == self.width || y + 1 == self.height
    }
}

/// `width * height`, or an error when the product does not fit in `usize`.
pub fn pixel_count(width: usize, height: usize) -> MaskResult<usize> {
    width
        .checked_mul(height)
        .ok_or(MaskError::DimensionsOverflow { width, height })
}

/// Validates that `rgba` holds exactly `width * height` RGBA8 pixels.
pub fn check_rgba_len(rgba: &[u8], width: usize, height: usize) -> MaskResult<()> {
    let expected = pixel_count(width, height)?
        .checked_mul(RGBA_CHANNELS)
        .ok_or(MaskError::DimensionsOverflow { width, height })?;
    if rgba.len() != expected {
        return Err(MaskError::SizeMismatch {
            expected,
            actual: rgba.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba_from_values(values: &[u8]) -> Vec<u8> {
        values.iter().flat_map(|&v| [v, v, v, 255]).collect()
    }

    #[test]
    fn from_vec_rejects_wrong_length() {
        let err = BinaryMask::from_vec(3, 3, vec![0; 8]).unwrap_err();
        assert_eq!(
            err,
            MaskError::SizeMismatch {
                expected: 9,
                actual: 8
            }
        );
    }

    #[test]
    fn from_vec_rejects_grayscale_values() {
        let err = BinaryMask::from_vec(2, 1, vec![1, 128]).unwrap_err();
        assert_eq!(
            err,
            MaskError::NonBinary {
                index: 1,
                value: 128
            }
        );
    }

    #[test]
    fn overflowing_dimensions_are_reported() {
        let err = BinaryMask::new(usize::MAX, 2).unwrap_err();
        assert!(matches!(err, MaskError::DimensionsOverflow { .. }));
    }

    #[test]
    fn white_tone_treats_full_channel_as_ink() {
        let rgba = rgba_from_values(&[255, 0, 254, 255]);
        let mask = BinaryMask::from_rgba(&rgba, 2, 2, InkTone::White).unwrap();
        assert_eq!(mask.data(), &[1, 0, 0, 1]);
    }

    #[test]
    fn black_tone_is_the_complement_of_white() {
        let rgba = rgba_from_values(&[255, 0, 254, 255]);
        let mask = BinaryMask::from_rgba(&rgba, 2, 2, InkTone::Black).unwrap();
        assert_eq!(mask.data(), &[0, 1, 1, 0]);
    }

    #[test]
    fn encode_writes_opaque_pixels_in_the_same_tone() {
        let mask = BinaryMask::from_vec(2, 1, vec![1, 0]).unwrap();
        let mut rgba = vec![7u8; 8];
        mask.encode_rgba(&mut rgba, InkTone::Black).unwrap();
        assert_eq!(rgba, vec![0, 0, 0, 255, 255, 255, 255, 255]);

        let decoded = BinaryMask::from_rgba(&rgba, 2, 1, InkTone::Black).unwrap();
        assert_eq!(decoded, mask);
    }

    #[test]
    fn encode_rejects_short_buffers() {
        let mask = BinaryMask::new(2, 2).unwrap();
        let mut rgba = vec![0u8; 15];
        let err = mask.encode_rgba(&mut rgba, InkTone::White).unwrap_err();
        assert_eq!(
            err,
            MaskError::SizeMismatch {
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn fill_rect_clips_to_bounds() {
        let mut mask = BinaryMask::new(4, 3).unwrap();
        mask.fill_rect(2, 1, 10, 10);
        assert_eq!(mask.ink_count(), 4);
        assert_eq!(mask.get(3, 2), Some(true));
        assert_eq!(mask.get(1, 1), Some(false));
        assert_eq!(mask.get(4, 0), None);
    }

    #[test]
    fn border_detection_covers_all_edges() {
        let mask = BinaryMask::new(4, 3).unwrap();
        assert!(mask.is_on_border(0));
        assert!(mask.is_on_border(3));
        assert!(mask.is_on_border(8));
        assert!(!mask.is_on_border(5));
        assert!(!mask.is_on_border(6));
        assert!(mask.is_on_border(7));
    }

    #[test]
    fn ink_tone_parses_case_insensitively() {
        assert_eq!("White".parse::<InkTone>().unwrap(), InkTone::White);
        assert_eq!(" black ".parse::<InkTone>().unwrap(), InkTone::Black);
        assert!("grey".parse::<InkTone>().is_err());
    }
}
