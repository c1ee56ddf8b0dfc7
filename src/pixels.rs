//! Decoded pixel input for the extractor.

use image::{DynamicImage, GenericImageView, RgbImage};

use crate::color::Color;
use crate::error::{ColorError, Result};

/// A row-major grid of RGB samples.
///
/// The grid never changes after construction; the extractor only reads it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    samples: Vec<Color>,
}

impl PixelGrid {
    pub fn new(width: u32, height: u32, samples: Vec<Color>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(ColorError::invalid(
                "pixels",
                format!("{width}x{height} grid needs {expected} samples, got {}", samples.len()),
            ));
        }
        Ok(Self { width, height, samples })
    }

    /// Build from packed `RGBRGB...` bytes.
    pub fn from_raw_rgb(width: u32, height: u32, raw: &[u8]) -> Result<Self> {
        if raw.len() % 3 != 0 {
            return Err(ColorError::invalid(
                "pixels",
                format!("raw RGB buffer length {} is not a multiple of 3", raw.len()),
            ));
        }
        let samples = raw.chunks_exact(3).map(|c| Color::new(c[0], c[1], c[2])).collect();
        Self::new(width, height, samples)
    }

    /// Build from nested rows; all rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<Color>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if let Some((y, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(ColorError::invalid(
                "pixels",
                format!("row {y} has {} samples, expected {width}", row.len()),
            ));
        }
        let samples = rows.into_iter().flatten().collect();
        Self::new(width as u32, height as u32, samples)
    }

    /// A grid filled with one color.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            samples: vec![color; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.samples
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Samples in row-major order.
    pub fn samples(&self) -> &[Color] {
        &self.samples
    }
}

impl From<&RgbImage> for PixelGrid {
    fn from(img: &RgbImage) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            samples: img.pixels().map(|p| Color::new(p[0], p[1], p[2])).collect(),
        }
    }
}

impl From<&DynamicImage> for PixelGrid {
    /// Alpha is dropped, not composited.
    fn from(img: &DynamicImage) -> Self {
        let (w, h) = img.dimensions();
        let raw = img.to_rgb8().into_raw();
        Self {
            width: w,
            height: h,
            samples: raw.chunks_exact(3).map(|c| Color::new(c[0], c[1], c[2])).collect(),
        }
    }
}
