//! Final 8-bit RGB raster.

use crate::{Error, Result};

/// Interleaved `[R G B R G B ...]` 8-bit raster, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl RgbImage {
    /// Creates a black raster.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0; width as usize * height as usize * 3],
            width,
            height,
        }
    }

    /// Wraps interleaved RGB bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if `data.len() != width * height * 3`.
    pub fn from_data(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(Error::invalid_dimensions(
                format!("{}x{}x3", width, height),
                expected,
                data.len(),
            ));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Raster width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Raster height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Interleaved RGB bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the raster and returns its bytes.
    #[inline]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// `[r, g, b]` at column `x`, row `y`.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Extracts one color plane (0 = red, 1 = green, 2 = blue).
    pub fn channel(&self, c: usize) -> Vec<u8> {
        self.data.iter().skip(c).step_by(3).copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_and_channel() {
        let img = RgbImage::from_data(2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(img.pixel(1, 0), [4, 5, 6]);
        assert_eq!(img.channel(0), vec![1, 4]);
        assert_eq!(img.channel(2), vec![3, 6]);
    }

    #[test]
    fn test_from_data_checks_len() {
        assert!(RgbImage::from_data(2, 2, vec![0; 11]).is_err());
    }
}
