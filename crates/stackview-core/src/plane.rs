//! Single 2D intensity plane.
//!
//! A [`Plane`] is one depth layer of one channel: a row-major buffer of
//! `f32` intensities, normally normalized to `[0, 1]`.
//!
//! # Memory Layout
//!
//! ```text
//! Memory: [v v v v ...]  <- Row 0
//!         [v v v v ...]  <- Row 1
//!         ...
//! ```
//!
//! # Usage
//!
//! ```rust
//! use stackview_core::Plane;
//!
//! let mut plane = Plane::new(4, 2);
//! plane.set(1, 1, 0.5);
//! assert_eq!(plane.get(1, 1), 0.5);
//! assert_eq!(plane.len(), 8);
//! ```

use crate::{Error, Result};

/// Owned 2D plane of `f32` intensities.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    data: Vec<f32>,
    width: u32,
    height: u32,
}

impl Plane {
    /// Creates a plane filled with zeros.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, 0.0)
    }

    /// Creates a plane filled with a constant value.
    pub fn filled(width: u32, height: u32, value: f32) -> Self {
        Self {
            data: vec![value; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Creates a plane from existing row-major data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if `data.len() != width * height`.
    ///
    /// ```rust
    /// use stackview_core::Plane;
    ///
    /// let plane = Plane::from_data(2, 2, vec![0.0, 0.25, 0.5, 1.0]).unwrap();
    /// assert_eq!(plane.get(1, 1), 1.0);
    /// assert!(Plane::from_data(2, 2, vec![0.0; 3]).is_err());
    /// ```
    pub fn from_data(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(Error::invalid_dimensions(
                format!("{}x{}", width, height),
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

    /// Plane width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Plane height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` pair.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of samples (`width * height`).
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` for a zero-area plane.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major sample buffer.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable row-major sample buffer.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consumes the plane and returns its buffer.
    #[inline]
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Sample at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the plane.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Sets the sample at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the plane.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        let w = self.width as usize;
        self.data[y as usize * w + x as usize] = value;
    }

    /// Checks that `other` has the same width and height.
    pub fn ensure_same_shape(&self, other: &Plane) -> Result<()> {
        if self.dimensions() != other.dimensions() {
            return Err(Error::shape_mismatch(self.dimensions(), other.dimensions()));
        }
        Ok(())
    }

    /// Clamps every sample into `[min, max]` in place.
    ///
    /// NaN samples are left untouched.
    pub fn clamp_in_place(&mut self, min: f32, max: f32) {
        for v in &mut self.data {
            *v = v.clamp(min, max);
        }
    }

    /// Returns a new plane with `f` applied to every sample.
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Plane {
        Plane {
            data: self.data.iter().map(|&v| f(v)).collect(),
            width: self.width,
            height: self.height,
        }
    }
}
