//! Multi-channel, multi-depth intensity volume.
//!
//! A [`Volume`] holds `channels x depth` planes of identical size in one
//! contiguous buffer, indexed `[channel][depth][row][col]`.
//!
//! # Memory Layout
//!
//! ```text
//! [c0 z0 plane][c0 z1 plane]...[c0 zN plane][c1 z0 plane]...
//! ```
//!
//! The buffer sits behind an [`Arc`], so cloning a volume is cheap and
//! the data can be shared with worker threads.
//!
//! # Usage
//!
//! ```rust
//! use stackview_core::Volume;
//!
//! // 2 channels, 3 depth layers, 4x4 planes
//! let vol = Volume::new(2, 3, 4, 4);
//! assert_eq!(vol.plane_len(), 16);
//! assert_eq!(vol.plane_data(1, 2).unwrap().len(), 16);
//! ```

use crate::{Error, Plane, Result};
use std::sync::Arc;

/// Immutable 4D intensity volume.
#[derive(Debug, Clone)]
pub struct Volume {
    data: Arc<Vec<f32>>,
    channels: usize,
    depth: usize,
    width: u32,
    height: u32,
}

/// `channels * depth * height * width`, or `None` on overflow.
pub fn sample_count(channels: usize, depth: usize, height: u32, width: u32) -> Option<usize> {
    channels
        .checked_mul(depth)?
        .checked_mul(height as usize)?
        .checked_mul(width as usize)
}

impl Volume {
    /// Creates a zero-filled volume.
    ///
    /// # Panics
    ///
    /// Panics if the sample count does not fit in memory, like [`Vec`].
    pub fn new(channels: usize, depth: usize, height: u32, width: u32) -> Self {
        let len = sample_count(channels, depth, height, width).unwrap_or(usize::MAX);
        Self {
            data: Arc::new(vec![0.0; len]),
            channels,
            depth,
            width,
            height,
        }
    }

    /// Creates a volume from a `c, z, y, x` ordered buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if the buffer length does not
    /// match `channels * depth * height * width`, or if that product
    /// overflows.
    pub fn from_data(
        channels: usize,
        depth: usize,
        height: u32,
        width: u32,
        data: Vec<f32>,
    ) -> Result<Self> {
        let dims = format!("{}x{}x{}x{}", channels, depth, height, width);
        let expected = sample_count(channels, depth, height, width)
            .ok_or_else(|| Error::other(format!("volume {} is too large", dims)))?;
        if data.len() != expected {
            return Err(Error::invalid_dimensions(
                dims,
                expected,
                data.len(),
            ));
        }
        Ok(Self {
            data: Arc::new(data),
            channels,
            depth,
            width,
            height,
        })
    }

    /// Builds a volume from nested planes, `planes[channel][depth]`.
    ///
    /// # Errors
    ///
    /// Fails if the outer list is empty, channels have differing depth, or
    /// the planes do not all share one shape.
    ///
    /// ```rust
    /// use stackview_core::{Plane, Volume};
    ///
    /// let vol = Volume::from_planes(vec![
    ///     vec![Plane::filled(2, 2, 0.1), Plane::filled(2, 2, 0.2)],
    ///     vec![Plane::filled(2, 2, 0.3), Plane::filled(2, 2, 0.4)],
    /// ])
    /// .unwrap();
    /// assert_eq!(vol.channels(), 2);
    /// assert_eq!(vol.depth(), 2);
    /// assert_eq!(vol.plane_data(1, 0).unwrap()[0], 0.3);
    /// ```
    pub fn from_planes(planes: Vec<Vec<Plane>>) -> Result<Self> {
        let first = planes
            .first()
            .and_then(|c| c.first())
            .ok_or_else(|| Error::other("volume needs at least one plane"))?;
        let (width, height) = first.dimensions();
        let channels = planes.len();
        let depth = planes[0].len();

        let mut data = Vec::with_capacity(channels * depth * first.len());
        for (c, layers) in planes.iter().enumerate() {
            if layers.len() != depth {
                return Err(Error::other(format!(
                    "channel {} has {} layers, expected {}",
                    c,
                    layers.len(),
                    depth
                )));
            }
            for plane in layers {
                first.ensure_same_shape(plane)?;
                data.extend_from_slice(plane.data());
            }
        }

        Self::from_data(channels, depth, height, width, data)
    }

    /// Number of channels.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of depth layers.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
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

    /// Samples per plane.
    #[inline]
    pub fn plane_len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whole `c, z, y, x` buffer.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Validates a channel index.
    pub fn check_channel(&self, channel: usize) -> Result<()> {
        if channel >= self.channels {
            return Err(Error::channel_out_of_range(channel, self.channels));
        }
        Ok(())
    }

    /// Validates a depth index.
    pub fn check_depth(&self, z: usize) -> Result<()> {
        if z >= self.depth {
            return Err(Error::depth_out_of_range(z, self.depth));
        }
        Ok(())
    }

    /// Borrows the samples of one plane.
    pub fn plane_data(&self, channel: usize, z: usize) -> Result<&[f32]> {
        self.check_channel(channel)?;
        self.check_depth(z)?;
        let len = self.plane_len();
        let start = (channel * self.depth + z) * len;
        Ok(&self.data[start..start + len])
    }

    /// Copies one plane out of the volume.
    pub fn plane(&self, channel: usize, z: usize) -> Result<Plane> {
        let data = self.plane_data(channel, z)?.to_vec();
        Plane::from_data(self.width, self.height, data)
    }

    /// Copies the planes of all channels at depth `z`, in channel order.
    pub fn layer(&self, z: usize) -> Result<Vec<Plane>> {
        (0..self.channels).map(|c| self.plane(c, z)).collect()
    }

    /// Builds a new volume holding only the listed channels, in list order.
    ///
    /// ```rust
    /// use stackview_core::{Plane, Volume};
    ///
    /// let vol = Volume::from_planes(vec![
    ///     vec![Plane::filled(1, 1, 0.1)],
    ///     vec![Plane::filled(1, 1, 0.2)],
    ///     vec![Plane::filled(1, 1, 0.3)],
    /// ])
    /// .unwrap();
    /// let picked = vol.select_channels(&[2, 0]).unwrap();
    /// assert_eq!(picked.channels(), 2);
    /// assert_eq!(picked.plane_data(0, 0).unwrap()[0], 0.3);
    /// ```
    pub fn select_channels(&self, indices: &[usize]) -> Result<Volume> {
        let chan_len = self.depth * self.plane_len();
        let mut data = Vec::with_capacity(indices.len() * chan_len);
        for &c in indices {
            self.check_channel(c)?;
            data.extend_from_slice(&self.data[c * chan_len..(c + 1) * chan_len]);
        }
        Volume::from_data(indices.len(), self.depth, self.height, self.width, data)
    }
}
