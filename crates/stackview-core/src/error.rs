//! Error types for stackview-core operations.
//!
//! The [`Error`] enum covers the failure modes of building and slicing the
//! core buffers:
//! - Buffer length vs. declared dimensions
//! - Plane shape mismatches between operands
//! - Channel/depth indices outside the volume
//!
//! # Usage
//!
//! ```rust
//! use stackview_core::{Error, Result};
//!
//! fn check_depth(z: usize, depth: usize) -> Result<()> {
//!     if z >= depth {
//!         return Err(Error::depth_out_of_range(z, depth));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or accessing core buffers.
#[derive(Debug, Error)]
pub enum Error {
    /// Buffer length does not match the declared dimensions.
    ///
    /// Returned by constructors such as [`crate::Plane::from_data`] and
    /// [`crate::Volume::from_data`].
    #[error("invalid dimensions {dims}: expected {expected} samples, got {got}")]
    InvalidDimensions {
        /// Declared dimensions, formatted for display
        dims: String,
        /// Sample count implied by the dimensions
        expected: usize,
        /// Sample count actually supplied
        got: usize,
    },

    /// Two planes that must share a shape do not.
    #[error("shape mismatch: {a_width}x{a_height} vs {b_width}x{b_height}")]
    ShapeMismatch {
        /// First plane width
        a_width: u32,
        /// First plane height
        a_height: u32,
        /// Second plane width
        b_width: u32,
        /// Second plane height
        b_height: u32,
    },

    /// Channel index is outside the volume.
    #[error("channel {index} out of range for volume with {channels} channels")]
    ChannelOutOfRange {
        /// Requested channel
        index: usize,
        /// Channel count of the volume
        channels: usize,
    },

    /// Depth index is outside the volume.
    #[error("depth {index} out of range for volume with {depth} layers")]
    DepthOutOfRange {
        /// Requested depth layer
        index: usize,
        /// Depth of the volume
        depth: usize,
    },

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(dims: impl Into<String>, expected: usize, got: usize) -> Self {
        Self::InvalidDimensions {
            dims: dims.into(),
            expected,
            got,
        }
    }

    /// Creates an [`Error::ShapeMismatch`] error.
    #[inline]
    pub fn shape_mismatch(a: (u32, u32), b: (u32, u32)) -> Self {
        Self::ShapeMismatch {
            a_width: a.0,
            a_height: a.1,
            b_width: b.0,
            b_height: b.1,
        }
    }

    /// Creates an [`Error::ChannelOutOfRange`] error.
    #[inline]
    pub fn channel_out_of_range(index: usize, channels: usize) -> Self {
        Self::ChannelOutOfRange { index, channels }
    }

    /// Creates an [`Error::DepthOutOfRange`] error.
    #[inline]
    pub fn depth_out_of_range(index: usize, depth: usize) -> Self {
        Self::DepthOutOfRange { index, depth }
    }

    /// Creates an [`Error::Other`] error.
    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Returns `true` if this is an index-related error.
    #[inline]
    pub fn is_range_error(&self) -> bool {
        matches!(
            self,
            Self::ChannelOutOfRange { .. } | Self::DepthOutOfRange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_dimensions() {
        let err = Error::invalid_dimensions("2x3", 6, 5);
        let msg = err.to_string();
        assert!(msg.contains("2x3"));
        assert!(msg.contains('6'));
        assert!(msg.contains('5'));
        assert!(!err.is_range_error());
    }

    #[test]
    fn test_shape_mismatch() {
        let err = Error::shape_mismatch((100, 100), (200, 50));
        let msg = err.to_string();
        assert!(msg.contains("100x100"));
        assert!(msg.contains("200x50"));
    }

    #[test]
    fn test_range_errors() {
        assert!(Error::channel_out_of_range(3, 2).is_range_error());
        assert!(Error::depth_out_of_range(9, 4).is_range_error());
        assert!(Error::depth_out_of_range(9, 4).to_string().contains("4 layers"));
    }
}
