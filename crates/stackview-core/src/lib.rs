//! # stackview-core
//!
//! Core types for displaying multi-channel, multi-depth microscopy volumes.
//!
//! This crate provides the foundational types used throughout the stackview
//! workspace:
//!
//! - [`Plane`] - One 2D intensity plane (row-major `f32`)
//! - [`Volume`] - 4D intensity volume indexed `[channel][depth][row][col]`
//! - [`ChannelConfig`], [`Rgb8`] - Per-channel display settings
//! - [`RgbImage`] - Final 8-bit RGB raster
//!
//! ## Crate Structure
//!
//! This crate has no internal dependencies. The other crates build on it:
//!
//! ```text
//! stackview-core (this crate)
//!    ^
//!    |
//!    +-- stackview-ops (blend, window, merge, composite, histogram)
//!    +-- stackview-io (metadata, volume readers, raster export)
//!    +-- stackview-cli
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - Enable serialization for [`ChannelConfig`] and [`Rgb8`]

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod channel;
pub mod error;
pub mod plane;
pub mod raster;
pub mod volume;

pub use channel::{ChannelConfig, Rgb8};
pub use error::{Error, Result};
pub use plane::Plane;
pub use raster::RgbImage;
pub use volume::Volume;

/// Prelude module for convenient imports.
///
/// ```
/// use stackview_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::channel::{ChannelConfig, Rgb8};
    pub use crate::error::{Error, Result};
    pub use crate::plane::Plane;
    pub use crate::raster::RgbImage;
    pub use crate::volume::Volume;
}
