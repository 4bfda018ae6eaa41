//! # stackview-ops
//!
//! Display pipeline for multi-channel microscopy volumes.
//!
//! # Modules
//!
//! - [`blend`] - The 19 layer blend modes
//! - [`window`] - Per-channel contrast window / threshold
//! - [`merge`] - Folding a z-range of one channel with a blend mode
//! - [`composite`] - False-color compositing into an RGB raster
//! - [`histogram`] - Per-layer, per-channel intensity histograms
//! - [`session`] - Owns a volume and renders display snapshots
//!
//! # Pipeline
//!
//! ```text
//! Volume --+--> HistogramIndex (once, at load)
//!          |
//!          +--> layer(z) or merge_all(range, mode)
//!                 --> window per channel
//!                 --> color + accumulate
//!                 --> clamp, round --> RgbImage
//! ```
//!
//! # Example
//!
//! ```rust
//! use stackview_core::{Plane, Volume};
//! use stackview_ops::session::{DisplaySnapshot, LayerSelection, Session};
//! use stackview_ops::{BlendMode, MergeRange};
//!
//! let vol = Volume::from_planes(vec![vec![
//!     Plane::filled(4, 4, 0.2),
//!     Plane::filled(4, 4, 0.6),
//! ]])
//! .unwrap();
//! let session = Session::new(vol).unwrap();
//!
//! let mut snapshot = DisplaySnapshot::with_defaults(1);
//! snapshot.selection = LayerSelection::Merge {
//!     range: MergeRange::new(0, 1),
//!     mode: BlendMode::Maximum,
//! };
//! let img = session.render(&snapshot).unwrap();
//! assert_eq!(img.pixel(0, 0), [153, 153, 153]);
//! ```
//!
//! # Feature Flags
//!
//! - `parallel` (default) - merge channels and compute histograms with rayon

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod blend;
pub mod composite;
pub mod histogram;
pub mod merge;
pub mod session;
pub mod window;

pub use blend::BlendMode;
pub use composite::composite;
pub use error::{OpsError, OpsResult};
pub use histogram::{Histogram, HistogramIndex};
pub use merge::{merge, merge_all, MergeRange};
pub use session::{DisplaySnapshot, LayerSelection, Session};
pub use window::Window;
