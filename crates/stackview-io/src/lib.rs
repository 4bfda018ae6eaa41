//! # stackview-io
//!
//! Loading and export for stackview:
//!
//! - **Volumes** - multi-page grayscale TIFF stacks and headerless raw files
//! - **Display metadata** - per-channel color, window and visibility from
//!   sidecar XML
//! - **Display settings** - YAML override files
//! - **Export** - 8-bit RGB rasters as PNG, TIFF or JPEG
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use stackview_io::{read_tiff_stack, read_display_settings, write};
//!
//! let volume = read_tiff_stack("cells.tif", 3)?;
//! let meta = read_display_settings("cells.xml")?;
//! let volume = meta.select(&volume)?;
//! // ... render with stackview-ops ...
//! write("cells.png", &image)?;
//! ```
//!
//! # Feature Flags
//!
//! - `png` - PNG export (default)
//! - `jpeg` - JPEG export (default)
//! - `tiff` - TIFF stacks and export (default)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod detect;
mod error;
pub mod metadata;
pub mod raw;
pub mod settings;

#[cfg(feature = "png")]
pub mod png;

#[cfg(feature = "jpeg")]
pub mod jpeg;

#[cfg(feature = "tiff")]
pub mod tiff;

pub use detect::Format;
pub use error::{IoError, IoResult};
pub use metadata::{parse_display_settings, read_display_settings, ChannelEntry, DisplayMetadata};
pub use raw::{read as read_raw, RawLayout, SampleType};
pub use settings::{ChannelOverride, DisplaySettings};

#[cfg(feature = "tiff")]
pub use tiff::read_stack as read_tiff_stack;

use stackview_core::RgbImage;
use std::path::Path;
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Writes a raster, picking the encoder from the file extension.
///
/// # Errors
///
/// Returns [`IoError::UnsupportedFormat`] for extensions other than
/// `png`, `tif`/`tiff` and `jpg`/`jpeg`, or when the matching feature is
/// disabled.
pub fn write<P: AsRef<Path>>(path: P, image: &RgbImage) -> IoResult<()> {
    let path = path.as_ref();
    let format = Format::from_extension(path);
    trace!(path = %path.display(), ?format, "write");

    match format {
        #[cfg(feature = "png")]
        Format::Png => png::write(path, image),

        #[cfg(feature = "jpeg")]
        Format::Jpeg => jpeg::write(path, image),

        #[cfg(feature = "tiff")]
        Format::Tiff => tiff::write(path, image),

        _ => Err(IoError::UnsupportedFormat(
            path.extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
                .to_string(),
        )),
    }
}
