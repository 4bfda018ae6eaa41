//! Render entry point.
//!
//! A [`Session`] owns a loaded volume and its histogram index. Each call to
//! [`Session::render`] takes an immutable [`DisplaySnapshot`] and runs the
//! whole pipeline: select or merge the depth layer, then composite.
//!
//! # Example
//!
//! ```rust
//! use stackview_core::{ChannelConfig, Plane, Rgb8, Volume};
//! use stackview_ops::session::{DisplaySnapshot, LayerSelection, Session};
//!
//! let vol = Volume::from_planes(vec![vec![Plane::filled(2, 2, 1.0)]]).unwrap();
//! let session = Session::new(vol).unwrap();
//!
//! let snapshot = DisplaySnapshot {
//!     channels: vec![ChannelConfig::with_index(0).color(Rgb8::new(0, 255, 0))],
//!     selection: LayerSelection::Depth(0),
//! };
//! let img = session.render(&snapshot).unwrap();
//! assert_eq!(img.pixel(1, 1), [0, 255, 0]);
//! ```

use crate::blend::BlendMode;
use crate::composite::composite;
use crate::histogram::HistogramIndex;
use crate::merge::{merge_all, MergeRange};
use crate::{OpsError, OpsResult};
use stackview_core::{ChannelConfig, RgbImage, Volume};
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Which depth data feeds the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerSelection {
    /// One depth layer.
    Depth(usize),
    /// A z-range folded with a blend mode.
    Merge {
        /// Directed depth range.
        range: MergeRange,
        /// Blend mode used for folding.
        mode: BlendMode,
    },
}

impl LayerSelection {
    /// Builds a selection from UI-style inputs.
    ///
    /// The mode name is validated even when merging is disabled, so a bad
    /// name never reaches the pipeline.
    pub fn resolve(
        merge_enabled: bool,
        depth: usize,
        range: MergeRange,
        mode_name: &str,
    ) -> OpsResult<Self> {
        let mode = BlendMode::from_name(mode_name)?;
        Ok(if merge_enabled {
            Self::Merge { range, mode }
        } else {
            Self::Depth(depth)
        })
    }
}

impl Default for LayerSelection {
    fn default() -> Self {
        Self::Depth(0)
    }
}

/// Display state for one render.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplaySnapshot {
    /// One config per volume channel, in storage order.
    pub channels: Vec<ChannelConfig>,
    /// Layer or merge to display.
    pub selection: LayerSelection,
}

impl DisplaySnapshot {
    /// Default configs for `channels` channels at depth 0.
    pub fn with_defaults(channels: usize) -> Self {
        Self {
            channels: (0..channels).map(ChannelConfig::with_index).collect(),
            selection: LayerSelection::default(),
        }
    }
}

/// A loaded volume ready for rendering.
#[derive(Debug, Clone)]
pub struct Session {
    volume: Volume,
    histograms: HistogramIndex,
}

impl Session {
    /// Takes ownership of `volume` and computes its histograms.
    pub fn new(volume: Volume) -> OpsResult<Self> {
        let histograms = HistogramIndex::compute(&volume)?;
        Ok(Self { volume, histograms })
    }

    /// The loaded volume.
    #[inline]
    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    /// Per-layer histograms.
    #[inline]
    pub fn histograms(&self) -> &HistogramIndex {
        &self.histograms
    }

    /// Renders one snapshot into an RGB raster.
    ///
    /// # Errors
    ///
    /// Fails without output when the channel configs do not match the
    /// volume or the selected depth is out of range.
    pub fn render(&self, snapshot: &DisplaySnapshot) -> OpsResult<RgbImage> {
        trace!(selection = ?snapshot.selection, "session::render");
        if snapshot.channels.len() != self.volume.channels() {
            return Err(OpsError::ChannelCountMismatch {
                layers: self.volume.channels(),
                configs: snapshot.channels.len(),
            });
        }

        let layers = match snapshot.selection {
            LayerSelection::Depth(z) => self.volume.layer(z)?,
            LayerSelection::Merge { range, mode } => {
                debug!(range = %range, mode = %mode, "merging before composite");
                merge_all(&self.volume, range, mode)?
            }
        };
        composite(&layers, &snapshot.channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackview_core::{Plane, Rgb8};

    fn two_layer_session() -> Session {
        let vol = Volume::from_planes(vec![
            vec![Plane::filled(2, 1, 0.2), Plane::filled(2, 1, 0.8)],
            vec![Plane::filled(2, 1, 1.0), Plane::filled(2, 1, 0.0)],
        ])
        .unwrap();
        Session::new(vol).unwrap()
    }

    fn snapshot(selection: LayerSelection) -> DisplaySnapshot {
        DisplaySnapshot {
            channels: vec![
                ChannelConfig::with_index(0).color(Rgb8::new(255, 0, 0)),
                ChannelConfig::with_index(1).color(Rgb8::new(0, 0, 255)),
            ],
            selection,
        }
    }

    #[test]
    fn test_resolve_validates_mode_name() {
        let range = MergeRange::new(0, 1);
        assert!(matches!(
            LayerSelection::resolve(false, 0, range, "Lighten"),
            Err(OpsError::UnknownBlendMode(_))
        ));
        assert_eq!(
            LayerSelection::resolve(false, 1, range, "Screen").unwrap(),
            LayerSelection::Depth(1)
        );
        assert_eq!(
            LayerSelection::resolve(true, 1, range, "Substract").unwrap(),
            LayerSelection::Merge { range, mode: BlendMode::Subtract }
        );
    }

    #[test]
    fn test_render_depth() {
        let s = two_layer_session();
        let img = s.render(&snapshot(LayerSelection::Depth(1))).unwrap();
        assert_eq!(img.pixel(0, 0), [204, 0, 0]);
    }

    #[test]
    fn test_render_merge() {
        let s = two_layer_session();
        let sel = LayerSelection::Merge {
            range: MergeRange::new(0, 1),
            mode: BlendMode::Maximum,
        };
        let img = s.render(&snapshot(sel)).unwrap();
        assert_eq!(img.pixel(1, 0), [204, 0, 255]);
    }

    #[test]
    fn test_render_rejects_bad_snapshot() {
        let s = two_layer_session();
        assert!(s.render(&snapshot(LayerSelection::Depth(2))).is_err());
        assert!(matches!(
            s.render(&DisplaySnapshot::with_defaults(3)),
            Err(OpsError::ChannelCountMismatch { layers: 2, configs: 3 })
        ));
    }

    #[test]
    fn test_histograms_computed_on_load() {
        let s = two_layer_session();
        assert_eq!(s.histograms().depth(), 2);
        assert_eq!(s.histograms().get(0, 1).unwrap().bins()[255], 2);
    }
}
