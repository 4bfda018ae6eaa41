//! YAML display settings files.
//!
//! A settings file overrides sidecar metadata field by field:
//!
//! ```yaml
//! mode: "Maximum (Lighten)"
//! merge: [0, 4]
//! depth: 2
//! channels:
//!   - index: 0
//!     low: 0.1
//!     high: 0.8
//!     visible: true
//!     color: [255, 0, 0]
//!     shortname: DAPI
//! ```
//!
//! Channel `index` refers to the volume channel, the same index a
//! [`ChannelEntry`] carries.

use crate::metadata::ChannelEntry;
use crate::{IoError, IoResult};
use serde::{Deserialize, Serialize};
use stackview_core::Rgb8;
use std::path::Path;
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Per-channel overrides. Unset fields leave the current value alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelOverride {
    /// Volume channel index.
    pub index: usize,
    /// Lower window bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f32>,
    /// Upper window bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f32>,
    /// Visibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    /// Display color as `[r, g, b]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb8>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortname: Option<String>,
}

impl ChannelOverride {
    /// Applies the set fields to `entry`.
    pub fn apply(&self, entry: &mut ChannelEntry) {
        let cfg = &mut entry.config;
        if let Some(low) = self.low {
            cfg.low = low;
        }
        if let Some(high) = self.high {
            cfg.high = high;
        }
        if let Some(visible) = self.visible {
            cfg.visible = visible;
        }
        if let Some(color) = self.color {
            cfg.color = color;
        }
        if let Some(name) = &self.shortname {
            cfg.shortname = name.clone();
        }
    }
}

/// Contents of a display settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplaySettings {
    /// Blend mode name used for merging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Merge range `[start, end]`; enables merging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge: Option<[usize; 2]>,
    /// Depth layer shown when not merging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,
    /// Channel overrides.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<ChannelOverride>,
}

impl DisplaySettings {
    /// Parses settings from YAML text.
    pub fn from_yaml(text: &str) -> IoResult<Self> {
        serde_yaml::from_str(text).map_err(|e| IoError::Parse(format!("display settings: {}", e)))
    }

    /// Serializes settings to YAML.
    pub fn to_yaml(&self) -> IoResult<String> {
        serde_yaml::to_string(self).map_err(|e| IoError::EncodeError(e.to_string()))
    }

    /// Reads a settings file.
    pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&text)
    }

    /// Applies every channel override to the entry with the same index.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Parse`] if an override names a channel that is not
    /// among `entries`.
    pub fn apply_to(&self, entries: &mut [ChannelEntry]) -> IoResult<()> {
        trace!(overrides = self.channels.len(), "settings::apply_to");
        for ov in &self.channels {
            let entry = entries
                .iter_mut()
                .find(|e| e.index == ov.index)
                .ok_or_else(|| {
                    IoError::Parse(format!(
                        "display settings: no channel {} in the volume display list",
                        ov.index
                    ))
                })?;
            ov.apply(entry);
            debug!(channel = ov.index, "channel override applied");
        }
        Ok(())
    }
}
