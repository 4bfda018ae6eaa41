//! Per-channel display configuration.
//!
//! A [`ChannelConfig`] is a snapshot of the user-controlled settings of one
//! channel: its display color, contrast window and visibility. The engine
//! only ever reads these; callers build a fresh snapshot for each render.
//!
//! ```rust
//! use stackview_core::{ChannelConfig, Rgb8};
//!
//! let cfg = ChannelConfig::with_index(2);
//! assert_eq!(cfg.shortname, "Channel 2");
//! assert_eq!(cfg.color, Rgb8::WHITE);
//! assert_eq!((cfg.low, cfg.high), (0.0, 1.0));
//! assert!(cfg.visible);
//! ```

use crate::{Error, Result};
use std::fmt;

/// 8-bit display color of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "[u8; 3]", into = "[u8; 3]"))]
pub struct Rgb8 {
    /// Red component.
    pub r: u8,
    /// Green component.
    pub g: u8,
    /// Blue component.
    pub b: u8,
}

impl Rgb8 {
    /// Pure white, the fallback color.
    pub const WHITE: Rgb8 = Rgb8::new(255, 255, 255);

    /// Creates a color from components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses six hex digits `RRGGBB` (no prefix).
    ///
    /// ```rust
    /// use stackview_core::Rgb8;
    ///
    /// assert_eq!(Rgb8::from_hex("00FF80").unwrap(), Rgb8::new(0, 255, 128));
    /// assert!(Rgb8::from_hex("00FF8").is_err());
    /// ```
    pub fn from_hex(hex: &str) -> Result<Self> {
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(Error::other(format!("invalid RRGGBB color: {:?}", hex)));
        }
        let v = u32::from_str_radix(hex, 16)
            .map_err(|e| Error::other(format!("invalid RRGGBB color {:?}: {}", hex, e)))?;
        Ok(Self::new(
            ((v >> 16) & 0xff) as u8,
            ((v >> 8) & 0xff) as u8,
            (v & 0xff) as u8,
        ))
    }

    /// Per-component weights `c / 255`.
    #[inline]
    pub fn weights(&self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

impl Default for Rgb8 {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[u8; 3]> for Rgb8 {
    fn from(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

impl From<Rgb8> for [u8; 3] {
    fn from(c: Rgb8) -> Self {
        [c.r, c.g, c.b]
    }
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Display settings of one channel.
///
/// `low` and `high` carry no ordering constraint: `high <= low` switches the
/// window into threshold mode.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelConfig {
    /// Display color.
    pub color: Rgb8,
    /// Lower window bound.
    pub low: f32,
    /// Upper window bound.
    pub high: f32,
    /// Whether the channel contributes to the composite.
    pub visible: bool,
    /// Short display name.
    pub shortname: String,
}

impl ChannelConfig {
    /// Default configuration for the channel at `index`.
    pub fn with_index(index: usize) -> Self {
        Self {
            color: Rgb8::WHITE,
            low: 0.0,
            high: 1.0,
            visible: true,
            shortname: format!("Channel {}", index),
        }
    }

    /// Builder-style color override.
    pub fn color(mut self, color: Rgb8) -> Self {
        self.color = color;
        self
    }

    /// Builder-style window override.
    pub fn window(mut self, low: f32, high: f32) -> Self {
        self.low = low;
        self.high = high;
        self
    }

    /// Builder-style visibility override.
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Returns `true` when `high <= low`.
    #[inline]
    pub fn is_threshold(&self) -> bool {
        !(self.high > self.low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip_display() {
        let c = Rgb8::from_hex("1a2B3c").unwrap();
        assert_eq!(c, Rgb8::new(0x1a, 0x2b, 0x3c));
        assert_eq!(c.to_string(), "1A2B3C");
    }

    #[test]
    fn test_hex_rejects_garbage() {
        assert!(Rgb8::from_hex("GG0000").is_err());
        assert!(Rgb8::from_hex("#00000").is_err());
        assert!(Rgb8::from_hex("").is_err());
    }

    #[test]
    fn test_weights() {
        let w = Rgb8::new(255, 0, 51).weights();
        assert_eq!(w[0], 1.0);
        assert_eq!(w[1], 0.0);
        approx::assert_abs_diff_eq!(w[2], 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_builder() {
        let cfg = ChannelConfig::with_index(0)
            .color(Rgb8::new(255, 0, 0))
            .window(0.6, 0.2)
            .visible(false);
        assert!(cfg.is_threshold());
        assert!(!cfg.visible);
        assert_eq!(cfg.shortname, "Channel 0");
    }
}
