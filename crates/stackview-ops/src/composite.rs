//! False-color channel compositing.
//!
//! Turns one plane per channel into an RGB raster:
//!
//! ```text
//! rgb = 0
//! for each channel i (storage order):
//!     w = window(layer[i], low[i], high[i])
//!     if visible[i]: rgb += (r/255, g/255, b/255) * w
//! rgb = clamp(rgb, 0, 1)
//! out = round(rgb * 255)
//! ```
//!
//! Channel contributions accumulate; the only clamp happens after the last
//! channel, so a sum above 1 saturates to 255 whatever the channel order.
//!
//! # Example
//!
//! ```rust
//! use stackview_core::{ChannelConfig, Plane, Rgb8};
//! use stackview_ops::composite::composite;
//!
//! let layer = Plane::filled(2, 2, 0.5);
//! let cfg = ChannelConfig::with_index(0).color(Rgb8::new(255, 0, 0));
//! let img = composite(&[layer], &[cfg]).unwrap();
//! assert_eq!(img.pixel(0, 0), [128, 0, 0]);
//! ```

use crate::window::Window;
use crate::{OpsError, OpsResult};
use stackview_core::{ChannelConfig, Plane, RgbImage};
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Planar floating-point RGB accumulator.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbAccumulator {
    planes: [Vec<f32>; 3],
    width: u32,
    height: u32,
}

impl RgbAccumulator {
    /// Zeroed accumulator.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            planes: [vec![0.0; len], vec![0.0; len], vec![0.0; len]],
            width,
            height,
        }
    }

    /// Adds `weights[k] * windowed` to plane `k`.
    pub fn add_weighted(&mut self, windowed: &[f32], weights: [f32; 3]) {
        for (plane, w) in self.planes.iter_mut().zip(weights) {
            for (acc, &v) in plane.iter_mut().zip(windowed) {
                *acc += w * v;
            }
        }
    }

    /// Clamps every plane into `[0, 1]`.
    pub fn clamp(&mut self) {
        for plane in &mut self.planes {
            for v in plane.iter_mut() {
                *v = v.clamp(0.0, 1.0);
            }
        }
    }

    /// Interleaves into 8-bit RGB with `round(v * 255)`.
    pub fn to_rgb8(&self) -> OpsResult<RgbImage> {
        let [r, g, b] = &self.planes;
        let mut data = Vec::with_capacity(r.len() * 3);
        for i in 0..r.len() {
            data.push(to_u8(r[i]));
            data.push(to_u8(g[i]));
            data.push(to_u8(b[i]));
        }
        Ok(RgbImage::from_data(self.width, self.height, data)?)
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v * 255.0).round() as u8
}

/// Validates that layers and configs line up.
fn check_inputs(layers: &[Plane], configs: &[ChannelConfig]) -> OpsResult<(u32, u32)> {
    if layers.len() != configs.len() {
        return Err(OpsError::ChannelCountMismatch {
            layers: layers.len(),
            configs: configs.len(),
        });
    }
    let first = layers
        .first()
        .ok_or_else(|| OpsError::InvalidParameter("no channel layers to composite".into()))?;
    for layer in &layers[1..] {
        first.ensure_same_shape(layer)?;
    }
    Ok(first.dimensions())
}

/// Composites into a clamped floating-point accumulator.
///
/// # Errors
///
/// - [`OpsError::ChannelCountMismatch`] if `layers.len() != configs.len()`
/// - [`OpsError::InvalidParameter`] if there are no layers
/// - [`OpsError::Core`] if the layers differ in shape
pub fn composite_linear(layers: &[Plane], configs: &[ChannelConfig]) -> OpsResult<RgbAccumulator> {
    let (width, height) = check_inputs(layers, configs)?;
    trace!(channels = layers.len(), width, height, "composite::composite_linear");

    let mut acc = RgbAccumulator::new(width, height);
    let mut scratch = vec![0.0f32; width as usize * height as usize];

    for (i, (layer, cfg)) in layers.iter().zip(configs).enumerate() {
        if !cfg.visible {
            debug!(channel = i, name = %cfg.shortname, "channel hidden");
            continue;
        }
        scratch.copy_from_slice(layer.data());
        Window::from_config(cfg).apply_in_place(&mut scratch);
        acc.add_weighted(&scratch, cfg.color.weights());
    }

    acc.clamp();
    Ok(acc)
}

/// Composites channel layers into an 8-bit RGB raster.
pub fn composite(layers: &[Plane], configs: &[ChannelConfig]) -> OpsResult<RgbImage> {
    composite_linear(layers, configs)?.to_rgb8()
}
