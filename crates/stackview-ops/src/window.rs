//! Per-channel contrast window.
//!
//! A [`Window`] stretches the `[low, high]` intensity range linearly onto
//! `[0, 1]` and clamps everything outside. When `high <= low` the window is
//! degenerate and becomes a binary threshold at `high`; `low` is ignored in
//! that case.
//!
//! # Example
//!
//! ```rust
//! use stackview_ops::window::Window;
//!
//! let w = Window::new(0.2, 0.6);
//! assert_eq!(w.apply_value(0.2), 0.0);
//! assert_eq!(w.apply_value(0.6), 1.0);
//! assert_eq!(w.apply_value(0.9), 1.0);
//!
//! // degenerate: threshold at high = 0.3
//! let t = Window::new(0.5, 0.3);
//! assert_eq!(t.apply_value(0.31), 1.0);
//! assert_eq!(t.apply_value(0.3), 0.0);
//! ```

use stackview_core::{ChannelConfig, Plane};

/// Contrast window parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    /// Lower bound, maps to 0.
    pub low: f32,
    /// Upper bound, maps to 1 (threshold level when `high <= low`).
    pub high: f32,
}

impl Window {
    /// Creates a window. No ordering is required between the bounds.
    pub fn new(low: f32, high: f32) -> Self {
        Self { low, high }
    }

    /// Window of a channel configuration.
    pub fn from_config(cfg: &ChannelConfig) -> Self {
        Self::new(cfg.low, cfg.high)
    }

    /// Identity window `[0, 1]`.
    pub fn identity() -> Self {
        Self::new(0.0, 1.0)
    }

    /// Returns `true` when the window acts as a threshold.
    #[inline]
    pub fn is_threshold(&self) -> bool {
        !(self.high > self.low)
    }

    /// Maps one sample.
    #[inline]
    pub fn apply_value(&self, x: f32) -> f32 {
        if self.is_threshold() {
            threshold(x, self.high)
        } else {
            stretch(x, self.low, self.high - self.low)
        }
    }

    /// Maps a buffer in place.
    pub fn apply_in_place(&self, data: &mut [f32]) {
        if self.is_threshold() {
            let t = self.high;
            for v in data.iter_mut() {
                *v = threshold(*v, t);
            }
        } else {
            let (low, span) = (self.low, self.high - self.low);
            for v in data.iter_mut() {
                *v = stretch(*v, low, span);
            }
        }
    }

    /// Returns a windowed copy of `layer`.
    pub fn apply(&self, layer: &Plane) -> Plane {
        let mut out = layer.clone();
        self.apply_in_place(out.data_mut());
        out
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::identity()
    }
}

#[inline(always)]
fn stretch(x: f32, low: f32, span: f32) -> f32 {
    ((x - low) / span).clamp(0.0, 1.0)
}

#[inline(always)]
fn threshold(x: f32, high: f32) -> f32 {
    if x > high { 1.0 } else { 0.0 }
}

/// Windows `layer` with `[low, high]`.
///
/// Shorthand for `Window::new(low, high).apply(layer)`.
pub fn window(layer: &Plane, low: f32, high: f32) -> Plane {
    Window::new(low, high).apply(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ramp(n: u32) -> Plane {
        let data = (0..n).map(|i| i as f32 / (n - 1) as f32).collect();
        Plane::from_data(n, 1, data).unwrap()
    }

    #[test]
    fn test_endpoints_exact() {
        for (low, high) in [(0.0, 1.0), (0.1, 0.7), (0.33, 0.34), (-0.5, 2.0)] {
            let w = Window::new(low, high);
            assert_eq!(w.apply_value(low), 0.0);
            assert_eq!(w.apply_value(high), 1.0);
        }
    }

    #[test]
    fn test_monotone_and_clamped() {
        let w = Window::new(0.25, 0.75);
        let out = w.apply(&ramp(101));
        for pair in out.data().windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        assert_eq!(out.data()[0], 0.0);
        assert_eq!(out.data()[100], 1.0);
        assert_abs_diff_eq!(out.data()[50], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_identity_window_preserves_unit_data() {
        let src = ramp(11);
        let out = Window::identity().apply(&src);
        assert_eq!(out, src);
    }

    #[test]
    fn test_degenerate_is_binary() {
        for (low, high) in [(0.5, 0.5), (0.8, 0.2), (1.0, 0.0)] {
            let out = window(&ramp(51), low, high);
            for (&x, &y) in ramp(51).data().iter().zip(out.data()) {
                assert!(y == 0.0 || y == 1.0);
                assert_eq!(y == 1.0, x > high);
            }
        }
    }

    #[test]
    fn test_degenerate_ignores_low() {
        let a = Window::new(0.9, 0.4);
        let b = Window::new(100.0, 0.4);
        for x in [0.0, 0.39, 0.4, 0.41, 1.0] {
            assert_eq!(a.apply_value(x), b.apply_value(x));
        }
    }

    #[test]
    fn test_from_config() {
        let cfg = ChannelConfig::with_index(0).window(0.1, 0.2);
        assert_eq!(Window::from_config(&cfg), Window::new(0.1, 0.2));
    }
}
