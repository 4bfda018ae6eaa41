//! Photo-editing style blend modes for folding depth layers.
//!
//! Each [`BlendMode`] maps to one pure per-element kernel `f(base, overlay)`.
//! Dispatch goes through [`BlendMode::kernel`], an exhaustive `match`, so a
//! new variant cannot compile without its formula.
//!
//! # Numeric policy
//!
//! - Every formula with a division adds [`EPSILON`] to the divisor instead
//!   of checking for zero. Results may saturate far outside `[0, 1]`.
//! - Kernels do not clamp. [`blend_step`] and [`blend_clamped`] clamp each
//!   result into `[0, 1]` before it is used as the next base.
//! - Masked modes compute both branches and select per element, which keeps
//!   the loops branch-free.
//!
//! # Example
//!
//! ```rust
//! use stackview_ops::blend::{blend_clamped, BlendMode};
//! use stackview_core::Plane;
//!
//! let a = Plane::filled(2, 2, 0.5);
//! let b = Plane::filled(2, 2, 0.0);
//!
//! // 0.5 / (0 + 1e-5) saturates and clamps back to 1.0
//! let out = blend_clamped(BlendMode::Divide, &a, &b).unwrap();
//! assert!(out.data().iter().all(|&v| v == 1.0));
//! ```

use crate::{OpsError, OpsResult};
use stackview_core::Plane;
use std::fmt;
use std::str::FromStr;
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Additive guard used by every dividing formula.
pub const EPSILON: f32 = 1e-5;

/// Per-element blend kernel `f(base, overlay)`.
pub type BlendKernel = fn(f32, f32) -> f32;

/// Blend mode used when folding depth layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    /// `max(b, o)`.
    #[default]
    Maximum,
    /// `min(b, o)`.
    Minimum,
    /// `b * o`.
    Multiply,
    /// `1 - (1 - b)(1 - o)`.
    Screen,
    /// `1 - (1 - b) / (o + e)`.
    ColorBurn,
    /// `b / (1 - o + e)`.
    ColorDodge,
    /// `o + b - 1`.
    LinearBurn,
    /// `o + b`.
    LinearDodge,
    /// Multiply/screen switched on the base value.
    Overlay,
    /// Multiply/screen switched on the overlay value.
    HardLight,
    /// Soft contrast switched on the overlay value.
    SoftLight,
    /// Burn/dodge switched on the overlay value.
    VividLight,
    /// `2o + b - 1`.
    LinearLight,
    /// Darken/lighten switched on the overlay value.
    PinLight,
    /// `1` where `o + b >= 1`, else `0`.
    HardMix,
    /// `|b - o|`.
    Difference,
    /// `o + b - 2ob`.
    Exclusion,
    /// `b - o`.
    Subtract,
    /// `b / (o + e)`.
    Divide,
}

impl BlendMode {
    /// All modes in menu order.
    pub const ALL: [BlendMode; 19] = [
        Self::Maximum,
        Self::Minimum,
        Self::Screen,
        Self::ColorBurn,
        Self::ColorDodge,
        Self::LinearBurn,
        Self::LinearDodge,
        Self::Overlay,
        Self::HardLight,
        Self::SoftLight,
        Self::VividLight,
        Self::LinearLight,
        Self::PinLight,
        Self::HardMix,
        Self::Difference,
        Self::Exclusion,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
    ];

    /// Human-readable name, as shown in menus and stored in settings.
    pub fn name(self) -> &'static str {
        match self {
            Self::Maximum => "Maximum (Lighten)",
            Self::Minimum => "Minimum (Darken)",
            Self::Multiply => "Multiply",
            Self::Screen => "Screen",
            Self::ColorBurn => "Color Burn",
            Self::ColorDodge => "Color Dodge",
            Self::LinearBurn => "Linear Burn",
            Self::LinearDodge => "Linear Dodge",
            Self::Overlay => "Overlay",
            Self::HardLight => "Hard Light",
            Self::SoftLight => "Soft Light",
            Self::VividLight => "Vivid Light",
            Self::LinearLight => "Linear Light",
            Self::PinLight => "Pin Light",
            Self::HardMix => "Hard Mix",
            Self::Difference => "Difference",
            Self::Exclusion => "Exclusion",
            Self::Subtract => "Subtract",
            Self::Divide => "Divide",
        }
    }

    /// Short command-line identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::Maximum => "maximum",
            Self::Minimum => "minimum",
            Self::Multiply => "multiply",
            Self::Screen => "screen",
            Self::ColorBurn => "color-burn",
            Self::ColorDodge => "color-dodge",
            Self::LinearBurn => "linear-burn",
            Self::LinearDodge => "linear-dodge",
            Self::Overlay => "overlay",
            Self::HardLight => "hard-light",
            Self::SoftLight => "soft-light",
            Self::VividLight => "vivid-light",
            Self::LinearLight => "linear-light",
            Self::PinLight => "pin-light",
            Self::HardMix => "hard-mix",
            Self::Difference => "difference",
            Self::Exclusion => "exclusion",
            Self::Subtract => "subtract",
            Self::Divide => "divide",
        }
    }

    /// Per-element kernel for this mode.
    pub fn kernel(self) -> BlendKernel {
        match self {
            Self::Maximum => maximum,
            Self::Minimum => minimum,
            Self::Multiply => multiply,
            Self::Screen => screen,
            Self::ColorBurn => color_burn,
            Self::ColorDodge => color_dodge,
            Self::LinearBurn => linear_burn,
            Self::LinearDodge => linear_dodge,
            Self::Overlay => overlay,
            Self::HardLight => hard_light,
            Self::SoftLight => soft_light,
            Self::VividLight => vivid_light,
            Self::LinearLight => linear_light,
            Self::PinLight => pin_light,
            Self::HardMix => hard_mix,
            Self::Difference => difference,
            Self::Exclusion => exclusion,
            Self::Subtract => subtract,
            Self::Divide => divide,
        }
    }

    /// Looks a mode up by display name or command-line id.
    ///
    /// Display names match exactly; ids match case-insensitively. The
    /// legacy spelling `Substract` is accepted for [`BlendMode::Subtract`].
    ///
    /// ```rust
    /// use stackview_ops::BlendMode;
    ///
    /// assert_eq!(BlendMode::from_name("Color Burn").unwrap(), BlendMode::ColorBurn);
    /// assert_eq!(BlendMode::from_name("HARD-LIGHT").unwrap(), BlendMode::HardLight);
    /// assert!(BlendMode::from_name("Normal").is_err());
    /// ```
    pub fn from_name(name: &str) -> OpsResult<Self> {
        if name == "Substract" {
            return Ok(Self::Subtract);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name() == name || m.id().eq_ignore_ascii_case(name))
            .ok_or_else(|| OpsError::UnknownBlendMode(name.to_string()))
    }
}

impl FromStr for BlendMode {
    type Err = OpsError;

    fn from_str(s: &str) -> OpsResult<Self> {
        Self::from_name(s)
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Kernels
// ============================================================================

#[inline(always)]
fn select(mask: bool, if_true: f32, if_false: f32) -> f32 {
    if mask { if_true } else { if_false }
}

#[inline]
fn maximum(b: f32, o: f32) -> f32 {
    b.max(o)
}

#[inline]
fn minimum(b: f32, o: f32) -> f32 {
    b.min(o)
}

#[inline]
fn multiply(b: f32, o: f32) -> f32 {
    b * o
}

#[inline]
fn screen(b: f32, o: f32) -> f32 {
    1.0 - (1.0 - b) * (1.0 - o)
}

#[inline]
fn color_burn(b: f32, o: f32) -> f32 {
    1.0 - (1.0 - b) / (o + EPSILON)
}

#[inline]
fn color_dodge(b: f32, o: f32) -> f32 {
    b / (1.0 - o + EPSILON)
}

#[inline]
fn linear_burn(b: f32, o: f32) -> f32 {
    o + b - 1.0
}

#[inline]
fn linear_dodge(b: f32, o: f32) -> f32 {
    o + b
}

// Mask is taken on the base here, unlike hard light.
#[inline]
fn overlay(b: f32, o: f32) -> f32 {
    let lo = 2.0 * o * b;
    let hi = 1.0 - 2.0 * (1.0 - o) * (1.0 - b);
    select(b <= 0.5, lo, hi)
}

#[inline]
fn hard_light(b: f32, o: f32) -> f32 {
    let lo = 2.0 * o * b;
    let hi = 1.0 - 2.0 * (1.0 - o) * (1.0 - b);
    select(o <= 0.5, lo, hi)
}

#[inline]
fn soft_light(b: f32, o: f32) -> f32 {
    let lo = 2.0 * o * b + b * b * (1.0 - 2.0 * o);
    let hi = 2.0 * b * (1.0 - o) + b.sqrt() * (2.0 * o - 1.0);
    select(o <= 0.5, lo, hi)
}

#[inline]
fn vivid_light(b: f32, o: f32) -> f32 {
    let lo = 1.0 + (b - 1.0) / (2.0 * o + EPSILON);
    let hi = b / (2.0 * (1.0 - o) + EPSILON);
    select(o <= 0.5, lo, hi)
}

#[inline]
fn linear_light(b: f32, o: f32) -> f32 {
    2.0 * o + b - 1.0
}

#[inline]
fn pin_light(b: f32, o: f32) -> f32 {
    let lo = (2.0 * o).min(b);
    let hi = (2.0 * (o - 0.5)).max(b);
    select(o <= 0.5, lo, hi)
}

#[inline]
fn hard_mix(b: f32, o: f32) -> f32 {
    select(o + b >= 1.0, 1.0, 0.0)
}

#[inline]
fn difference(b: f32, o: f32) -> f32 {
    (b - o).abs()
}

#[inline]
fn exclusion(b: f32, o: f32) -> f32 {
    o + b - 2.0 * o * b
}

#[inline]
fn subtract(b: f32, o: f32) -> f32 {
    b - o
}

#[inline]
fn divide(b: f32, o: f32) -> f32 {
    b / (o + EPSILON)
}

// ============================================================================
// Plane-level operations
// ============================================================================

/// Blends two samples with `mode` and clamps the result into `[0, 1]`.
///
/// ```rust
/// use stackview_ops::blend::{blend_value, BlendMode};
///
/// assert_eq!(blend_value(BlendMode::Screen, 0.5, 0.5), 0.75);
/// assert_eq!(blend_value(BlendMode::LinearDodge, 0.7, 0.6), 1.0);
/// ```
#[inline]
pub fn blend_value(mode: BlendMode, base: f32, overlay: f32) -> f32 {
    mode.kernel()(base, overlay).clamp(0.0, 1.0)
}

/// Applies `mode` elementwise without clamping.
///
/// # Errors
///
/// Returns [`OpsError::Core`] with a shape mismatch if the planes differ in size.
pub fn apply(mode: BlendMode, base: &Plane, overlay: &Plane) -> OpsResult<Plane> {
    trace!(mode = %mode, w = base.width(), h = base.height(), "blend::apply");
    base.ensure_same_shape(overlay)?;

    let f = mode.kernel();
    let data = base
        .data()
        .iter()
        .zip(overlay.data())
        .map(|(&b, &o)| f(b, o))
        .collect();
    Ok(Plane::from_data(base.width(), base.height(), data)?)
}

/// Applies `mode` elementwise and clamps the result into `[0, 1]`.
pub fn blend_clamped(mode: BlendMode, base: &Plane, overlay: &Plane) -> OpsResult<Plane> {
    let mut out = apply(mode, base, overlay)?;
    out.clamp_in_place(0.0, 1.0);
    Ok(out)
}

/// One fold step: `acc = clamp(mode(acc, overlay))`, in place.
///
/// # Errors
///
/// Returns [`OpsError::SizeMismatch`] if the slices differ in length.
pub fn blend_step(mode: BlendMode, acc: &mut [f32], overlay: &[f32]) -> OpsResult<()> {
    if acc.len() != overlay.len() {
        return Err(OpsError::SizeMismatch(format!(
            "accumulator has {} samples, overlay has {}",
            acc.len(),
            overlay.len()
        )));
    }

    let f = mode.kernel();
    for (b, &o) in acc.iter_mut().zip(overlay) {
        *b = f(*b, o).clamp(0.0, 1.0);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn grid() -> Vec<f32> {
        (0..=20).map(|i| i as f32 / 20.0).collect()
    }

    #[test]
    fn test_names_roundtrip() {
        for mode in BlendMode::ALL {
            assert_eq!(BlendMode::from_name(mode.name()).unwrap(), mode);
            assert_eq!(mode.id().parse::<BlendMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_all_modes_distinct() {
        let mut seen = std::collections::HashSet::new();
        for mode in BlendMode::ALL {
            assert!(seen.insert(mode), "{} listed twice", mode);
        }
        assert_eq!(seen.len(), 19);
    }

    #[test]
    fn test_unknown_name_rejected() {
        let err = BlendMode::from_name("Normal").unwrap_err();
        assert!(matches!(err, OpsError::UnknownBlendMode(ref n) if n == "Normal"));
        // display names are exact
        assert!(BlendMode::from_name("color burn").is_err());
        assert!(BlendMode::from_name("").is_err());
    }

    #[test]
    fn test_legacy_subtract_spelling() {
        assert_eq!(BlendMode::from_name("Substract").unwrap(), BlendMode::Subtract);
    }

    #[test]
    fn test_idempotence_spot_checks() {
        for a in grid() {
            assert_eq!(maximum(a, a), a);
            assert_eq!(minimum(a, a), a);
            assert_eq!(multiply(a, 1.0), a);
            // 1 - (1 - a) rounds once in f32
            assert_abs_diff_eq!(screen(a, 0.0), a, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_clamp_closure_all_modes() {
        let g = grid();
        for mode in BlendMode::ALL {
            for &b in &g {
                for &o in &g {
                    let v = blend_value(mode, b, o);
                    assert!(
                        (0.0..=1.0).contains(&v),
                        "{} ({}, {}) -> {}",
                        mode,
                        b,
                        o,
                        v
                    );
                }
            }
        }
    }

    #[test]
    fn test_divide_near_zero_saturates() {
        assert!(divide(0.5, 0.0) > 1000.0);
        assert_eq!(blend_value(BlendMode::Divide, 0.5, 0.0), 1.0);
        assert_eq!(blend_value(BlendMode::Divide, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_color_burn_and_dodge() {
        // o = 0 burns everything below white to black
        assert_eq!(blend_value(BlendMode::ColorBurn, 0.9, 0.0), 0.0);
        assert_abs_diff_eq!(color_burn(0.5, 1.0), 1.0 - 0.5 / (1.0 + EPSILON), epsilon = 1e-7);
        assert_abs_diff_eq!(color_dodge(0.25, 0.5), 0.25 / (0.5 + EPSILON), epsilon = 1e-7);
        assert_eq!(blend_value(BlendMode::ColorDodge, 0.25, 1.0), 1.0);
    }

    #[test]
    fn test_overlay_masks_on_base_hard_light_on_overlay() {
        // b = 0.8 (> 0.5), o = 0.2 (<= 0.5): the two modes take different branches
        let (b, o) = (0.8, 0.2);
        assert_abs_diff_eq!(overlay(b, o), 1.0 - 2.0 * 0.8 * 0.2, epsilon = 1e-6);
        assert_abs_diff_eq!(hard_light(b, o), 2.0 * 0.2 * 0.8, epsilon = 1e-6);
        assert_ne!(overlay(b, o), hard_light(b, o));
    }

    #[test]
    fn test_mask_boundary_is_inclusive() {
        // o == 0.5 takes the "<=" branch
        assert_abs_diff_eq!(hard_light(0.4, 0.5), 2.0 * 0.5 * 0.4, epsilon = 1e-7);
        assert_abs_diff_eq!(pin_light(0.9, 0.5), 0.9_f32.min(1.0), epsilon = 1e-7);
        assert_abs_diff_eq!(overlay(0.5, 0.3), 2.0 * 0.3 * 0.5, epsilon = 1e-7);
    }

    #[test]
    fn test_soft_light_branches() {
        assert_abs_diff_eq!(soft_light(0.25, 0.25), 2.0 * 0.25 * 0.25 + 0.0625 * 0.5, epsilon = 1e-7);
        assert_abs_diff_eq!(soft_light(0.25, 0.75), 2.0 * 0.25 * 0.25 + 0.5 * 0.5, epsilon = 1e-7);
    }

    #[test]
    fn test_vivid_light_branches() {
        assert_eq!(blend_value(BlendMode::VividLight, 0.5, 0.0), 0.0);
        assert_abs_diff_eq!(vivid_light(0.3, 0.75), 0.3 / (0.5 + EPSILON), epsilon = 1e-6);
        assert_eq!(blend_value(BlendMode::VividLight, 0.3, 1.0), 1.0);
    }

    #[test]
    fn test_pin_light() {
        assert_eq!(pin_light(0.9, 0.25), 0.5);
        assert_eq!(pin_light(0.1, 0.25), 0.1);
        assert_eq!(pin_light(0.1, 0.75), 0.5);
        assert_eq!(pin_light(0.9, 0.75), 0.9);
    }

    #[test]
    fn test_hard_mix_threshold() {
        assert_eq!(hard_mix(0.5, 0.5), 1.0);
        assert_eq!(hard_mix(0.5, 0.49), 0.0);
        assert_eq!(hard_mix(0.0, 1.0), 1.0);
    }

    #[test]
    fn test_linear_modes() {
        assert_abs_diff_eq!(linear_burn(0.7, 0.6), 0.3, epsilon = 1e-6);
        assert_abs_diff_eq!(linear_light(0.2, 0.6), 0.4, epsilon = 1e-6);
        assert_eq!(blend_value(BlendMode::LinearBurn, 0.2, 0.3), 0.0);
        assert_eq!(blend_value(BlendMode::Subtract, 0.2, 0.3), 0.0);
    }

    #[test]
    fn test_difference_exclusion() {
        assert_abs_diff_eq!(difference(0.2, 0.7), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(exclusion(0.5, 0.5), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_apply_keeps_unclamped_values() {
        let a = Plane::filled(2, 1, 0.8);
        let b = Plane::filled(2, 1, 0.7);
        let raw = apply(BlendMode::LinearDodge, &a, &b).unwrap();
        assert!(raw.data().iter().all(|&v| v > 1.0));
        let clamped = blend_clamped(BlendMode::LinearDodge, &a, &b).unwrap();
        assert!(clamped.data().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_apply_shape_mismatch() {
        let a = Plane::new(2, 2);
        let b = Plane::new(2, 3);
        assert!(matches!(
            apply(BlendMode::Multiply, &a, &b),
            Err(OpsError::Core(_))
        ));
    }

    #[test]
    fn test_blend_step_in_place() {
        let mut acc = vec![0.2, 0.9];
        blend_step(BlendMode::Maximum, &mut acc, &[0.5, 0.1]).unwrap();
        assert_eq!(acc, vec![0.5, 0.9]);
        assert!(blend_step(BlendMode::Maximum, &mut acc, &[0.5]).is_err());
    }
}
