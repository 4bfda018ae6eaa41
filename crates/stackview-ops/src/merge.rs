//! Z-stack merging.
//!
//! Folds a range of depth layers of one channel into a single plane:
//!
//! ```text
//! acc = layer[start]
//! for z in start+step ..= end:   (step = +1 or -1)
//!     acc = clamp(blend(mode, acc, layer[z]), 0, 1)
//! ```
//!
//! The direction of the range is kept as given. Most blend modes are not
//! commutative, so `(0, 2)` and `(2, 0)` generally produce different
//! planes.
//!
//! # Example
//!
//! ```rust
//! use stackview_core::{Plane, Volume};
//! use stackview_ops::merge::{merge, MergeRange};
//! use stackview_ops::BlendMode;
//!
//! let vol = Volume::from_planes(vec![vec![
//!     Plane::filled(2, 2, 0.2),
//!     Plane::filled(2, 2, 0.9),
//!     Plane::filled(2, 2, 0.4),
//! ]])
//! .unwrap();
//!
//! let range = MergeRange::new(0, 2);
//! assert_eq!(range.depths().collect::<Vec<_>>(), vec![0, 1, 2]);
//!
//! let merged = merge(&vol, 0, range, BlendMode::Maximum).unwrap();
//! assert_eq!(merged.data()[0], 0.9);
//! ```

use crate::blend::{blend_step, BlendMode};
use crate::{OpsError, OpsResult};
use stackview_core::{Plane, Volume};
use std::fmt;
#[allow(unused_imports)]
use tracing::{debug, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Inclusive, directed range of depth indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MergeRange {
    /// First layer, the initial accumulator.
    pub start: usize,
    /// Last layer folded in.
    pub end: usize,
}

impl MergeRange {
    /// Creates a range; `start > end` iterates downwards.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Single-layer range.
    pub fn single(z: usize) -> Self {
        Self::new(z, z)
    }

    /// `+1` for ascending, `-1` for descending, `0` for a single layer.
    pub fn step(&self) -> isize {
        match self.start.cmp(&self.end) {
            std::cmp::Ordering::Less => 1,
            std::cmp::Ordering::Greater => -1,
            std::cmp::Ordering::Equal => 0,
        }
    }

    /// Returns `true` if the range covers one layer.
    #[inline]
    pub fn is_single(&self) -> bool {
        self.start == self.end
    }

    /// Number of layers visited.
    #[inline]
    pub fn len(&self) -> usize {
        self.start.abs_diff(self.end) + 1
    }

    /// Always `false`: a range visits at least one layer.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Depth indices in visiting order.
    pub fn depths(&self) -> Depths {
        Depths {
            next: Some(self.start),
            end: self.end,
            step: self.step(),
        }
    }

    /// Checks both endpoints against the volume depth.
    pub fn validate(&self, depth: usize) -> OpsResult<()> {
        for z in [self.start, self.end] {
            if z >= depth {
                return Err(stackview_core::Error::depth_out_of_range(z, depth).into());
            }
        }
        Ok(())
    }
}

impl fmt::Display for MergeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

impl std::str::FromStr for MergeRange {
    type Err = OpsError;

    /// Parses `START:END` or a single `Z`.
    fn from_str(s: &str) -> OpsResult<Self> {
        let parse = |v: &str| {
            v.trim()
                .parse::<usize>()
                .map_err(|e| OpsError::InvalidParameter(format!("merge range {:?}: {}", s, e)))
        };
        match s.split_once(':') {
            Some((a, b)) => Ok(Self::new(parse(a)?, parse(b)?)),
            None => Ok(Self::single(parse(s)?)),
        }
    }
}

/// Iterator over the depths of a [`MergeRange`].
#[derive(Debug, Clone)]
pub struct Depths {
    next: Option<usize>,
    end: usize,
    step: isize,
}

impl Iterator for Depths {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let z = self.next?;
        self.next = if z == self.end {
            None
        } else {
            z.checked_add_signed(self.step)
        };
        Some(z)
    }
}

/// Merges `range` of one channel with `mode`.
///
/// A single-layer range returns that layer unchanged.
///
/// # Errors
///
/// Fails if `channel` or either range endpoint is outside the volume.
pub fn merge(
    volume: &Volume,
    channel: usize,
    range: MergeRange,
    mode: BlendMode,
) -> OpsResult<Plane> {
    trace!(channel, range = %range, mode = %mode, "merge::merge");
    volume.check_channel(channel)?;
    range.validate(volume.depth())?;

    let mut acc = volume.plane(channel, range.start)?;
    if range.is_single() {
        return Ok(acc);
    }

    for z in range.depths().skip(1) {
        blend_step(mode, acc.data_mut(), volume.plane_data(channel, z)?)?;
    }
    debug!(channel, layers = range.len(), "merged z-range");
    Ok(acc)
}

/// Merges `range` of every channel, in channel storage order.
///
/// Channels are independent; with the `parallel` feature they are merged
/// concurrently, giving the same planes as the sequential loop.
pub fn merge_all(volume: &Volume, range: MergeRange, mode: BlendMode) -> OpsResult<Vec<Plane>> {
    trace!(channels = volume.channels(), range = %range, mode = %mode, "merge::merge_all");
    range.validate(volume.depth())?;

    #[cfg(feature = "parallel")]
    let planes = (0..volume.channels())
        .into_par_iter()
        .map(|c| merge(volume, c, range, mode))
        .collect::<OpsResult<Vec<_>>>();

    #[cfg(not(feature = "parallel"))]
    let planes = (0..volume.channels())
        .map(|c| merge(volume, c, range, mode))
        .collect::<OpsResult<Vec<_>>>();

    planes
}
