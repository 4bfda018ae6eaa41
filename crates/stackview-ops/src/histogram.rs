//! Per-layer intensity histograms.
//!
//! Every (depth, channel) plane gets 256 bins with edges `i / 255`:
//! bin `i < 255` counts `[i/255, (i+1)/255)`, bin 255 counts `[1, inf)`.
//! Values below zero and NaN fall into bin 0, so the bin total always equals
//! the pixel count.
//!
//! The index is computed once per volume and never changes afterwards.

use crate::OpsResult;
use stackview_core::Volume;
use std::sync::OnceLock;
#[allow(unused_imports)]
use tracing::{debug, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Number of bins per histogram.
pub const BINS: usize = 256;

/// Log decades mapped onto the display height.
const DISPLAY_DECADES: f32 = 6.0;

fn edges() -> &'static [f32; BINS] {
    static EDGES: OnceLock<[f32; BINS]> = OnceLock::new();
    EDGES.get_or_init(|| std::array::from_fn(|i| i as f32 / 255.0))
}

/// Bin of one sample.
#[inline]
pub fn bin_index(v: f32) -> usize {
    if !(v >= 0.0) {
        return 0;
    }
    // first edge strictly above v, minus one
    edges().partition_point(|&e| e <= v) - 1
}

/// Bin counts of one plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: Vec<u64>,
}

impl Histogram {
    /// Counts `data` into 256 bins.
    pub fn from_slice(data: &[f32]) -> Self {
        let mut bins = vec![0u64; BINS];
        for &v in data {
            bins[bin_index(v)] += 1;
        }
        Self { bins }
    }

    /// Raw bin counts.
    #[inline]
    pub fn bins(&self) -> &[u64] {
        &self.bins
    }

    /// Sum of all bins.
    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }

    /// Log-scaled bar heights, `log10(count + 1) / 6`.
    ///
    /// A bin of one million samples maps to 1.0; larger counts exceed it.
    pub fn display_heights(&self) -> Vec<f32> {
        self.bins
            .iter()
            .map(|&n| ((n as f64 + 1.0).log10() as f32) / DISPLAY_DECADES)
            .collect()
    }
}

/// Histograms indexed `[depth][channel]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramIndex {
    layers: Vec<Vec<Histogram>>,
}

impl HistogramIndex {
    /// Computes the histograms of every plane of `volume`.
    pub fn compute(volume: &Volume) -> OpsResult<Self> {
        trace!(
            channels = volume.channels(),
            depth = volume.depth(),
            "histogram::compute"
        );

        let layer = |z: usize| -> OpsResult<Vec<Histogram>> {
            (0..volume.channels())
                .map(|c| Ok(Histogram::from_slice(volume.plane_data(c, z)?)))
                .collect()
        };

        #[cfg(feature = "parallel")]
        let layers = (0..volume.depth())
            .into_par_iter()
            .map(layer)
            .collect::<OpsResult<Vec<_>>>()?;

        #[cfg(not(feature = "parallel"))]
        let layers = (0..volume.depth())
            .map(layer)
            .collect::<OpsResult<Vec<_>>>()?;

        debug!(layers = layers.len(), "histograms computed");
        Ok(Self { layers })
    }

    /// Number of depth layers.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Histogram of one plane.
    pub fn get(&self, z: usize, channel: usize) -> Option<&Histogram> {
        self.layers.get(z)?.get(channel)
    }

    /// All channel histograms of one depth layer.
    pub fn layer(&self, z: usize) -> Option<&[Histogram]> {
        self.layers.get(z).map(Vec::as_slice)
    }
}
