//! Entropy estimation over tallied bit slices.
//!
//! For each slice with samples, the reporter sweeps every (look-back,
//! width) tally band and computes a Shannon entropy estimate in bits per
//! bit:
//!
//! > H_d = −(1/d) · Σ p_v · log₂ p_v, with p_v = count(v) / samples
//!
//! Zero cells contribute nothing (0 · log 0 = 0), and each estimate is
//! clamped to ≥ 0 to absorb floating-point noise. A fully uniform random
//! bit yields 1.0; a constant bit yields 0.0.
//!
//! Not every width is trustworthy: a width only participates once the
//! average cell of its band has been hit `depth_factor` times, so the
//! effective depth limit shrinks until `samples / depth_factor` covers
//! `2^depth` cells. Slices whose effective depth reaches zero are skipped
//! entirely and report no estimate.
//!
//! Per look-back, the sweep keeps the max and min estimate across widths;
//! per slice, the best and worst across look-backs become the high and low
//! estimates. The aggregate sums per-slice highs and lows over the slices
//! that have them, and the "median" is the midpoint of those two sums —
//! not a statistical median, a naming kept for report compatibility with
//! the measurement lineage.

use serde::Serialize;
use tracing::trace;

use crate::config::EstimatorConfig;
use crate::slice::BitSlice;
use crate::slice_set::SliceSet;

/// One aggregate entropy estimate and the number of slices behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aggregate {
    /// Sum of per-slice estimates, in bits.
    pub entropy: f64,
    /// Contributing bit positions.
    pub bit_count: usize,
}

/// Per-slice view surfaced with every report, so consumers can judge how
/// well-sampled each position is (late-created slices see fewer records).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SliceSummary {
    pub bit_index: usize,
    pub samples: u64,
    pub high: Option<f64>,
    pub low: Option<f64>,
}

/// Output of one reporter pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntropyReport {
    /// Sum of per-slice high estimates, when any slice has one.
    pub high: Option<Aggregate>,
    /// Sum of per-slice low estimates, when any slice has one.
    pub low: Option<Aggregate>,
    /// Midpoint of the high and low aggregates, when both exist.
    pub median_entropy: Option<f64>,
    /// One entry per created slice, in bit order.
    pub slices: Vec<SliceSummary>,
}

impl EntropyReport {
    /// True when no slice produced an estimate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.high.is_none() && self.low.is_none()
    }
}

/// Deepest width worth trusting for `samples`: the widest depth whose
/// average cell occupancy reaches `depth_factor`. Zero means "none".
fn effective_depth(samples: u64, depth_lim: u32, depth_factor: u64) -> u32 {
    let mut depth = depth_lim;
    while depth > 0 && samples / depth_factor < (1u64 << depth) {
        depth -= 1;
    }
    depth
}

/// Refresh one slice's cached per-look-back and best estimates.
fn refresh_slice(slice: &mut BitSlice, config: &EstimatorConfig) {
    let samples = slice.samples();
    if samples == 0 {
        return;
    }
    let depth_lim = effective_depth(samples, slice.depth_lim(), config.depth_factor);
    if depth_lim == 0 {
        trace!(
            bit = slice.bit_index(),
            samples,
            "not enough samples for any depth"
        );
        return;
    }
    let inv_samples = 1.0 / samples as f64;

    let mut slice_high: Option<f64> = None;
    let mut slice_low: Option<f64> = None;
    for back in 0..=slice.back_lim() {
        let mut lag_high: Option<f64> = None;
        let mut lag_low: Option<f64> = None;
        for depth in 1..=depth_lim {
            // Accumulate Σ p ln p over the populated cells, then convert
            // to log base 2 and normalize per bit of width.
            let mut sum = 0.0f64;
            for &cell in slice.table(back).width_band(depth) {
                if cell > 0 {
                    let p = cell as f64 * inv_samples;
                    sum += p * p.ln();
                }
            }
            let entropy = (sum * -std::f64::consts::LOG2_E / f64::from(depth)).max(0.0);
            trace!(
                bit = slice.bit_index(),
                back, depth, entropy, "per-depth estimate"
            );

            lag_high = Some(lag_high.map_or(entropy, |h: f64| h.max(entropy)));
            lag_low = Some(lag_low.map_or(entropy, |l: f64| l.min(entropy)));
        }
        slice.lag_high[back as usize] = lag_high;
        slice.lag_low[back as usize] = lag_low;
        if let Some(h) = lag_high {
            slice_high = Some(slice_high.map_or(h, |s: f64| s.max(h)));
        }
        if let Some(l) = lag_low {
            slice_low = Some(slice_low.map_or(l, |s: f64| s.min(l)));
        }
    }
    slice.high = slice_high;
    slice.low = slice_low;
}

/// Run the reporter over every slice: refresh cached per-slice estimates
/// and fold them into the aggregate. Running it again without further
/// updates produces the same values.
pub fn report(set: &mut SliceSet, config: &EstimatorConfig) -> EntropyReport {
    let mut high_sum = 0.0f64;
    let mut high_count = 0usize;
    let mut low_sum = 0.0f64;
    let mut low_count = 0usize;
    let mut slices = Vec::with_capacity(set.width());

    for slice in set.iter_mut() {
        refresh_slice(slice, config);
        if let Some(high) = slice.entropy_high() {
            high_sum += high;
            high_count += 1;
        }
        if let Some(low) = slice.entropy_low() {
            low_sum += low;
            low_count += 1;
        }
        slices.push(SliceSummary {
            bit_index: slice.bit_index(),
            samples: slice.samples(),
            high: slice.entropy_high(),
            low: slice.entropy_low(),
        });
    }

    let high = (high_count > 0).then_some(Aggregate {
        entropy: high_sum,
        bit_count: high_count,
    });
    let low = (low_count > 0).then_some(Aggregate {
        entropy: low_sum,
        bit_count: low_count,
    });
    let median_entropy = match (high, low) {
        (Some(h), Some(l)) => Some((h.entropy + l.entropy) / 2.0),
        _ => None,
    };

    EntropyReport {
        high,
        low,
        median_entropy,
        slices,
    }
}
