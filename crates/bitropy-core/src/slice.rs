//! Per-bit-position accumulators.
//!
//! A [`BitSlice`] owns everything the estimator knows about one bit
//! position of the record stream: a 64-bit sliding history of the values
//! that position has taken, operation and sample counters, and one
//! [`TallyTable`] per look-back distance. Table 0 tallies the raw history
//! suffix; table `k` (k >= 1) tallies the xor of the current suffix with
//! the suffix `k` records back, which exposes periodic structure the raw
//! tally cannot see.
//!
//! [`BitSlice::record_bit`] is the hot path: one shift, a warm-up gate,
//! then exactly one counter increment per (width, look-back) pair.

use crate::config::EstimatorConfig;
use crate::error::ConfigError;
use crate::tally::TallyTable;

/// State for one bit position of the record stream.
#[derive(Debug, Clone)]
pub struct BitSlice {
    /// Bit position in the record this slice covers (0 = first bit).
    bit_index: usize,
    /// Sliding window of past values; bit 0 is the most recent.
    history: u64,
    /// Total update calls, including those discarded during warm-up.
    ops: u64,
    /// Updates that actually modified tallies.
    count: u64,
    /// Tally width limit captured at construction.
    depth_lim: u32,
    /// Look-back limit captured at construction.
    back_lim: u32,
    /// `back_lim + 1` tables; index 0 is the current-window table.
    tables: Vec<TallyTable>,
    /// Cached per-look-back (max, min) entropy, refreshed by the reporter.
    pub(crate) lag_high: Vec<Option<f64>>,
    pub(crate) lag_low: Vec<Option<f64>>,
    /// Cached best estimates across all look-backs.
    pub(crate) high: Option<f64>,
    pub(crate) low: Option<f64>,
}

impl BitSlice {
    /// Allocate the full tally family for one bit position.
    pub fn new(bit_index: usize, config: &EstimatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let lags = config.back_history as usize + 1;
        let tables = (0..lags)
            .map(|_| TallyTable::new(config.bit_depth))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            bit_index,
            history: 0,
            ops: 0,
            count: 0,
            depth_lim: config.bit_depth,
            back_lim: config.back_history,
            tables,
            lag_high: vec![None; lags],
            lag_low: vec![None; lags],
            high: None,
            low: None,
        })
    }

    /// Push one bit value into the history and, once the window holds
    /// nothing but real record bits, tally every (width, look-back) pair.
    #[inline]
    pub fn record_bit(&mut self, bit: bool) {
        self.history = (self.history << 1) | u64::from(bit);

        // Warm-up: the deepest look-back must still land on real bits.
        self.ops += 1;
        if self.ops < u64::from(self.back_lim + self.depth_lim) {
            return;
        }
        self.count += 1;

        for depth in 1..=self.depth_lim {
            let offset = 1usize << depth;
            let mask = (offset as u64) - 1;
            let cur = (self.history & mask) as usize;

            // Look-back 0 tallies the suffix itself, no xor.
            self.tables[0].bump(offset + cur);

            for back in 1..=self.back_lim {
                let past = ((self.history >> back) & mask) as usize;
                self.tables[back as usize].bump(offset + (cur ^ past));
            }
        }
    }

    /// Bit position in the record this slice covers.
    #[must_use]
    pub fn bit_index(&self) -> usize {
        self.bit_index
    }

    /// Total update calls, including warm-up.
    #[must_use]
    pub fn ops(&self) -> u64 {
        self.ops
    }

    /// Updates that reached the tallies. Late-created slices have smaller
    /// counts than the record stream; reports surface this.
    #[must_use]
    pub fn samples(&self) -> u64 {
        self.count
    }

    /// Tally width limit this slice was built with.
    #[must_use]
    pub fn depth_lim(&self) -> u32 {
        self.depth_lim
    }

    /// Look-back limit this slice was built with.
    #[must_use]
    pub fn back_lim(&self) -> u32 {
        self.back_lim
    }

    /// Tally table for look-back `back` (0 = current window).
    #[must_use]
    pub fn table(&self, back: u32) -> &TallyTable {
        &self.tables[back as usize]
    }

    /// Best (largest) entropy estimate across every look-back and width,
    /// or `None` until the reporter has seen enough samples.
    #[must_use]
    pub fn entropy_high(&self) -> Option<f64> {
        self.high
    }

    /// Worst (smallest) entropy estimate across every look-back and width.
    #[must_use]
    pub fn entropy_low(&self) -> Option<f64> {
        self.low
    }

    /// Cached (max, min) entropy for one look-back distance.
    #[must_use]
    pub fn lag_entropy(&self, back: u32) -> (Option<f64>, Option<f64>) {
        (self.lag_high[back as usize], self.lag_low[back as usize])
    }
}
