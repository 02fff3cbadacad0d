//! Estimator configuration.
//!
//! All tuning knobs for the tally engine live in [`EstimatorConfig`], an
//! immutable value validated once after argument parsing and then threaded
//! by reference through the update and reporting paths. Each
//! [`crate::slice::BitSlice`] captures its limits at construction, so the
//! hot update loop never consults shared state.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Width of the per-position sliding bit history.
pub const HISTORY_BITS: u32 = u64::BITS;

/// Deepest look-back distance a tally family can cover.
///
/// Look-backs xor the current history suffix against the suffix `k` records
/// back, so each look-back consumes history head-room.
pub const MAX_BACK_HISTORY: u32 = HISTORY_BITS / 2;

/// Deepest tally width. One less than [`MAX_BACK_HISTORY`] so that computed
/// table offsets stay comfortably within 32-bit indices; each extra bit of
/// depth doubles tally memory anyway.
pub const MAX_TALLY_DEPTH: u32 = MAX_BACK_HISTORY - 1;

/// Default tally depth in bits.
pub const DEFAULT_BIT_DEPTH: u32 = 8;

/// Default number of look-back distances.
pub const DEFAULT_BACK_HISTORY: u32 = MAX_BACK_HISTORY;

/// Default minimum average cell occupancy required to trust a depth.
pub const DEFAULT_DEPTH_FACTOR: u64 = 4;

/// Tuning parameters for the tally engine, fixed after startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Maximum tally width in bits (1..=[`MAX_TALLY_DEPTH`]).
    pub bit_depth: u32,

    /// Number of look-back distances to tally (1..=[`MAX_BACK_HISTORY`]).
    pub back_history: u32,

    /// Average tally-cell occupancy required before a depth contributes to
    /// entropy estimates (>= 1). Larger values demand more samples before
    /// deep widths are trusted.
    pub depth_factor: u64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            bit_depth: DEFAULT_BIT_DEPTH,
            back_history: DEFAULT_BACK_HISTORY,
            depth_factor: DEFAULT_DEPTH_FACTOR,
        }
    }
}

impl EstimatorConfig {
    /// Build a validated configuration.
    pub fn new(bit_depth: u32, back_history: u32, depth_factor: u64) -> Result<Self, ConfigError> {
        let config = Self {
            bit_depth,
            back_history,
            depth_factor,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter bound, including the joint constraint that a
    /// full history window must fit the deepest (depth, look-back) pair.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bit_depth < 1 || self.bit_depth > MAX_TALLY_DEPTH {
            return Err(ConfigError::BitDepth {
                got: self.bit_depth,
            });
        }
        if self.back_history < 1 || self.back_history > MAX_BACK_HISTORY {
            return Err(ConfigError::BackHistory {
                got: self.back_history,
            });
        }
        if self.depth_factor < 1 {
            return Err(ConfigError::DepthFactor {
                got: self.depth_factor,
            });
        }
        if self.bit_depth + self.back_history > HISTORY_BITS {
            return Err(ConfigError::HistoryOverflow {
                bit_depth: self.bit_depth,
                back_history: self.back_history,
                limit: HISTORY_BITS,
            });
        }
        Ok(())
    }

    /// Updates before this many operations only shift history; the window
    /// must be full of real record bits before any look-back xor means
    /// anything.
    #[must_use]
    pub fn warmup_threshold(&self) -> u64 {
        u64::from(self.bit_depth + self.back_history)
    }
}
