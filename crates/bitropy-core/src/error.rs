//! Error types for bitropy-core

use thiserror::Error;

use crate::config::{MAX_BACK_HISTORY, MAX_TALLY_DEPTH};

/// Estimator parameter validation errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("bit depth {got} out of range 1..={max}", max = MAX_TALLY_DEPTH)]
    BitDepth { got: u32 },

    #[error("back history {got} out of range 1..={max}", max = MAX_BACK_HISTORY)]
    BackHistory { got: u32 },

    #[error("depth factor {got} must be >= 1")]
    DepthFactor { got: u64 },

    #[error("bit depth {bit_depth} + back history {back_history} exceeds the {limit}-bit history window")]
    HistoryOverflow {
        bit_depth: u32,
        back_history: u32,
        limit: u32,
    },
}

/// Map file parse errors, carrying the 1-based source line number
#[derive(Error, Debug)]
pub enum MapFileError {
    #[error("line {line}: charmask may only contain 'x' and 'c'")]
    BadCharMask { line: usize },

    #[error("line {line}: bitmask may only contain 'x' and 'b'")]
    BadBitMask { line: usize },

    #[error("line {line}: octet bit pattern may only contain '0' and '1'")]
    BadBitPattern { line: usize },

    #[error("line {line}: unknown directive")]
    UnknownDirective { line: usize },

    #[error("failed to read map file: {0}")]
    Io(#[from] std::io::Error),
}
