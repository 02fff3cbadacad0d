//! bitropy-core: Core library for bitropy
//!
//! bitropy measures the entropy found within input records, one record bit
//! position at a time. Every position keeps a sliding history of the
//! values it has taken across records; tally tables count the bit patterns
//! of that history (and of its xor against earlier history) at every width
//! up to a configured depth, and Shannon-style estimates over those
//! tallies yield per-position and overall high, low, and median entropy.
//!
//! # Architecture
//!
//! ```text
//! Record source → Preprocessor → SliceSet (BitSlice × width)
//!   (lines/blocks)  (trims, map)       ↓ record_bit
//!                                 TallyTable × (look-back + 1)
//!                                       ↓
//!                                 entropy::report
//! ```
//!
//! # Modules
//!
//! - `config`: estimator parameters and limits
//! - `tally`: flat tally tables for bit-pattern counts
//! - `slice`: per-bit-position history and tallies
//! - `slice_set`: the on-demand-grown slice collection
//! - `entropy`: the reporter deriving entropy estimates from tallies
//! - `reader`: line and fixed-size-binary record reading
//! - `preprocess`: record trims, masks, and octet-to-bit expansion
//! - `mapfile`: the charmask / octet map / bitmask file format
//! - `logging`: tracing bootstrap shared with the CLI
//! - `error`: error types
//!
//! # Safety
//!
//! This crate forbids unsafe code.

#![forbid(unsafe_code)]

pub mod config;
pub mod entropy;
pub mod error;
pub mod logging;
pub mod mapfile;
pub mod preprocess;
pub mod reader;
pub mod slice;
pub mod slice_set;
pub mod tally;
