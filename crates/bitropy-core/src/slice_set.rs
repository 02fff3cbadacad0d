//! The collection of bit slices, grown on demand.

use tracing::debug;

use crate::config::EstimatorConfig;
use crate::error::ConfigError;
use crate::slice::BitSlice;

/// Maps record bit positions to their [`BitSlice`] accumulators.
///
/// Slices are created the first time a record is wide enough to reach
/// them. New slices start cold — they do not backfill from earlier
/// records — so positions that only appear late in the stream carry fewer
/// samples. Reports surface per-slice sample counts so consumers can
/// judge.
#[derive(Debug, Clone)]
pub struct SliceSet {
    config: EstimatorConfig,
    slices: Vec<BitSlice>,
}

impl SliceSet {
    /// Create an empty set for a validated configuration.
    pub fn new(config: EstimatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            slices: Vec::new(),
        })
    }

    /// Make sure slices for positions `0..width` exist.
    pub fn ensure_width(&mut self, width: usize) -> Result<(), ConfigError> {
        if width > self.slices.len() {
            debug!(
                from = self.slices.len(),
                to = width,
                "growing slice set"
            );
            while self.slices.len() < width {
                let slice = BitSlice::new(self.slices.len(), &self.config)?;
                self.slices.push(slice);
            }
        }
        Ok(())
    }

    /// Apply one record's expanded bit values, growing the set as needed.
    /// `bits` holds one 0/1 value per produced bit position.
    pub fn record_bits(&mut self, bits: &[u8]) -> Result<(), ConfigError> {
        self.ensure_width(bits.len())?;
        for (slice, &bit) in self.slices.iter_mut().zip(bits) {
            slice.record_bit(bit != 0);
        }
        Ok(())
    }

    /// Configuration this set was built with.
    #[must_use]
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Widest record seen so far, in bits.
    #[must_use]
    pub fn width(&self) -> usize {
        self.slices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Slice for bit position `index`, if one has been created.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&BitSlice> {
        self.slices.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BitSlice> {
        self.slices.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, BitSlice> {
        self.slices.iter_mut()
    }
}

impl<'a> IntoIterator for &'a SliceSet {
    type Item = &'a BitSlice;
    type IntoIter = std::slice::Iter<'a, BitSlice>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
