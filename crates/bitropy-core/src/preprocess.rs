//! Record preprocessing: from raw record bytes to 0/1 bit values.
//!
//! Steps run in a fixed order, each feeding the next:
//!
//! 1. newline trim (line mode, unless newlines are kept)
//! 2. cookie trim: keep the bytes between the first `=` and the first `;`
//!    after it, dropping records that lack either
//! 3. character mask from the map file
//! 4. octet-to-bit expansion from the map file
//! 5. bit mask from the map file
//!
//! The output is a buffer of `0x00`/`0x01` values, one per surviving bit
//! position, which the slice set consumes directly. A record can shrink
//! to nothing at several steps; such records are skipped but still count
//! toward the record number.

use tracing::{debug, trace};

use crate::mapfile::RecordMap;

/// Turns raw records into bit buffers according to the configured trims
/// and map.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    trim_newline: bool,
    cookie_trim: bool,
    map: RecordMap,
}

impl Preprocessor {
    /// `trim_newline` applies in line mode without `-k`; `cookie_trim` is
    /// the `-C` extraction; `map` carries the mask and expansion rules.
    #[must_use]
    pub fn new(trim_newline: bool, cookie_trim: bool, map: RecordMap) -> Self {
        Self {
            trim_newline,
            cookie_trim,
            map,
        }
    }

    /// Expand one raw record into `bits`, replacing its contents, and
    /// return the number of bits produced. Zero means the record was
    /// dropped (or produced nothing after masking).
    pub fn expand(&self, raw: &[u8], bits: &mut Vec<u8>) -> usize {
        bits.clear();

        let mut record = raw;
        if self.trim_newline {
            record = trim_newline(record);
        }
        if record.is_empty() {
            debug!("record empty after newline trim");
            return 0;
        }

        if self.cookie_trim {
            match cookie_value(record) {
                Some(value) => record = value,
                None => {
                    debug!("record has no '=' ... ';' cookie, dropping");
                    return 0;
                }
            }
        }

        // Character mask and octet expansion fused into one pass; bytes
        // beyond the mask's length are dropped.
        let char_mask = self.map.char_mask();
        for (position, &octet) in record.iter().enumerate() {
            match char_mask {
                Some(mask) if position >= mask.len() => break,
                Some(mask) if !mask[position] => continue,
                _ => {}
            }
            bits.extend_from_slice(self.map.bits_for(octet));
        }

        if let Some(mask) = self.map.bit_mask() {
            let mut position = 0;
            bits.retain(|_| {
                let keep = position < mask.len() && mask[position];
                position += 1;
                keep
            });
        }

        if tracing::enabled!(tracing::Level::TRACE) {
            let rendered: String = bits
                .iter()
                .map(|&bit| if bit == 0 { '0' } else { '1' })
                .collect();
            trace!(bits = bits.len(), "expanded record: {rendered}");
        }
        bits.len()
    }
}

/// Strip one trailing `\n`, `\r`, `\r\n`, or `\n\r`.
fn trim_newline(record: &[u8]) -> &[u8] {
    match record {
        [rest @ .., b'\r', b'\n'] | [rest @ .., b'\n', b'\r'] => rest,
        [rest @ .., b'\n'] | [rest @ .., b'\r'] => rest,
        _ => record,
    }
}

/// The bytes strictly between the first `=` and the first `;` after it.
fn cookie_value(record: &[u8]) -> Option<&[u8]> {
    let equal = record.iter().position(|&b| b == b'=')?;
    let after = &record[equal + 1..];
    let semi = after.iter().position(|&b| b == b';')?;
    Some(&after[..semi])
}
