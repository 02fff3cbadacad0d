//! Map files: character masks, octet-to-bit maps, and bit masks.
//!
//! A map file reshapes records before they reach the tally engine. The
//! grammar is line-based:
//!
//! ```text
//! # comments run to the end of the line; blank lines are ignored
//! charmask=xccx        # keep record bytes marked 'c', drop 'x'
//! 61=01001             # octet 0x61 expands to these bits
//! 30=                  # octet 0x30 is dropped entirely
//! bitmask=bbbbx        # keep expanded bits marked 'b', drop 'x'
//! ```
//!
//! Without any `HH=` line every octet expands to its 8 big-endian bits.
//! The first `HH=` line switches to an explicit map: octets it does not
//! list expand to nothing. Later duplicates of any directive replace
//! earlier ones. Masks are positional and non-cyclic — data beyond the
//! mask's length is dropped.

use std::path::Path;

use tracing::debug;

use crate::error::MapFileError;

const OCTET_VALUES: usize = 256;

/// Parsed record-reshaping rules. The default maps every octet to its
/// 8-bit big-endian expansion with no masks.
#[derive(Debug, Clone)]
pub struct RecordMap {
    char_mask: Option<Vec<bool>>,
    octet_bits: Vec<Vec<u8>>,
    bit_mask: Option<Vec<bool>>,
}

impl Default for RecordMap {
    fn default() -> Self {
        Self {
            char_mask: None,
            octet_bits: identity_octet_map(),
            bit_mask: None,
        }
    }
}

/// Each octet expands to its own bits, most significant first.
fn identity_octet_map() -> Vec<Vec<u8>> {
    (0..OCTET_VALUES)
        .map(|octet| (0..8).rev().map(|bit| (octet >> bit) as u8 & 1).collect())
        .collect()
}

impl RecordMap {
    /// Load and parse a map file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MapFileError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading map file");
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse map-file text.
    pub fn parse(text: &str) -> Result<Self, MapFileError> {
        let mut map = Self::default();
        let mut seen_octet_line = false;

        for (index, raw_line) in text.lines().enumerate() {
            let line = index + 1;

            // Strip comments and trailing whitespace; skip blanks.
            let body = raw_line
                .split('#')
                .next()
                .unwrap_or_default()
                .trim_end();
            if body.is_empty() {
                continue;
            }

            if let Some(mask) = body.strip_prefix("charmask=") {
                map.char_mask = Some(parse_mask(mask, 'c', 'x').ok_or(
                    MapFileError::BadCharMask { line },
                )?);
            } else if let Some(mask) = body.strip_prefix("bitmask=") {
                map.bit_mask = Some(parse_mask(mask, 'b', 'x').ok_or(
                    MapFileError::BadBitMask { line },
                )?);
            } else if let Some((octet, pattern)) = split_octet_line(body) {
                // The first explicit octet line abandons the identity map:
                // from here on, unlisted octets expand to nothing.
                if !seen_octet_line {
                    map.octet_bits = vec![Vec::new(); OCTET_VALUES];
                    seen_octet_line = true;
                }
                map.octet_bits[octet as usize] =
                    parse_bit_pattern(pattern).ok_or(MapFileError::BadBitPattern { line })?;
            } else {
                return Err(MapFileError::UnknownDirective { line });
            }
        }
        Ok(map)
    }

    /// Which record bytes to keep, if a `charmask=` was given.
    #[must_use]
    pub fn char_mask(&self) -> Option<&[bool]> {
        self.char_mask.as_deref()
    }

    /// The bit expansion for one octet value (possibly empty).
    #[must_use]
    pub fn bits_for(&self, octet: u8) -> &[u8] {
        &self.octet_bits[octet as usize]
    }

    /// Which expanded bits to keep, if a `bitmask=` was given.
    #[must_use]
    pub fn bit_mask(&self) -> Option<&[bool]> {
        self.bit_mask.as_deref()
    }
}

/// `HH=pattern` with two leading hex digits, either case.
fn split_octet_line(body: &str) -> Option<(u8, &str)> {
    let bytes = body.as_bytes();
    if bytes.len() >= 3
        && bytes[0].is_ascii_hexdigit()
        && bytes[1].is_ascii_hexdigit()
        && bytes[2] == b'='
    {
        let octet = u8::from_str_radix(&body[..2], 16).ok()?;
        Some((octet, &body[3..]))
    } else {
        None
    }
}

/// A mask of `keep` and `drop` characters, as keep flags.
fn parse_mask(mask: &str, keep: char, drop: char) -> Option<Vec<bool>> {
    if mask.is_empty() || !mask.chars().all(|c| c == keep || c == drop) {
        return None;
    }
    Some(mask.chars().map(|c| c == keep).collect())
}

/// A `[01]*` pattern as 0/1 byte values.
fn parse_bit_pattern(pattern: &str) -> Option<Vec<u8>> {
    pattern
        .chars()
        .map(|c| match c {
            '0' => Some(0),
            '1' => Some(1),
            _ => None,
        })
        .collect()
}
