// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Pagination cursors returned by Stellar RPC.
//!
//! A cursor is a TOID (a 64-bit integer packing ledger, transaction and
//! operation positions) optionally followed by a dash and a numeric suffix,
//! for example `0237311318360358912-0000000005`.
//!
//! The fetch engine only ever carries cursors around as opaque
//! [`PaginationToken`]s. [`Cursor`] unpacks them for diagnostics and tests.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::CursorError;

/// Opaque pagination continuation token.
///
/// Passed back to the node unchanged. Never inspected on the fetch path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaginationToken(String);

impl PaginationToken {
    /// Wraps a raw cursor string.
    ///
    /// Returns `None` for an empty string, which the node uses to signal
    /// that there is nothing more to read.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// The raw token as sent to the node.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unpacks the token for inspection.
    pub fn decode(&self) -> Result<Cursor, CursorError> {
        Cursor::decode(&self.0)
    }
}

impl fmt::Display for PaginationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structural components of a pagination cursor.
///
/// # Examples
///
/// ```rust
/// use stellar_block_fetcher::cursor::Cursor;
///
/// let cursor = Cursor::decode("0237311318360358912-0000000005").unwrap();
/// assert_eq!(cursor.ledger, 55_253_347);
/// assert_eq!(cursor.tx_index, 12);
/// assert_eq!(cursor.op_index, 32_768);
/// assert_eq!(cursor.suffix, Some(5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    /// Ledger sequence (high 32 bits of the TOID)
    pub ledger: u32,
    /// Transaction index (next 16 bits)
    pub tx_index: u16,
    /// Operation index (low 16 bits)
    pub op_index: u16,
    /// Optional dash-separated suffix
    pub suffix: Option<u64>,
}

impl Cursor {
    /// Parses a cursor string.
    ///
    /// Everything after the first `-` must be a single decimal suffix, so a
    /// cursor with more than one dash such as `1-2-3` is rejected with
    /// [`CursorError::InvalidSuffix`] instead of having its tail ignored.
    pub fn decode(raw: &str) -> Result<Self, CursorError> {
        let (toid_part, suffix_part) = match raw.split_once('-') {
            Some((toid, suffix)) => (toid, Some(suffix)),
            None => (raw, None),
        };

        let toid: u64 = toid_part
            .parse()
            .map_err(|source| CursorError::InvalidToid {
                cursor: raw.to_string(),
                source,
            })?;

        let suffix = suffix_part
            .map(|s| {
                s.parse::<u64>().map_err(|source| CursorError::InvalidSuffix {
                    cursor: raw.to_string(),
                    source,
                })
            })
            .transpose()?;

        Ok(Self::from_toid(toid, suffix))
    }

    /// Unpacks a TOID.
    pub fn from_toid(toid: u64, suffix: Option<u64>) -> Self {
        Self {
            ledger: (toid >> 32) as u32,
            tx_index: ((toid >> 16) & 0xFFFF) as u16,
            op_index: (toid & 0xFFFF) as u16,
            suffix,
        }
    }

    /// Packs the components back into a TOID.
    pub fn toid(&self) -> u64 {
        (u64::from(self.ledger) << 32) | (u64::from(self.tx_index) << 16) | u64::from(self.op_index)
    }

    /// Renders the cursor in the node's zero-padded form.
    pub fn encode(&self) -> String {
        match self.suffix {
            Some(suffix) => format!("{:019}-{:010}", self.toid(), suffix),
            None => self.toid().to_string(),
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
