// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! XDR decoding for Stellar ledger and transaction payloads.
//!
//! The [`Decoder`] has four entry points: ledger close metadata, transaction
//! envelope, transaction result and transaction result-meta. Each comes in a
//! `_base64` variant for strings received from the node and a `_bytes`
//! variant for callers that already hold raw XDR.
//!
//! Every decode is bounded by the payload length and a nesting depth limit,
//! so malformed network input yields a [`DecodeError`] instead of a panic or
//! a stack overflow.
//!
//! # Example
//!
//! ```rust,ignore
//! use stellar_block_fetcher::decoder::Decoder;
//!
//! let decoder = Decoder::new();
//! let metadata = decoder.decode_ledger_metadata_bytes(&ledger.metadata_xdr)?;
//! println!("protocol {}", metadata.header().ledger_version);
//! ```

mod metadata;
mod transactions;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use stellar_xdr::curr::{
    LedgerCloseMeta, Limits, ReadXdr, TransactionEnvelope, TransactionMeta, TransactionResult,
    WriteXdr,
};

use crate::config::constants::XDR_DEPTH_LIMIT;
use crate::errors::DecodeError;

pub use metadata::{LedgerMetadata, ProcessingRecord};
pub use transactions::{ExtractedTransaction, TransactionEvents, TransactionReader};

/// Decoder for Stellar XDR payloads.
#[derive(Debug, Clone)]
pub struct Decoder {
    depth_limit: u32,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Creates a decoder with the default nesting depth limit.
    pub fn new() -> Self {
        Self {
            depth_limit: XDR_DEPTH_LIMIT,
        }
    }

    /// Creates a decoder with a custom nesting depth limit.
    pub fn with_depth_limit(depth_limit: u32) -> Self {
        Self { depth_limit }
    }

    /// Decodes base64 ledger close metadata.
    pub fn decode_ledger_metadata_base64(&self, encoded: &str) -> Result<LedgerMetadata, DecodeError> {
        let bytes = decode_base64("LedgerCloseMeta", encoded)?;
        self.decode_ledger_metadata_bytes(&bytes)
    }

    /// Decodes raw ledger close metadata.
    ///
    /// A union discriminant this crate does not know is reported as
    /// [`DecodeError::UnsupportedVersion`] rather than a generic XDR error.
    pub fn decode_ledger_metadata_bytes(&self, bytes: &[u8]) -> Result<LedgerMetadata, DecodeError> {
        if let Some(version) = union_discriminant(bytes) {
            if !(0..=2).contains(&version) {
                return Err(DecodeError::UnsupportedVersion {
                    type_name: "LedgerCloseMeta",
                    version,
                });
            }
        }
        let meta: LedgerCloseMeta = self.decode("LedgerCloseMeta", bytes)?;
        Ok(LedgerMetadata::new(meta))
    }

    /// Decodes a base64 transaction envelope.
    pub fn decode_transaction_envelope_base64(
        &self,
        encoded: &str,
    ) -> Result<TransactionEnvelope, DecodeError> {
        let bytes = decode_base64("TransactionEnvelope", encoded)?;
        self.decode_transaction_envelope_bytes(&bytes)
    }

    /// Decodes a raw transaction envelope.
    pub fn decode_transaction_envelope_bytes(
        &self,
        bytes: &[u8],
    ) -> Result<TransactionEnvelope, DecodeError> {
        self.decode("TransactionEnvelope", bytes)
    }

    /// Decodes a base64 transaction result.
    pub fn decode_transaction_result_base64(
        &self,
        encoded: &str,
    ) -> Result<TransactionResult, DecodeError> {
        let bytes = decode_base64("TransactionResult", encoded)?;
        self.decode_transaction_result_bytes(&bytes)
    }

    /// Decodes a raw transaction result.
    pub fn decode_transaction_result_bytes(
        &self,
        bytes: &[u8],
    ) -> Result<TransactionResult, DecodeError> {
        self.decode("TransactionResult", bytes)
    }

    /// Decodes base64 transaction result-meta.
    pub fn decode_transaction_result_meta_base64(
        &self,
        encoded: &str,
    ) -> Result<TransactionMeta, DecodeError> {
        let bytes = decode_base64("TransactionMeta", encoded)?;
        self.decode_transaction_result_meta_bytes(&bytes)
    }

    /// Decodes raw transaction result-meta.
    pub fn decode_transaction_result_meta_bytes(
        &self,
        bytes: &[u8],
    ) -> Result<TransactionMeta, DecodeError> {
        self.decode("TransactionMeta", bytes)
    }

    fn decode<T: ReadXdr>(&self, type_name: &'static str, bytes: &[u8]) -> Result<T, DecodeError> {
        let limits = Limits {
            depth: self.depth_limit,
            len: bytes.len(),
        };
        T::from_xdr(bytes, limits).map_err(|e| DecodeError::xdr(type_name, bytes.len(), e))
    }
}

/// Decodes standard base64, tagging failures with the target type name.
pub fn decode_base64(type_name: &'static str, encoded: &str) -> Result<Vec<u8>, DecodeError> {
    STANDARD
        .decode(encoded)
        .map_err(|e| DecodeError::base64(type_name, encoded.len(), e))
}

/// Decodes a hex-encoded 32-byte hash.
pub fn decode_hex_hash(type_name: &'static str, encoded: &str) -> Result<[u8; 32], DecodeError> {
    let bytes = hex::decode(encoded).map_err(|e| DecodeError::hex(type_name, encoded.len(), e))?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| DecodeError::InvalidHashLength { type_name, len })
}

/// Encodes a decoded value back to XDR bytes.
pub(crate) fn encode_xdr<T: WriteXdr>(type_name: &'static str, value: &T) -> Result<Vec<u8>, DecodeError> {
    value
        .to_xdr(Limits::none())
        .map_err(|e| DecodeError::xdr_encode(type_name, e))
}

/// Reads the leading 4-byte union discriminant, if present.
fn union_discriminant(bytes: &[u8]) -> Option<i32> {
    let head: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
    Some(i32::from_be_bytes(head))
}
