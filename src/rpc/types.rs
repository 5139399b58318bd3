// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Canonical RPC records.
//!
//! Everything here is already decoded: hashes are raw bytes, XDR blobs are
//! raw bytes, times are unix seconds. Conversions from the wire shapes run
//! inside the client and fail with a [`DecodeError`].

use crate::decoder::{decode_base64, decode_hex_hash};
use crate::errors::DecodeError;

use super::wire;

/// Chain head as reported by `getLatestLedger`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestLedger {
    /// Hash of the latest ledger
    pub id: [u8; 32],
    pub protocol_version: u32,
    pub sequence: u32,
    /// Close time in unix seconds, when the node reports it
    pub close_time: Option<i64>,
}

/// A ledger returned by `getLedgers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    pub sequence: u32,
    pub hash: [u8; 32],
    /// Close time in unix seconds
    pub close_time: i64,
    /// `LedgerHeaderHistoryEntry` XDR
    pub header_xdr: Vec<u8>,
    /// `LedgerCloseMeta` XDR
    pub metadata_xdr: Vec<u8>,
}

/// A transaction returned by `getTransactions` or `getTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcTransaction {
    /// Status string as sent by the node (`SUCCESS`, `FAILED`, ...)
    pub status: String,
    pub hash: [u8; 32],
    pub application_order: u32,
    pub fee_bump: bool,
    pub envelope_xdr: Vec<u8>,
    pub result_xdr: Vec<u8>,
    pub result_meta_xdr: Vec<u8>,
    /// `None` when the node sent no `events` object
    pub events: Option<RpcEvents>,
    pub ledger: u32,
    /// Close time of the enclosing ledger in unix seconds
    pub created_at: i64,
}

/// Decoded event blobs attached to an RPC transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RpcEvents {
    pub diagnostic_events_xdr: Vec<Vec<u8>>,
    pub transaction_events_xdr: Vec<Vec<u8>>,
    /// Grouped by operation
    pub contract_events_xdr: Vec<Vec<Vec<u8>>>,
}

/// One page of `getTransactions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionPage {
    pub transactions: Vec<RpcTransaction>,
    /// Continuation cursor; empty from the node maps to `None`
    pub cursor: Option<crate::cursor::PaginationToken>,
    pub latest_ledger: u32,
}

pub(crate) fn parse_timestamp(value: &wire::Timestamp) -> Result<i64, DecodeError> {
    match value {
        wire::Timestamp::Number(n) => Ok(*n),
        wire::Timestamp::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| DecodeError::InvalidCloseTime { value: s.clone() }),
    }
}

fn decode_blobs(type_name: &'static str, blobs: &[String]) -> Result<Vec<Vec<u8>>, DecodeError> {
    blobs.iter().map(|b| decode_base64(type_name, b)).collect()
}

impl TryFrom<wire::LatestLedgerResult> for LatestLedger {
    type Error = DecodeError;

    fn try_from(value: wire::LatestLedgerResult) -> Result<Self, Self::Error> {
        Ok(Self {
            id: decode_hex_hash("ledger id", &value.id)?,
            protocol_version: value.protocol_version,
            sequence: value.sequence,
            close_time: value.close_time.as_ref().map(parse_timestamp).transpose()?,
        })
    }
}

impl TryFrom<wire::LedgerInfo> for Ledger {
    type Error = DecodeError;

    fn try_from(value: wire::LedgerInfo) -> Result<Self, Self::Error> {
        Ok(Self {
            sequence: value.sequence,
            hash: decode_hex_hash("ledger hash", &value.hash)?,
            close_time: parse_timestamp(&value.ledger_close_time)?,
            header_xdr: decode_base64("LedgerHeaderHistoryEntry", &value.header_xdr)?,
            metadata_xdr: decode_base64("LedgerCloseMeta", &value.metadata_xdr)?,
        })
    }
}

impl TryFrom<wire::EventsInfo> for RpcEvents {
    type Error = DecodeError;

    fn try_from(value: wire::EventsInfo) -> Result<Self, Self::Error> {
        Ok(Self {
            diagnostic_events_xdr: decode_blobs("DiagnosticEvent", &value.diagnostic_events_xdr)?,
            transaction_events_xdr: decode_blobs(
                "TransactionEvent",
                &value.transaction_events_xdr,
            )?,
            contract_events_xdr: value
                .contract_events_xdr
                .iter()
                .map(|group| decode_blobs("ContractEvent", group))
                .collect::<Result<_, _>>()?,
        })
    }
}

/// Prefers the `events` object and falls back to the legacy top-level
/// diagnostic list.
fn events_from_wire(
    events: Option<wire::EventsInfo>,
    legacy_diagnostic: Option<Vec<String>>,
) -> Result<Option<RpcEvents>, DecodeError> {
    match (events, legacy_diagnostic) {
        (Some(events), _) => Ok(Some(events.try_into()?)),
        (None, Some(diagnostic)) => Ok(Some(RpcEvents {
            diagnostic_events_xdr: decode_blobs("DiagnosticEvent", &diagnostic)?,
            ..Default::default()
        })),
        (None, None) => Ok(None),
    }
}

impl TryFrom<wire::TransactionInfo> for RpcTransaction {
    type Error = DecodeError;

    fn try_from(value: wire::TransactionInfo) -> Result<Self, Self::Error> {
        Ok(Self {
            hash: decode_hex_hash("transaction hash", &value.tx_hash)?,
            application_order: value.application_order,
            fee_bump: value.fee_bump,
            envelope_xdr: decode_base64("TransactionEnvelope", &value.envelope_xdr)?,
            result_xdr: decode_base64("TransactionResult", &value.result_xdr)?,
            result_meta_xdr: decode_base64("TransactionMeta", &value.result_meta_xdr)?,
            events: events_from_wire(value.events, value.diagnostic_events_xdr)?,
            ledger: value.ledger,
            created_at: parse_timestamp(&value.created_at)?,
            status: value.status,
        })
    }
}

fn optional_blob(type_name: &'static str, value: Option<&String>) -> Result<Vec<u8>, DecodeError> {
    value
        .map(|b| decode_base64(type_name, b))
        .transpose()
        .map(Option::unwrap_or_default)
}

impl TryFrom<wire::GetTransactionResult> for RpcTransaction {
    type Error = DecodeError;

    /// A `NOT_FOUND` lookup has no hash or ledger; those fields come back
    /// zeroed with the status preserved.
    fn try_from(value: wire::GetTransactionResult) -> Result<Self, Self::Error> {
        Ok(Self {
            hash: value
                .tx_hash
                .as_deref()
                .map(|h| decode_hex_hash("transaction hash", h))
                .transpose()?
                .unwrap_or_default(),
            application_order: value.application_order.unwrap_or_default(),
            fee_bump: value.fee_bump,
            envelope_xdr: optional_blob("TransactionEnvelope", value.envelope_xdr.as_ref())?,
            result_xdr: optional_blob("TransactionResult", value.result_xdr.as_ref())?,
            result_meta_xdr: optional_blob("TransactionMeta", value.result_meta_xdr.as_ref())?,
            events: events_from_wire(value.events, value.diagnostic_events_xdr)?,
            ledger: value.ledger.unwrap_or_default(),
            created_at: value
                .created_at
                .as_ref()
                .map(parse_timestamp)
                .transpose()?
                .unwrap_or_default(),
            status: value.status,
        })
    }
}
