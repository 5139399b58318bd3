// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! JSON shapes of Stellar RPC params and results.
//!
//! Results reject unknown fields. Fields a node may legitimately omit are
//! optional or defaulted. Timestamps are accepted either as JSON numbers or
//! as decimal strings since node versions disagree.

use serde::{Deserialize, Serialize};

use crate::cursor::PaginationToken;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<PaginationToken>,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LedgerRangeParams {
    /// Omitted when resuming from a cursor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_ledger: Option<u32>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct TransactionHashParams {
    pub hash: String,
}

/// Unix seconds, either a JSON number or a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum Timestamp {
    Number(i64),
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct LatestLedgerResult {
    pub id: String,
    pub protocol_version: u32,
    pub sequence: u32,
    #[serde(default)]
    pub close_time: Option<Timestamp>,
    #[serde(default)]
    pub header_xdr: Option<String>,
    #[serde(default)]
    pub metadata_xdr: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct LedgerInfo {
    pub hash: String,
    pub sequence: u32,
    pub ledger_close_time: Timestamp,
    pub header_xdr: String,
    pub metadata_xdr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct GetLedgersResult {
    #[serde(default)]
    pub ledgers: Vec<LedgerInfo>,
    pub latest_ledger: u32,
    #[serde(default)]
    pub latest_ledger_close_time: Option<Timestamp>,
    #[serde(default)]
    pub oldest_ledger: Option<u32>,
    #[serde(default)]
    pub oldest_ledger_close_time: Option<Timestamp>,
    #[serde(default)]
    pub cursor: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct EventsInfo {
    #[serde(default)]
    pub diagnostic_events_xdr: Vec<String>,
    #[serde(default)]
    pub transaction_events_xdr: Vec<String>,
    #[serde(default)]
    pub contract_events_xdr: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct TransactionInfo {
    pub status: String,
    pub tx_hash: String,
    pub application_order: u32,
    #[serde(default)]
    pub fee_bump: bool,
    pub envelope_xdr: String,
    pub result_xdr: String,
    pub result_meta_xdr: String,
    /// Superseded by `events.diagnosticEventsXdr`
    #[serde(default)]
    pub diagnostic_events_xdr: Option<Vec<String>>,
    #[serde(default)]
    pub events: Option<EventsInfo>,
    pub ledger: u32,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct GetTransactionsResult {
    #[serde(default)]
    pub transactions: Vec<TransactionInfo>,
    pub latest_ledger: u32,
    #[serde(default)]
    pub latest_ledger_close_timestamp: Option<Timestamp>,
    #[serde(default)]
    pub oldest_ledger: Option<u32>,
    #[serde(default)]
    pub oldest_ledger_close_timestamp: Option<Timestamp>,
    #[serde(default)]
    pub cursor: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct GetTransactionResult {
    pub latest_ledger: u32,
    #[serde(default)]
    pub latest_ledger_close_time: Option<Timestamp>,
    #[serde(default)]
    pub oldest_ledger: Option<u32>,
    #[serde(default)]
    pub oldest_ledger_close_time: Option<Timestamp>,
    pub status: String,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub application_order: Option<u32>,
    #[serde(default)]
    pub fee_bump: bool,
    #[serde(default)]
    pub envelope_xdr: Option<String>,
    #[serde(default)]
    pub result_xdr: Option<String>,
    #[serde(default)]
    pub result_meta_xdr: Option<String>,
    #[serde(default)]
    pub diagnostic_events_xdr: Option<Vec<String>>,
    #[serde(default)]
    pub events: Option<EventsInfo>,
    #[serde(default)]
    pub ledger: Option<u32>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}
