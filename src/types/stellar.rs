// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Chain-specific Stellar block model (`sf.stellar.type.v1`).
//!
//! These messages are encoded with protobuf and carried as the opaque payload
//! of a [`bstream::Block`](super::bstream::Block). Field tags are fixed: the
//! encoded bytes must match blocks produced by the archival process.

/// Normalized transaction status.
///
/// There is no unknown state: anything that is not a success is a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum TransactionStatus {
    Success = 0,
    Failed = 1,
}

impl TransactionStatus {
    /// Protobuf enum value name.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            TransactionStatus::Success => "SUCCESS",
            TransactionStatus::Failed => "FAILED",
        }
    }
}

/// Normalized contract event type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ContractEventType {
    System = 0,
    Contract = 1,
    Diagnostic = 2,
}

/// A Stellar ledger as a block.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Block {
    /// Ledger sequence
    #[prost(uint64, tag = "1")]
    pub number: u64,
    /// Ledger hash (32 bytes)
    #[prost(bytes = "vec", tag = "2")]
    pub hash: Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub header: Option<Header>,
    /// Block model version
    #[prost(uint32, tag = "4")]
    pub version: u32,
    /// Transactions in application order
    #[prost(message, repeated, tag = "6")]
    pub transactions: Vec<Transaction>,
    /// Ledger close time
    #[prost(message, optional, tag = "9")]
    pub created_at: Option<::prost_types::Timestamp>,
}

/// Subset of the ledger header carried in the block.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Header {
    #[prost(uint32, tag = "1")]
    pub ledger_version: u32,
    #[prost(bytes = "vec", tag = "2")]
    pub previous_ledger_hash: Vec<u8>,
    #[prost(int64, tag = "3")]
    pub total_coins: i64,
    #[prost(uint32, tag = "4")]
    pub base_fee: u32,
    #[prost(uint32, tag = "5")]
    pub base_reserve: u32,
}

/// A transaction applied in a ledger.
///
/// Envelope, result and result-meta are XDR blobs copied verbatim.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Transaction {
    /// Transaction hash (32 bytes)
    #[prost(bytes = "vec", tag = "1")]
    pub hash: Vec<u8>,
    #[prost(enumeration = "TransactionStatus", tag = "2")]
    pub status: i32,
    /// Close time of the enclosing ledger
    #[prost(message, optional, tag = "3")]
    pub created_at: Option<::prost_types::Timestamp>,
    /// 1-based position within the ledger
    #[prost(uint64, tag = "5")]
    pub application_order: u64,
    #[prost(bytes = "vec", tag = "6")]
    pub envelope_xdr: Vec<u8>,
    #[prost(bytes = "vec", tag = "7")]
    pub result_meta_xdr: Vec<u8>,
    #[prost(bytes = "vec", tag = "8")]
    pub result_xdr: Vec<u8>,
    /// Absent when the source record carried no events object
    #[prost(message, optional, tag = "9")]
    pub events: Option<Events>,
}

/// Events emitted by one transaction, as XDR blobs.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Events {
    /// `DiagnosticEvent` XDR
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub diagnostic_events_xdr: Vec<Vec<u8>>,
    /// `TransactionEvent` XDR
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub transaction_events_xdr: Vec<Vec<u8>>,
    /// `ContractEvent` XDR, one group per operation
    #[prost(message, repeated, tag = "3")]
    pub contract_events_xdr: Vec<ContractEvent>,
}

/// Contract events emitted by a single operation.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ContractEvent {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub events: Vec<Vec<u8>>,
}

impl Events {
    /// Returns true if no list holds any event.
    pub fn is_empty(&self) -> bool {
        self.diagnostic_events_xdr.is_empty()
            && self.transaction_events_xdr.is_empty()
            && self.contract_events_xdr.iter().all(|op| op.events.is_empty())
    }
}

impl Transaction {
    /// Lowercase hex of the transaction hash.
    pub fn hash_hex(&self) -> String {
        hex::encode(&self.hash)
    }
}

impl Block {
    /// Lowercase hex of the ledger hash.
    pub fn hash_hex(&self) -> String {
        hex::encode(&self.hash)
    }

    /// Lowercase hex of the previous ledger hash, empty without a header.
    pub fn previous_hash_hex(&self) -> String {
        self.header
            .as_ref()
            .map(|h| hex::encode(&h.previous_ledger_hash))
            .unwrap_or_default()
    }
}
