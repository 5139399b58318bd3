// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Normalization of extracted transactions and block assembly.

use prost::Message;
use prost_types::{Any, Timestamp};

use crate::config::constants::{STELLAR_BLOCK_TYPE_URL, STELLAR_BLOCK_VERSION};
use crate::convert::convert_transaction_status;
use crate::decoder::{ExtractedTransaction, LedgerMetadata, TransactionEvents};
use crate::rpc::{Ledger, RpcEvents, RpcTransaction};
use crate::types::{bstream, stellar};

/// Converts a unix-seconds close time to a protobuf timestamp.
pub(crate) fn timestamp(seconds: i64) -> Timestamp {
    Timestamp { seconds, nanos: 0 }
}

fn group_contract_events(groups: Vec<Vec<Vec<u8>>>) -> Vec<stellar::ContractEvent> {
    groups
        .into_iter()
        .map(|events| stellar::ContractEvent { events })
        .collect()
}

impl From<TransactionEvents> for stellar::Events {
    fn from(events: TransactionEvents) -> Self {
        stellar::Events {
            diagnostic_events_xdr: events.diagnostic_events_xdr,
            transaction_events_xdr: events.transaction_events_xdr,
            contract_events_xdr: group_contract_events(events.contract_events_xdr),
        }
    }
}

impl From<RpcEvents> for stellar::Events {
    fn from(events: RpcEvents) -> Self {
        stellar::Events {
            diagnostic_events_xdr: events.diagnostic_events_xdr,
            transaction_events_xdr: events.transaction_events_xdr,
            contract_events_xdr: group_contract_events(events.contract_events_xdr),
        }
    }
}

/// Normalizes transactions read from ledger metadata.
///
/// Application order is renumbered densely from 1 in list order.
pub(crate) fn normalize_extracted(
    transactions: Vec<ExtractedTransaction>,
    created_at: Timestamp,
) -> Vec<stellar::Transaction> {
    transactions
        .into_iter()
        .enumerate()
        .map(|(index, tx)| {
            let status = convert_transaction_status(tx.status());
            stellar::Transaction {
                hash: tx.hash.to_vec(),
                status: status as i32,
                created_at: Some(created_at),
                application_order: index as u64 + 1,
                envelope_xdr: tx.envelope_xdr,
                result_meta_xdr: tx.result_meta_xdr,
                result_xdr: tx.result_xdr,
                events: Some(tx.events.into()),
            }
        })
        .collect()
}

/// Normalizes transactions returned by `getTransactions`.
///
/// Events stay `None` when the node sent no events object.
pub(crate) fn normalize_rpc(
    transactions: Vec<RpcTransaction>,
    created_at: Timestamp,
) -> Vec<stellar::Transaction> {
    transactions
        .into_iter()
        .enumerate()
        .map(|(index, tx)| stellar::Transaction {
            hash: tx.hash.to_vec(),
            status: convert_transaction_status(&tx.status) as i32,
            created_at: Some(created_at),
            application_order: index as u64 + 1,
            envelope_xdr: tx.envelope_xdr,
            result_meta_xdr: tx.result_meta_xdr,
            result_xdr: tx.result_xdr,
            events: tx.events.map(Into::into),
        })
        .collect()
}

/// Builds the chain-specific block for a ledger.
pub(crate) fn stellar_block(
    ledger: &Ledger,
    metadata: &LedgerMetadata,
    transactions: Vec<stellar::Transaction>,
) -> stellar::Block {
    let header = metadata.header();
    stellar::Block {
        number: u64::from(ledger.sequence),
        hash: ledger.hash.to_vec(),
        header: Some(stellar::Header {
            ledger_version: header.ledger_version,
            previous_ledger_hash: header.previous_ledger_hash.0.to_vec(),
            total_coins: header.total_coins,
            base_fee: header.base_fee,
            base_reserve: header.base_reserve,
        }),
        version: STELLAR_BLOCK_VERSION,
        transactions,
        created_at: Some(timestamp(ledger.close_time)),
    }
}

/// Wraps a Stellar block in the chain-agnostic envelope.
///
/// The previous ledger is treated as final: `lib_num == parent_num == number - 1`.
pub(crate) fn envelope(block: &stellar::Block) -> bstream::Block {
    let parent_num = block.number.saturating_sub(1);
    bstream::Block {
        number: block.number,
        id: block.hash_hex(),
        parent_id: block.previous_hash_hex(),
        timestamp: block.created_at,
        lib_num: parent_num,
        parent_num,
        payload: Some(Any {
            type_url: STELLAR_BLOCK_TYPE_URL.to_string(),
            value: block.encode_to_vec(),
        }),
    }
}
