// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Reads the transactions applied in a ledger from its close metadata.
//!
//! Processing records carry results and result-meta in application order,
//! while envelopes live in the transaction set in a different order. The
//! reader hashes every envelope with the network id and joins the two.

use std::collections::HashMap;

use stellar_xdr::curr::{
    DiagnosticEvent, TransactionEnvelope, TransactionMeta, TransactionResultResult,
};
use tracing::trace;

use super::{encode_xdr, LedgerMetadata, ProcessingRecord};
use crate::config::constants::{FAILED_STATUS, SUCCESS_STATUS};
use crate::errors::{DecodeError, FetchError, SchemaError};

/// A transaction read from ledger close metadata, with its XDR re-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTransaction {
    /// Transaction hash
    pub hash: [u8; 32],
    /// 1-based position in the ledger's processing order
    pub application_order: u32,
    /// True for `txSUCCESS` and `txFEE_BUMP_INNER_SUCCESS`
    pub successful: bool,
    /// `TransactionEnvelope` XDR
    pub envelope_xdr: Vec<u8>,
    /// `TransactionResult` XDR
    pub result_xdr: Vec<u8>,
    /// `TransactionMeta` XDR
    pub result_meta_xdr: Vec<u8>,
    pub events: TransactionEvents,
}

impl ExtractedTransaction {
    /// Status string in the form the RPC reports it.
    pub fn status(&self) -> &'static str {
        if self.successful {
            SUCCESS_STATUS
        } else {
            FAILED_STATUS
        }
    }
}

/// Events derived from a transaction's result-meta, as XDR blobs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionEvents {
    /// `DiagnosticEvent` XDR
    pub diagnostic_events_xdr: Vec<Vec<u8>>,
    /// `TransactionEvent` XDR
    pub transaction_events_xdr: Vec<Vec<u8>>,
    /// `ContractEvent` XDR grouped by operation
    pub contract_events_xdr: Vec<Vec<Vec<u8>>>,
}

/// Joins processing records with their envelopes.
#[derive(Debug)]
pub struct TransactionReader<'a> {
    metadata: &'a LedgerMetadata,
    network_id: [u8; 32],
}

impl<'a> TransactionReader<'a> {
    /// Creates a reader for `metadata` on the network identified by `network_id`.
    pub fn new(metadata: &'a LedgerMetadata, network_id: [u8; 32]) -> Self {
        Self {
            metadata,
            network_id,
        }
    }

    /// Reads every transaction in application order.
    ///
    /// Fails on the first record that cannot be matched or re-encoded, so a
    /// caller never sees a partial list.
    pub fn read(&self) -> Result<Vec<ExtractedTransaction>, FetchError> {
        let envelopes = self.index_envelopes()?;
        let ledger = self.metadata.ledger_sequence();

        self.metadata
            .processing()
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let hash = record.result.transaction_hash.0;
                let envelope = envelopes.get(&hash).ok_or_else(|| SchemaError::MissingEnvelope {
                    ledger,
                    tx_hash: hex::encode(hash),
                })?;
                // Processing lists are bounded far below u32::MAX
                let application_order = u32::try_from(index + 1).unwrap_or(u32::MAX);
                extract(record, envelope, application_order)
            })
            .collect()
    }

    fn index_envelopes(&self) -> Result<HashMap<[u8; 32], &'a TransactionEnvelope>, DecodeError> {
        let envelopes = self.metadata.envelopes();
        let mut index = HashMap::with_capacity(envelopes.len());
        for envelope in envelopes {
            let hash = envelope
                .hash(self.network_id)
                .map_err(|e| DecodeError::xdr_encode("TransactionEnvelope", e))?;
            index.insert(hash, envelope);
        }
        trace!(
            ledger = self.metadata.ledger_sequence(),
            envelopes = index.len(),
            "Indexed transaction set"
        );
        Ok(index)
    }
}

fn extract(
    record: ProcessingRecord<'_>,
    envelope: &TransactionEnvelope,
    application_order: u32,
) -> Result<ExtractedTransaction, FetchError> {
    let result = &record.result.result;
    let successful = matches!(
        result.result,
        TransactionResultResult::TxSuccess(_) | TransactionResultResult::TxFeeBumpInnerSuccess(_)
    );

    Ok(ExtractedTransaction {
        hash: record.result.transaction_hash.0,
        application_order,
        successful,
        envelope_xdr: encode_xdr("TransactionEnvelope", envelope)?,
        result_xdr: encode_xdr("TransactionResult", result)?,
        result_meta_xdr: encode_xdr("TransactionMeta", record.meta)?,
        events: derive_events(record.meta, successful)?,
    })
}

/// Derives the event lists carried by one result-meta.
pub(crate) fn derive_events(
    meta: &TransactionMeta,
    successful: bool,
) -> Result<TransactionEvents, DecodeError> {
    let mut events = TransactionEvents::default();

    match meta {
        TransactionMeta::V0(_) | TransactionMeta::V1(_) | TransactionMeta::V2(_) => {}
        TransactionMeta::V3(v3) => {
            if let Some(soroban) = &v3.soroban_meta {
                if soroban.diagnostic_events.is_empty() {
                    for event in soroban.events.iter() {
                        let wrapped = DiagnosticEvent {
                            in_successful_contract_call: true,
                            event: event.clone(),
                        };
                        events
                            .diagnostic_events_xdr
                            .push(encode_xdr("DiagnosticEvent", &wrapped)?);
                    }
                } else {
                    for event in soroban.diagnostic_events.iter() {
                        events
                            .diagnostic_events_xdr
                            .push(encode_xdr("DiagnosticEvent", event)?);
                    }
                }

                if successful {
                    let group = soroban
                        .events
                        .iter()
                        .map(|e| encode_xdr("ContractEvent", e))
                        .collect::<Result<Vec<_>, _>>()?;
                    events.contract_events_xdr.push(group);
                }
            }
        }
        TransactionMeta::V4(v4) => {
            for event in v4.diagnostic_events.iter() {
                events
                    .diagnostic_events_xdr
                    .push(encode_xdr("DiagnosticEvent", event)?);
            }
            for event in v4.events.iter() {
                events
                    .transaction_events_xdr
                    .push(encode_xdr("TransactionEvent", event)?);
            }
            if successful {
                for operation in v4.operations.iter() {
                    let group = operation
                        .events
                        .iter()
                        .map(|e| encode_xdr("ContractEvent", e))
                        .collect::<Result<Vec<_>, _>>()?;
                    events.contract_events_xdr.push(group);
                }
            }
        }
    }

    Ok(events)
}
