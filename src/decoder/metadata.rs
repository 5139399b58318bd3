// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Version-independent view over `LedgerCloseMeta`.

use stellar_xdr::curr::{
    GeneralizedTransactionSet, LedgerCloseMeta, LedgerHeader, LedgerHeaderHistoryEntry,
    TransactionEnvelope, TransactionMeta, TransactionPhase, TransactionResultPair, TxSetComponent,
};

/// Decoded ledger close metadata.
///
/// Wraps every known `LedgerCloseMeta` version and exposes the parts the
/// fetcher needs without callers matching on the version.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerMetadata {
    inner: LedgerCloseMeta,
}

/// One entry of the ledger's transaction processing list.
///
/// Processing order is application order.
#[derive(Debug, Clone, Copy)]
pub struct ProcessingRecord<'a> {
    /// Transaction hash and result
    pub result: &'a TransactionResultPair,
    /// Result-meta produced while applying the transaction
    pub meta: &'a TransactionMeta,
}

impl LedgerMetadata {
    pub(crate) fn new(inner: LedgerCloseMeta) -> Self {
        Self { inner }
    }

    /// The `LedgerCloseMeta` union discriminant.
    pub fn version(&self) -> i32 {
        match &self.inner {
            LedgerCloseMeta::V0(_) => 0,
            LedgerCloseMeta::V1(_) => 1,
            LedgerCloseMeta::V2(_) => 2,
        }
    }

    /// The ledger header history entry.
    ///
    /// Newer versions are matched first.
    pub fn header_entry(&self) -> &LedgerHeaderHistoryEntry {
        match &self.inner {
            LedgerCloseMeta::V2(v2) => &v2.ledger_header,
            LedgerCloseMeta::V1(v1) => &v1.ledger_header,
            LedgerCloseMeta::V0(v0) => &v0.ledger_header,
        }
    }

    /// The ledger header.
    pub fn header(&self) -> &LedgerHeader {
        &self.header_entry().header
    }

    pub fn ledger_sequence(&self) -> u32 {
        self.header().ledger_seq
    }

    /// Hash of this ledger.
    pub fn ledger_hash(&self) -> [u8; 32] {
        self.header_entry().hash.0
    }

    pub fn previous_ledger_hash(&self) -> [u8; 32] {
        self.header().previous_ledger_hash.0
    }

    /// Ledger close time in unix seconds.
    pub fn close_time(&self) -> u64 {
        self.header().scp_value.close_time.0
    }

    /// Number of transactions applied in the ledger.
    pub fn transaction_count(&self) -> usize {
        match &self.inner {
            LedgerCloseMeta::V0(v0) => v0.tx_processing.len(),
            LedgerCloseMeta::V1(v1) => v1.tx_processing.len(),
            LedgerCloseMeta::V2(v2) => v2.tx_processing.len(),
        }
    }

    /// Transaction processing records in application order.
    pub fn processing(&self) -> Vec<ProcessingRecord<'_>> {
        match &self.inner {
            LedgerCloseMeta::V0(v0) => v0
                .tx_processing
                .iter()
                .map(|p| ProcessingRecord {
                    result: &p.result,
                    meta: &p.tx_apply_processing,
                })
                .collect(),
            LedgerCloseMeta::V1(v1) => v1
                .tx_processing
                .iter()
                .map(|p| ProcessingRecord {
                    result: &p.result,
                    meta: &p.tx_apply_processing,
                })
                .collect(),
            LedgerCloseMeta::V2(v2) => v2
                .tx_processing
                .iter()
                .map(|p| ProcessingRecord {
                    result: &p.result,
                    meta: &p.tx_apply_processing,
                })
                .collect(),
        }
    }

    /// Every envelope in the transaction set.
    ///
    /// Transaction set order is not application order. Match envelopes to
    /// [`processing`](Self::processing) records by hash.
    pub fn envelopes(&self) -> Vec<&TransactionEnvelope> {
        match &self.inner {
            LedgerCloseMeta::V0(v0) => v0.tx_set.txs.iter().collect(),
            LedgerCloseMeta::V1(v1) => generalized_envelopes(&v1.tx_set),
            LedgerCloseMeta::V2(v2) => generalized_envelopes(&v2.tx_set),
        }
    }

    /// The decoded XDR value.
    pub fn inner(&self) -> &LedgerCloseMeta {
        &self.inner
    }

    pub fn into_inner(self) -> LedgerCloseMeta {
        self.inner
    }
}

fn generalized_envelopes(set: &GeneralizedTransactionSet) -> Vec<&TransactionEnvelope> {
    let GeneralizedTransactionSet::V1(v1) = set;
    let mut envelopes = Vec::new();
    for phase in v1.phases.iter() {
        match phase {
            TransactionPhase::V0(components) => {
                for component in components.iter() {
                    let TxSetComponent::TxsetCompTxsMaybeDiscountedFee(c) = component;
                    envelopes.extend(c.txs.iter());
                }
            }
            TransactionPhase::V1(parallel) => {
                for stage in parallel.execution_stages.iter() {
                    for cluster in stage.0.iter() {
                        envelopes.extend(cluster.0.iter());
                    }
                }
            }
        }
    }
    envelopes
}
