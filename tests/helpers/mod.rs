// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for stellar-block-fetcher integration tests
//!
//! Provides a scripted [`LedgerSource`] and builders for synthetic ledgers so
//! the fetch engine can be exercised without a Stellar RPC node.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use stellar_block_fetcher::rpc::{LatestLedger, Ledger, RpcEvents, RpcTransaction};
use stellar_block_fetcher::{LedgerSource, Network, PaginationToken, RpcError};
use stellar_xdr::curr::{
    DependentTxCluster, FeeBumpTransaction, FeeBumpTransactionEnvelope, FeeBumpTransactionExt,
    FeeBumpTransactionInnerTx, GeneralizedTransactionSet, Hash, InnerTransactionResult,
    InnerTransactionResultPair, InnerTransactionResultResult, LedgerCloseMeta, LedgerCloseMetaV0,
    LedgerCloseMetaV1, LedgerCloseMetaV2, LedgerHeader, LedgerHeaderHistoryEntry, Limits,
    MuxedAccount, ParallelTxExecutionStage, ParallelTxsComponent, StellarValue, TimePoint,
    Transaction, TransactionEnvelope, TransactionMeta, TransactionPhase, TransactionResult,
    TransactionResultMeta, TransactionResultMetaV1, TransactionResultPair,
    TransactionResultResult, TransactionSet, TransactionSetV1, TransactionV1Envelope,
    TxSetComponent, TxSetComponentTxsMaybeDiscountedFee, Uint256, VecM, WriteXdr,
};
use tokio_util::sync::CancellationToken;

/// Close time of every fixture ledger, offset by its sequence
pub const BASE_CLOSE_TIME: u64 = 1_734_032_000;

/// Deterministic ledger hash for a sequence
pub fn ledger_hash(sequence: u32) -> [u8; 32] {
    let mut hash = [0x5e; 32];
    hash[..4].copy_from_slice(&sequence.to_be_bytes());
    hash
}

pub fn close_time(sequence: u32) -> i64 {
    (BASE_CLOSE_TIME + u64::from(sequence)) as i64
}

/// `LedgerCloseMeta` arm a fixture ledger is encoded as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaVersion {
    /// Classic transaction set
    V0,
    /// Generalized transaction set, `TransactionResultMeta` processing
    V1,
    /// Generalized transaction set, `TransactionResultMetaV1` processing
    V2,
}

impl MetaVersion {
    /// Protocol version written into the fixture header
    pub fn ledger_version(self) -> u32 {
        match self {
            MetaVersion::V0 | MetaVersion::V1 => 23,
            MetaVersion::V2 => 24,
        }
    }
}

/// One transaction to place in a fixture ledger
#[derive(Debug, Clone)]
pub struct TxFixture {
    pub envelope: TransactionEnvelope,
    pub successful: bool,
    pub meta: TransactionMeta,
}

fn classic_envelope(fee: u32) -> TransactionV1Envelope {
    TransactionV1Envelope {
        tx: Transaction {
            fee,
            ..Default::default()
        },
        signatures: VecM::default(),
    }
}

impl TxFixture {
    /// A classic transaction distinguished by its fee
    pub fn new(fee: u32, successful: bool) -> Self {
        Self {
            envelope: TransactionEnvelope::Tx(classic_envelope(fee)),
            successful,
            meta: TransactionMeta::default(),
        }
    }

    /// A fee bump wrapping a classic transaction distinguished by its fee
    pub fn fee_bump(fee: u32, successful: bool) -> Self {
        Self {
            envelope: TransactionEnvelope::TxFeeBump(FeeBumpTransactionEnvelope {
                tx: FeeBumpTransaction {
                    fee_source: MuxedAccount::Ed25519(Uint256([0xfb; 32])),
                    fee: i64::from(fee) * 2,
                    inner_tx: FeeBumpTransactionInnerTx::Tx(classic_envelope(fee)),
                    ext: FeeBumpTransactionExt::V0,
                },
                signatures: VecM::default(),
            }),
            successful,
            meta: TransactionMeta::default(),
        }
    }

    pub fn is_fee_bump(&self) -> bool {
        matches!(self.envelope, TransactionEnvelope::TxFeeBump(_))
    }

    /// Hash of the outermost envelope, the one processing records carry
    pub fn hash(&self, network: &Network) -> [u8; 32] {
        self.envelope
            .hash(network.network_id())
            .expect("fixture envelope hashes")
    }

    pub fn result(&self, network: &Network) -> TransactionResult {
        let result = match &self.envelope {
            TransactionEnvelope::TxFeeBump(outer) => {
                let FeeBumpTransactionInnerTx::Tx(inner) = &outer.tx.inner_tx;
                let inner_hash = TransactionEnvelope::Tx(inner.clone())
                    .hash(network.network_id())
                    .expect("inner envelope hashes");
                let pair = InnerTransactionResultPair {
                    transaction_hash: Hash(inner_hash),
                    result: InnerTransactionResult {
                        fee_charged: 100,
                        result: if self.successful {
                            InnerTransactionResultResult::TxSuccess(VecM::default())
                        } else {
                            InnerTransactionResultResult::TxFailed(VecM::default())
                        },
                        ext: Default::default(),
                    },
                };
                if self.successful {
                    TransactionResultResult::TxFeeBumpInnerSuccess(pair)
                } else {
                    TransactionResultResult::TxFeeBumpInnerFailed(pair)
                }
            }
            _ if self.successful => TransactionResultResult::TxSuccess(VecM::default()),
            _ => TransactionResultResult::TxFailed(VecM::default()),
        };
        TransactionResult {
            fee_charged: 100,
            result,
            ext: Default::default(),
        }
    }

    fn result_pair(&self, network: &Network) -> TransactionResultPair {
        TransactionResultPair {
            transaction_hash: Hash(self.hash(network)),
            result: self.result(network),
        }
    }
}

/// `count` transactions, every third one failed
pub fn transactions(count: usize) -> Vec<TxFixture> {
    (0..count)
        .map(|i| TxFixture::new(100 + i as u32, i % 3 != 2))
        .collect()
}

/// Classic and fee-bump transactions, each in a successful and a failed form
pub fn mixed_transactions() -> Vec<TxFixture> {
    vec![
        TxFixture::new(100, true),
        TxFixture::fee_bump(200, true),
        TxFixture::new(300, false),
        TxFixture::fee_bump(400, false),
    ]
}

/// Builds a V0 close meta for `sequence`.
///
/// The transaction set lists envelopes in reverse processing order so the
/// hash join is exercised.
pub fn close_meta(sequence: u32, network: &Network, txs: &[TxFixture]) -> LedgerCloseMeta {
    close_meta_versioned(sequence, network, txs, MetaVersion::V0)
}

/// Builds a close meta for `sequence` in the given version.
///
/// Envelopes are listed in reverse processing order. For V1 and V2 the first
/// half goes into a classic phase and the rest into a parallel phase with
/// one cluster per transaction.
pub fn close_meta_versioned(
    sequence: u32,
    network: &Network,
    txs: &[TxFixture],
    version: MetaVersion,
) -> LedgerCloseMeta {
    let ledger_header = LedgerHeaderHistoryEntry {
        hash: Hash(ledger_hash(sequence)),
        header: LedgerHeader {
            ledger_version: version.ledger_version(),
            previous_ledger_hash: Hash(ledger_hash(sequence.saturating_sub(1))),
            scp_value: StellarValue {
                close_time: TimePoint(close_time(sequence) as u64),
                ..Default::default()
            },
            ledger_seq: sequence,
            total_coins: 1_054_439_020_873_472_865,
            base_fee: 100,
            base_reserve: 5_000_000,
            ..Default::default()
        },
        ext: Default::default(),
    };
    let set: Vec<TransactionEnvelope> = txs.iter().rev().map(|tx| tx.envelope.clone()).collect();

    match version {
        MetaVersion::V0 => {
            let processing: Vec<TransactionResultMeta> = txs
                .iter()
                .map(|tx| TransactionResultMeta {
                    result: tx.result_pair(network),
                    fee_processing: Default::default(),
                    tx_apply_processing: tx.meta.clone(),
                })
                .collect();
            LedgerCloseMeta::V0(LedgerCloseMetaV0 {
                ledger_header,
                tx_set: TransactionSet {
                    previous_ledger_hash: Hash(ledger_hash(sequence.saturating_sub(1))),
                    txs: set.try_into().expect("fixture tx set fits"),
                },
                tx_processing: processing.try_into().expect("fixture processing fits"),
                ..Default::default()
            })
        }
        MetaVersion::V1 => {
            let processing: Vec<TransactionResultMeta> = txs
                .iter()
                .map(|tx| TransactionResultMeta {
                    result: tx.result_pair(network),
                    fee_processing: Default::default(),
                    tx_apply_processing: tx.meta.clone(),
                })
                .collect();
            LedgerCloseMeta::V1(LedgerCloseMetaV1 {
                ledger_header,
                tx_set: generalized_set(sequence, set),
                tx_processing: processing.try_into().expect("fixture processing fits"),
                ..Default::default()
            })
        }
        MetaVersion::V2 => {
            let processing: Vec<TransactionResultMetaV1> = txs
                .iter()
                .map(|tx| TransactionResultMetaV1 {
                    result: tx.result_pair(network),
                    tx_apply_processing: tx.meta.clone(),
                    ..Default::default()
                })
                .collect();
            LedgerCloseMeta::V2(LedgerCloseMetaV2 {
                ledger_header,
                tx_set: generalized_set(sequence, set),
                tx_processing: processing.try_into().expect("fixture processing fits"),
                ..Default::default()
            })
        }
    }
}

fn generalized_set(sequence: u32, set: Vec<TransactionEnvelope>) -> GeneralizedTransactionSet {
    let (classic, parallel) = set.split_at(set.len() / 2);
    let classic = TransactionPhase::V0(
        vec![TxSetComponent::TxsetCompTxsMaybeDiscountedFee(
            TxSetComponentTxsMaybeDiscountedFee {
                base_fee: None,
                txs: classic.to_vec().try_into().expect("classic phase fits"),
            },
        )]
        .try_into()
        .expect("classic components fit"),
    );
    let clusters: Vec<DependentTxCluster> = parallel
        .iter()
        .map(|envelope| DependentTxCluster(vec![envelope.clone()].try_into().expect("cluster fits")))
        .collect();
    let parallel = TransactionPhase::V1(ParallelTxsComponent {
        base_fee: Some(100),
        execution_stages: vec![ParallelTxExecutionStage(
            clusters.try_into().expect("stage fits"),
        )]
        .try_into()
        .expect("stages fit"),
    });

    GeneralizedTransactionSet::V1(TransactionSetV1 {
        previous_ledger_hash: Hash(ledger_hash(sequence.saturating_sub(1))),
        phases: vec![classic, parallel].try_into().expect("phases fit"),
    })
}

/// A `getLedgers` record for a fixture ledger
pub fn rpc_ledger(sequence: u32, network: &Network, txs: &[TxFixture]) -> Ledger {
    rpc_ledger_versioned(sequence, network, txs, MetaVersion::V0)
}

/// A `getLedgers` record whose metadata is encoded as `version`
pub fn rpc_ledger_versioned(
    sequence: u32,
    network: &Network,
    txs: &[TxFixture],
    version: MetaVersion,
) -> Ledger {
    let meta = close_meta_versioned(sequence, network, txs, version);
    let header = match &meta {
        LedgerCloseMeta::V0(v0) => &v0.ledger_header,
        LedgerCloseMeta::V1(v1) => &v1.ledger_header,
        LedgerCloseMeta::V2(v2) => &v2.ledger_header,
    };
    Ledger {
        sequence,
        hash: ledger_hash(sequence),
        close_time: close_time(sequence),
        header_xdr: header.to_xdr(Limits::none()).expect("header encodes"),
        metadata_xdr: meta.to_xdr(Limits::none()).expect("meta encodes"),
    }
}

/// `getTransactions` records matching a fixture ledger
///
/// Every other transaction carries an events object.
pub fn rpc_transactions(sequence: u32, network: &Network, txs: &[TxFixture]) -> Vec<RpcTransaction> {
    txs.iter()
        .enumerate()
        .map(|(i, tx)| RpcTransaction {
            status: if tx.successful { "SUCCESS" } else { "FAILED" }.to_string(),
            hash: tx.hash(network),
            application_order: i as u32 + 1,
            fee_bump: tx.is_fee_bump(),
            envelope_xdr: tx.envelope.to_xdr(Limits::none()).expect("envelope encodes"),
            result_xdr: tx.result(network).to_xdr(Limits::none()).expect("result encodes"),
            result_meta_xdr: tx.meta.to_xdr(Limits::none()).expect("meta encodes"),
            events: (i % 2 == 0).then(|| RpcEvents {
                diagnostic_events_xdr: vec![vec![0, 0, 0, 1]],
                ..Default::default()
            }),
            ledger: sequence,
            created_at: close_time(sequence),
        })
        .collect()
}

/// Arguments of one `get_transactions` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionCall {
    pub ledger: u32,
    pub limit: u32,
    pub cursor: Option<PaginationToken>,
}

/// In-memory [`LedgerSource`] answering from a script
///
/// Head polls pop from a queue; once it is empty the last head is repeated.
/// Ledgers and transactions are looked up by sequence.
///
/// # Example
///
/// ```rust,ignore
/// let source = ScriptedLedgerSource::new()
///     .with_heads([8, 9, 10])
///     .with_ledger(rpc_ledger(10, &Network::Mainnet, &transactions(3)));
/// ```
#[derive(Debug, Default)]
pub struct ScriptedLedgerSource {
    heads: Mutex<VecDeque<Result<u32, RpcError>>>,
    last_head: Mutex<u32>,
    ledgers: Mutex<HashMap<u32, Vec<Ledger>>>,
    transactions: Mutex<HashMap<u32, (Option<PaginationToken>, Vec<RpcTransaction>)>>,
    head_polls: AtomicUsize,
    ledger_calls: AtomicUsize,
    transaction_calls: Mutex<Vec<TransactionCall>>,
}

impl ScriptedLedgerSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue head values returned by successive polls
    pub fn with_heads(self, heads: impl IntoIterator<Item = u32>) -> Self {
        self.heads
            .lock()
            .unwrap()
            .extend(heads.into_iter().map(Ok));
        self
    }

    /// Queue a failing poll
    pub fn with_head_error(self, error: RpcError) -> Self {
        self.heads.lock().unwrap().push_back(Err(error));
        self
    }

    /// Add a ledger to the `getLedgers` answer for its sequence
    pub fn with_ledger(self, ledger: Ledger) -> Self {
        self.ledgers
            .lock()
            .unwrap()
            .entry(ledger.sequence)
            .or_default()
            .push(ledger);
        self
    }

    /// Set the `getTransactions` answer for a ledger
    pub fn with_transactions(
        self,
        ledger: u32,
        cursor: Option<PaginationToken>,
        transactions: Vec<RpcTransaction>,
    ) -> Self {
        self.transactions
            .lock()
            .unwrap()
            .insert(ledger, (cursor, transactions));
        self
    }

    pub fn head_polls(&self) -> usize {
        self.head_polls.load(Ordering::SeqCst)
    }

    pub fn ledger_calls(&self) -> usize {
        self.ledger_calls.load(Ordering::SeqCst)
    }

    pub fn transaction_calls(&self) -> Vec<TransactionCall> {
        self.transaction_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerSource for ScriptedLedgerSource {
    async fn get_latest_ledger(&self, _cancel: &CancellationToken) -> Result<LatestLedger, RpcError> {
        self.head_polls.fetch_add(1, Ordering::SeqCst);
        let next = self.heads.lock().unwrap().pop_front();
        let sequence = match next {
            Some(Ok(head)) => {
                *self.last_head.lock().unwrap() = head;
                head
            }
            Some(Err(error)) => return Err(error),
            None => *self.last_head.lock().unwrap(),
        };
        Ok(LatestLedger {
            id: ledger_hash(sequence),
            protocol_version: 23,
            sequence,
            close_time: Some(close_time(sequence)),
        })
    }

    async fn get_ledgers(
        &self,
        _cancel: &CancellationToken,
        sequence: u32,
    ) -> Result<Vec<Ledger>, RpcError> {
        self.ledger_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .ledgers
            .lock()
            .unwrap()
            .get(&sequence)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_transactions(
        &self,
        _cancel: &CancellationToken,
        ledger: u32,
        limit: u32,
        cursor: Option<PaginationToken>,
    ) -> Result<(Option<PaginationToken>, Vec<RpcTransaction>), RpcError> {
        self.transaction_calls.lock().unwrap().push(TransactionCall {
            ledger,
            limit,
            cursor,
        });
        Ok(self
            .transactions
            .lock()
            .unwrap()
            .get(&ledger)
            .cloned()
            .unwrap_or_default())
    }
}
