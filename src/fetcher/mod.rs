// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Chain-head-following block fetch engine.
//!
//! [`Fetcher::fetch`] turns a ledger sequence into a finalized block envelope:
//!
//! 1. Poll `getLatestLedger` until the head reaches the block
//! 2. Fetch the ledger with `getLedgers`
//! 3. Decode its close metadata
//! 4. Read its transactions, from the metadata or from `getTransactions`
//! 5. Normalize them and wrap the Stellar block in a bstream envelope
//!
//! Every step fails fast. A failure carries the block number and the stage
//! it happened in, and no partial block is ever returned. Only the head poll
//! loops; everything else is attempted once.
//!
//! # Example
//!
//! ```rust,ignore
//! use stellar_block_fetcher::{Fetcher, FetcherConfig, StellarRpcClient};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = FetcherConfig::with_common_defaults();
//! let client = StellarRpcClient::new("https://mainnet.sorobanrpc.com", &config)?;
//! let fetcher = Fetcher::new(config);
//! let cancel = CancellationToken::new();
//!
//! let _stats = fetcher.spawn_stats_logger(cancel.child_token());
//! let fetched = fetcher.fetch(&cancel, &client, 60_132_634).await?;
//! println!("{} -> {}", fetched.block.number, fetched.block.id);
//! ```

mod assemble;
pub mod stats;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Instrument, Span};

pub use stats::{DurationSummary, FetchStats, StatsSnapshot};

use crate::config::{ExtractionMode, FetcherConfig};
use crate::cursor::PaginationToken;
use crate::decoder::{Decoder, LedgerMetadata, TransactionReader};
use crate::errors::{FetchError, FetchStage};
use crate::rpc::{Ledger, LedgerSource};
use crate::sink::{EventSink, FetchEvent, TracingEventSink};
use crate::spans;
use crate::types::{bstream, stellar};

/// Result of a successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    /// The assembled block envelope
    pub block: bstream::Block,
    /// Reserved. Always `false`: every ledger produces a block.
    pub skipped: bool,
}

/// Mutable engine state shared across fetches.
#[derive(Debug, Default)]
struct FetchState {
    /// Highest head observed so far
    head: u64,
    /// `getTransactions` continuation, only set while a fetch is running
    cursor: Option<PaginationToken>,
}

/// Clears the pagination cursor when a fetch ends, whether it returns,
/// fails or is dropped.
struct CursorReset<'a> {
    state: &'a Mutex<FetchState>,
}

impl Drop for CursorReset<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cursor = None;
    }
}

/// Fetches Stellar ledgers as bstream blocks.
///
/// One `Fetcher` is meant to be driven by a single caller at a time, fetching
/// block numbers in order. Its methods take `&self` and the head, cursor and
/// statistics sit behind mutexes that are never held across an `.await`.
#[derive(Debug)]
pub struct Fetcher {
    config: FetcherConfig,
    decoder: Decoder,
    network_id: [u8; 32],
    state: Mutex<FetchState>,
    stats: Arc<Mutex<FetchStats>>,
    sink: Arc<dyn EventSink>,
}

impl Fetcher {
    /// Creates a fetcher that reports progress through `tracing`.
    pub fn new(config: FetcherConfig) -> Self {
        Self::with_sink(config, Arc::new(TracingEventSink))
    }

    /// Creates a fetcher that reports progress to `sink`.
    pub fn with_sink(config: FetcherConfig, sink: Arc<dyn EventSink>) -> Self {
        let network_id = config.network.network_id();
        let stats = FetchStats::new(config.stats_window);
        Self {
            config,
            decoder: Decoder::new(),
            network_id,
            state: Mutex::new(FetchState::default()),
            stats: Arc::new(Mutex::new(stats)),
            sink,
        }
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Highest chain head observed so far. Zero before the first poll.
    pub fn head(&self) -> u64 {
        self.lock_state().head
    }

    /// Pagination cursor carried by the fetch in progress, if any.
    pub fn cursor(&self) -> Option<PaginationToken> {
        self.lock_state().cursor.clone()
    }

    /// Returns true if the last observed head has reached `block_number`.
    ///
    /// Does not query the node.
    pub fn is_block_available(&self, block_number: u64) -> bool {
        self.head() >= block_number
    }

    /// Returns the current fetch statistics.
    pub fn stats(&self) -> StatsSnapshot {
        lock_stats(&self.stats).snapshot()
    }

    /// Fetches block `block_number`, waiting for the chain head to reach it.
    ///
    /// The head wait has no cap and ends only when the node reports the
    /// block, a poll fails or `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Stage`] naming the failed step. Use
    /// [`FetchError::kind`] to classify it.
    pub async fn fetch<S>(
        &self,
        cancel: &CancellationToken,
        client: &S,
        block_number: u64,
    ) -> Result<Fetched, FetchError>
    where
        S: LedgerSource + ?Sized,
    {
        let span = spans::fetch_block(block_number);
        async move {
            let started = Instant::now();
            let inter_call_delay = lock_stats(&self.stats).begin_fetch(started);
            let _reset = CursorReset { state: &self.state };

            // Ledger sequences are u32 on the wire
            let sequence = u32::try_from(block_number).map_err(|_| {
                FetchError::at_stage(
                    block_number,
                    FetchStage::AcquireLedger,
                    FetchError::NotFound { block_number },
                )
            })?;

            self.await_head(cancel, client, block_number).await?;

            let acquisition_start = Instant::now();
            let ledger = self.acquire_ledger(cancel, client, sequence).await?;
            let acquisition = acquisition_start.elapsed();

            let conversion_start = Instant::now();
            let metadata = self.decode_metadata(block_number, &ledger)?;
            let transactions = self
                .extract_transactions(cancel, client, &ledger, &metadata)
                .await?;

            let block = assemble::stellar_block(&ledger, &metadata, transactions);
            let transaction_count = block.transactions.len();
            let envelope = assemble::envelope(&block);
            let conversion = conversion_start.elapsed();

            Span::current().record("transactions", transaction_count);
            self.sink.emit(&FetchEvent::BlockAssembled {
                number: block_number,
                transactions: transaction_count,
            });
            lock_stats(&self.stats).record(
                acquisition,
                conversion,
                started.elapsed(),
                inter_call_delay,
            );

            Ok(Fetched {
                block: envelope,
                skipped: false,
            })
        }
        .instrument(span)
        .await
    }

    async fn await_head<S>(
        &self,
        cancel: &CancellationToken,
        client: &S,
        block_number: u64,
    ) -> Result<(), FetchError>
    where
        S: LedgerSource + ?Sized,
    {
        let known_head = self.head();
        if known_head >= block_number {
            return Ok(());
        }

        let retry_interval = self.config.latest_block_retry_interval;
        let cancelled = || {
            FetchError::at_stage(
                block_number,
                FetchStage::AwaitHead,
                FetchError::Cancelled { block_number },
            )
        };

        async move {
            let mut delay = Duration::ZERO;
            let mut polls: u64 = 0;

            while self.head() < block_number {
                if cancel.is_cancelled() {
                    return Err(cancelled());
                }
                if !delay.is_zero() {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(cancelled()),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                delay = retry_interval;

                let latest = client.get_latest_ledger(cancel).await.map_err(|e| {
                    warn!(block_number, error = %e, "Failed to get latest ledger");
                    FetchError::at_stage(block_number, FetchStage::AwaitHead, e)
                })?;
                polls += 1;

                let head = self.observe_head(u64::from(latest.sequence));
                self.sink.emit(&FetchEvent::HeadPolled {
                    head,
                    requested: block_number,
                });
            }

            Span::current().record("polls", polls);
            Ok(())
        }
        .instrument(spans::await_head(block_number, known_head))
        .await
    }

    async fn acquire_ledger<S>(
        &self,
        cancel: &CancellationToken,
        client: &S,
        sequence: u32,
    ) -> Result<Ledger, FetchError>
    where
        S: LedgerSource + ?Sized,
    {
        let block_number = u64::from(sequence);
        let at_stage = |e: FetchError| FetchError::at_stage(block_number, FetchStage::AcquireLedger, e);

        async move {
            let start = Instant::now();
            let mut ledgers = client.get_ledgers(cancel, sequence).await.map_err(|e| {
                warn!(block_number, error = %e, "Failed to get ledger");
                at_stage(e.into())
            })?;

            let ledger = match ledgers.len() {
                0 => return Err(at_stage(FetchError::NotFound { block_number })),
                1 => ledgers.remove(0),
                count => {
                    return Err(at_stage(FetchError::Ambiguous {
                        block_number,
                        count,
                    }))
                }
            };
            if ledger.sequence != sequence {
                warn!(
                    block_number,
                    returned = ledger.sequence,
                    "Node returned a different ledger than requested"
                );
                return Err(at_stage(FetchError::NotFound { block_number }));
            }

            self.sink.emit(&FetchEvent::LedgerFetched {
                number: block_number,
                elapsed: start.elapsed(),
            });
            Ok(ledger)
        }
        .instrument(spans::acquire_ledger(block_number))
        .await
    }

    fn decode_metadata(&self, block_number: u64, ledger: &Ledger) -> Result<LedgerMetadata, FetchError> {
        self.decoder
            .decode_ledger_metadata_bytes(&ledger.metadata_xdr)
            .map_err(|e| {
                self.sink.emit(&FetchEvent::DecodeFailed {
                    number: block_number,
                    error: e.to_string(),
                });
                FetchError::at_stage(block_number, FetchStage::DecodeMetadata, e)
            })
    }

    async fn extract_transactions<S>(
        &self,
        cancel: &CancellationToken,
        client: &S,
        ledger: &Ledger,
        metadata: &LedgerMetadata,
    ) -> Result<Vec<stellar::Transaction>, FetchError>
    where
        S: LedgerSource + ?Sized,
    {
        let block_number = u64::from(ledger.sequence);
        let mode = self.config.extraction_mode;
        let expected = metadata.transaction_count();
        let created_at = assemble::timestamp(ledger.close_time);
        let at_stage = |e: FetchError| FetchError::at_stage(block_number, FetchStage::ExtractTransactions, e);

        async move {
            let transactions = match mode {
                ExtractionMode::Metadata => {
                    let extracted = TransactionReader::new(metadata, self.network_id)
                        .read()
                        .map_err(|e| {
                            self.sink.emit(&FetchEvent::DecodeFailed {
                                number: block_number,
                                error: e.to_string(),
                            });
                            at_stage(e)
                        })?;
                    assemble::normalize_extracted(extracted, created_at)
                }
                ExtractionMode::RpcPagination => {
                    let carried = self.cursor();
                    let limit = self.config.transaction_page_size(expected);
                    let (cursor, fetched) = client
                        .get_transactions(cancel, ledger.sequence, limit, carried)
                        .await
                        .map_err(|e| {
                            warn!(block_number, error = %e, "Failed to get transactions");
                            at_stage(e.into())
                        })?;
                    self.lock_state().cursor = cursor;
                    assemble::normalize_rpc(fetched, created_at)
                }
            };

            self.sink.emit(&FetchEvent::TransactionsExtracted {
                number: block_number,
                count: transactions.len(),
            });
            Ok(transactions)
        }
        .instrument(spans::extract_transactions(block_number, mode, expected))
        .await
    }

    /// Raises the known head to `observed` if it is higher and returns the
    /// resulting head.
    fn observe_head(&self, observed: u64) -> u64 {
        let mut state = self.lock_state();
        state.head = state.head.max(observed);
        state.head
    }

    fn lock_state(&self) -> MutexGuard<'_, FetchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawns a task that logs a statistics snapshot every
    /// `stats_log_interval` and starts a new period after each line.
    ///
    /// The task ends when `cancel` fires.
    pub fn spawn_stats_logger(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let stats = Arc::clone(&self.stats);
        let period = self.config.stats_log_interval.max(Duration::from_millis(1));

        tokio::spawn(
            async move {
                let mut ticker = tokio::time::interval(period);
                ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                // First tick completes immediately
                ticker.tick().await;

                loop {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = ticker.tick() => {}
                    }

                    let snapshot = {
                        let mut stats = lock_stats(&stats);
                        let snapshot = stats.snapshot();
                        stats.reset_period();
                        snapshot
                    };
                    info!(
                        blocks_fetched_in_period = snapshot.blocks_fetched_in_period,
                        avg_acquisition_ms = snapshot.acquisition.average.as_millis() as u64,
                        avg_conversion_ms = snapshot.conversion.average.as_millis() as u64,
                        avg_total_ms = snapshot.total.average.as_millis() as u64,
                        avg_inter_call_delay_ms = snapshot.inter_call_delay.average.as_millis() as u64,
                        max_total_ms = snapshot.total.max.as_millis() as u64,
                        "Fetch stats"
                    );
                }
            }
            .instrument(spans::stats_logger()),
        )
    }
}

fn lock_stats(stats: &Mutex<FetchStats>) -> MutexGuard<'_, FetchStats> {
    stats.lock().unwrap_or_else(PoisonError::into_inner)
}
