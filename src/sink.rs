// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Progress events emitted by the fetch engine.
//!
//! The engine reports what it is doing through an [`EventSink`] handed to it
//! at construction. [`TracingEventSink`] turns events into log lines and is
//! the default. [`RecordingEventSink`] keeps them in memory for assertions.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

/// Something the fetch engine did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    /// `getLatestLedger` answered while waiting for a block
    HeadPolled {
        /// Head after the poll
        head: u64,
        /// The block being waited for
        requested: u64,
    },
    /// `getLedgers` returned the requested ledger
    LedgerFetched { number: u64, elapsed: Duration },
    /// Transactions were read for a ledger
    TransactionsExtracted { number: u64, count: usize },
    /// Ledger metadata or the transactions in it could not be decoded
    DecodeFailed { number: u64, error: String },
    /// A block was assembled and is about to be returned
    BlockAssembled { number: u64, transactions: usize },
}

/// Receiver of [`FetchEvent`]s.
///
/// Called synchronously on the fetch path; implementations must not block.
pub trait EventSink: Send + Sync + std::fmt::Debug {
    fn emit(&self, event: &FetchEvent);
}

/// Logs every event with `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: &FetchEvent) {
        match event {
            FetchEvent::HeadPolled { head, requested } => {
                info!(
                    latest_block_num = head,
                    requested_block_num = requested,
                    "Got latest block num"
                );
            }
            FetchEvent::LedgerFetched { number, elapsed } => {
                debug!(block_number = number, elapsed_ms = elapsed.as_millis() as u64, "Fetched ledger");
            }
            FetchEvent::TransactionsExtracted { number, count } => {
                debug!(block_number = number, count, "Extracted transactions");
            }
            FetchEvent::DecodeFailed { number, error } => {
                warn!(block_number = number, error = %error, "Failed to decode ledger");
            }
            FetchEvent::BlockAssembled {
                number,
                transactions,
            } => {
                debug!(block_number = number, transactions, "Assembled block");
            }
        }
    }
}

/// Stores every event in memory.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<FetchEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far, oldest first.
    pub fn events(&self) -> Vec<FetchEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drops every recorded event.
    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: &FetchEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
