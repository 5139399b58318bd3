// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Span creation helpers for fetcher operations.
//!
//! Telemetry is kept out of the business logic: each instrumented operation
//! has a span helper here instead of an `#[instrument]` attribute. Async
//! callers attach the span with `.instrument(span)` rather than holding an
//! entered guard across `.await`.
//!
//! Usage pattern:
//! ```rust,ignore
//! pub async fn my_operation(&self, block_number: u64) -> Result<T> {
//!     async move {
//!         // Business logic here
//!     }
//!     .instrument(spans::my_operation(block_number))
//!     .await
//! }
//! ```

use tracing::{Level, Span};

use crate::config::ExtractionMode;

/// Create span for fetching one block.
///
/// Parent: None (root span for this operation)
/// Children: await_head, acquire_ledger, extract_transactions
#[inline]
pub(crate) fn fetch_block(block_number: u64) -> Span {
    tracing::span!(
        Level::INFO,
        "stellar_fetcher.fetch_block",
        block_number = block_number,
        transactions = tracing::field::Empty,
    )
}

/// Create span for polling the chain head until it reaches a block.
///
/// Parent: fetch_block span
#[inline]
pub(crate) fn await_head(block_number: u64, known_head: u64) -> Span {
    tracing::debug_span!(
        "stellar_fetcher.await_head",
        block_number = block_number,
        known_head = known_head,
        polls = tracing::field::Empty,
    )
}

/// Create span for fetching a ledger with `getLedgers`.
///
/// Parent: fetch_block span
#[inline]
pub(crate) fn acquire_ledger(block_number: u64) -> Span {
    tracing::debug_span!("stellar_fetcher.acquire_ledger", block_number = block_number)
}

/// Create span for reading the transactions of a ledger.
///
/// Parent: fetch_block span
/// Children: get_transactions span in RPC pagination mode
#[inline]
pub(crate) fn extract_transactions(block_number: u64, mode: ExtractionMode, expected: usize) -> Span {
    tracing::debug_span!(
        "stellar_fetcher.extract_transactions",
        block_number = block_number,
        mode = ?mode,
        expected = expected,
    )
}

/// Create span for paging through `getTransactions`.
///
/// Parent: extract_transactions span
#[inline]
pub(crate) fn get_transactions(ledger: u32, limit: u32, resumed: bool) -> Span {
    tracing::debug_span!(
        "stellar_rpc.get_transactions",
        ledger = ledger,
        limit = limit,
        resumed = resumed,
        pages = tracing::field::Empty,
    )
}

/// Create span for a single JSON-RPC call.
///
/// Parent: whichever fetch span issued the request
#[inline]
pub(crate) fn rpc_call(method: &str) -> Span {
    tracing::debug_span!(
        "stellar_rpc.call",
        method = %method,
        duration_ms = tracing::field::Empty,
    )
}

/// Create span for the periodic statistics logger task.
///
/// Parent: None (long-running background task)
#[inline]
pub(crate) fn stats_logger() -> Span {
    tracing::trace_span!("stellar_fetcher.stats_logger")
}
