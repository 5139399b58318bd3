// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for the stellar-block-fetcher library.
//!
//! This module follows a hybrid approach:
//!
//! - **Module-specific errors** for fine-grained handling ([`RpcError`],
//!   [`DecodeError`], [`SchemaError`], [`CursorError`])
//! - **Unified error type** ([`FetchError`]) returned by the fetch engine,
//!   which wraps the module errors and adds the engine's own failure modes
//!
//! Callers that only need to decide what to do with a failure can use
//! [`FetchError::kind`], which collapses every error into one of the
//! [`ErrorKind`] categories.
//!
//! # Examples
//!
//! ```rust,ignore
//! use stellar_block_fetcher::{ErrorKind, Fetcher};
//!
//! match fetcher.fetch(&cancel, &client, 60_132_634).await {
//!     Ok(fetched) => forward(fetched.block),
//!     Err(e) if e.kind() == ErrorKind::Cancelled => return,
//!     Err(e) => {
//!         tracing::error!(error = %e, "fetch failed");
//!     }
//! }
//! ```

mod cursor;
mod decode;
mod rpc;
mod schema;

pub use cursor::CursorError;
pub use decode::DecodeError;
pub use rpc::RpcError;
pub use schema::SchemaError;

/// Coarse classification of a fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Network or HTTP failure, including request timeouts
    Transport,
    /// The node returned an error object or a response that failed strict decoding
    Protocol,
    /// A binary, base64 or hex payload was malformed
    Decode,
    /// The ledger was missing after its availability was confirmed
    NotFound,
    /// More than one ledger matched a single-ledger query
    Ambiguous,
    /// A decoded value had no supported interpretation
    UnsupportedSchema,
    /// The caller cancelled the fetch
    Cancelled,
}

/// The stage of the fetch pipeline in which an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchStage {
    /// Polling `getLatestLedger` until the head reaches the requested block
    AwaitHead,
    /// Fetching the ledger with `getLedgers`
    AcquireLedger,
    /// Decoding the ledger close metadata
    DecodeMetadata,
    /// Reading transactions from metadata or `getTransactions`
    ExtractTransactions,
}

impl std::fmt::Display for FetchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FetchStage::AwaitHead => "awaiting head",
            FetchStage::AcquireLedger => "fetching ledger",
            FetchStage::DecodeMetadata => "decoding ledger metadata",
            FetchStage::ExtractTransactions => "extracting transactions",
        };
        f.write_str(name)
    }
}

/// Unified error type for the fetch engine.
///
/// Module-specific errors convert into `FetchError` via `From`, so `?` works
/// in helpers. The engine itself wraps failures in [`FetchError::Stage`] to
/// record the block number and pipeline stage.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Error from the RPC client.
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Error decoding a payload.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error interpreting a decoded value.
    #[error("Unsupported schema: {0}")]
    Schema(#[from] SchemaError),

    /// Zero ledgers returned after the head confirmed availability.
    #[error("Ledger not found {block_number}")]
    NotFound {
        /// The requested block number
        block_number: u64,
    },

    /// More than one ledger returned for a single block number.
    #[error("Multiple ledgers found for block {block_number} ({count} results)")]
    Ambiguous {
        /// The requested block number
        block_number: u64,
        /// How many ledgers were returned
        count: usize,
    },

    /// The caller cancelled the fetch.
    #[error("Fetch of block {block_number} cancelled")]
    Cancelled {
        /// The requested block number
        block_number: u64,
    },

    /// A failure annotated with the block number and pipeline stage.
    #[error("Block {block_number}: {stage} failed: {source}")]
    Stage {
        /// The requested block number
        block_number: u64,
        /// The stage that failed
        stage: FetchStage,
        /// The underlying error
        #[source]
        source: Box<FetchError>,
    },
}

impl FetchError {
    /// Wraps an error with the block number and stage it occurred in.
    pub fn at_stage(block_number: u64, stage: FetchStage, source: impl Into<FetchError>) -> Self {
        FetchError::Stage {
            block_number,
            stage,
            source: Box::new(source.into()),
        }
    }

    /// Classifies the error.
    ///
    /// Stage wrappers are transparent to classification. An RPC request
    /// cancelled mid-flight classifies as [`ErrorKind::Cancelled`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Rpc(RpcError::Cancelled { .. }) => ErrorKind::Cancelled,
            FetchError::Rpc(RpcError::InvalidPayload { .. }) => ErrorKind::Decode,
            FetchError::Rpc(e) if e.is_protocol() => ErrorKind::Protocol,
            FetchError::Rpc(_) => ErrorKind::Transport,
            FetchError::Decode(DecodeError::UnsupportedVersion { .. }) => {
                ErrorKind::UnsupportedSchema
            }
            FetchError::Decode(_) => ErrorKind::Decode,
            FetchError::Schema(_) => ErrorKind::UnsupportedSchema,
            FetchError::NotFound { .. } => ErrorKind::NotFound,
            FetchError::Ambiguous { .. } => ErrorKind::Ambiguous,
            FetchError::Cancelled { .. } => ErrorKind::Cancelled,
            FetchError::Stage { source, .. } => source.kind(),
        }
    }

    /// Returns the pipeline stage the error was raised in, if recorded.
    pub fn stage(&self) -> Option<FetchStage> {
        match self {
            FetchError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
