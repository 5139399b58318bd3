// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Chain-head-following Stellar ledger fetcher.
//!
//! Given a ledger sequence, [`Fetcher::fetch`] waits until a Stellar RPC node
//! reports it, pulls the ledger and its transactions, and returns a
//! normalized [`types::stellar::Block`] wrapped in a [`types::bstream::Block`]
//! envelope.

pub mod compare;
pub mod config;
pub mod convert;
pub mod cursor;
pub mod decoder;
pub mod errors;
pub mod fetcher;
pub mod rpc;
pub mod sink;
mod spans;
pub mod transport;
pub mod types;

pub use config::{ExtractionMode, FetcherConfig, FetcherConfigBuilder, Network};
pub use cursor::{Cursor, PaginationToken};
pub use decoder::{Decoder, LedgerMetadata};
pub use errors::{
    CursorError, DecodeError, ErrorKind, FetchError, FetchStage, RpcError, SchemaError,
};
pub use fetcher::{Fetched, Fetcher, StatsSnapshot};
pub use rpc::{LedgerSource, StellarRpcClient};
pub use sink::{EventSink, FetchEvent, RecordingEventSink, TracingEventSink};
