// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Stellar RPC access.
//!
//! [`StellarRpcClient`] speaks JSON-RPC 2.0 to a Stellar RPC node through
//! alloy's client and the layers in [`crate::transport`]. Responses are
//! decoded strictly and converted to the canonical records in this module,
//! so nothing above the client handles hex or base64 strings.
//!
//! The fetch engine depends on the [`LedgerSource`] trait rather than on the
//! client directly.

mod client;
mod types;
mod wire;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub use client::StellarRpcClient;
pub use types::{LatestLedger, Ledger, RpcEvents, RpcTransaction, TransactionPage};

use crate::cursor::PaginationToken;
use crate::errors::RpcError;

/// The RPC operations the fetch engine needs.
///
/// Implemented by [`StellarRpcClient`]. Tests provide scripted sources.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// Returns the chain head.
    async fn get_latest_ledger(&self, cancel: &CancellationToken) -> Result<LatestLedger, RpcError>;

    /// Returns the ledgers starting at `sequence`, at most one from a
    /// well-behaved node.
    async fn get_ledgers(
        &self,
        cancel: &CancellationToken,
        sequence: u32,
    ) -> Result<Vec<Ledger>, RpcError>;

    /// Returns every transaction of `ledger`, paging with `limit` and
    /// resuming from `cursor` when given.
    async fn get_transactions(
        &self,
        cancel: &CancellationToken,
        ledger: u32,
        limit: u32,
        cursor: Option<PaginationToken>,
    ) -> Result<(Option<PaginationToken>, Vec<RpcTransaction>), RpcError>;
}
