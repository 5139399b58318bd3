// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! JSON-RPC client for a Stellar RPC endpoint.

use std::time::Duration;

use alloy_rpc_client::RpcClient;
use alloy_transport::TransportResult;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, Instrument};

use super::types::{LatestLedger, Ledger, RpcTransaction, TransactionPage};
use super::wire::{
    GetLedgersResult, GetTransactionResult, GetTransactionsResult, LatestLedgerResult,
    LedgerRangeParams, Pagination, TransactionHashParams,
};
use super::LedgerSource;
use crate::config::FetcherConfig;
use crate::cursor::PaginationToken;
use crate::errors::RpcError;
use crate::spans;
use crate::transport::build_client;

const GET_LATEST_LEDGER: &str = "getLatestLedger";
const GET_LEDGERS: &str = "getLedgers";
const GET_TRANSACTIONS: &str = "getTransactions";
const GET_TRANSACTION: &str = "getTransaction";

/// Stateless client for the Stellar RPC methods the fetcher needs.
///
/// Every operation takes a [`CancellationToken`] and is raced against it and
/// against the configured request timeout.
///
/// # Example
///
/// ```rust,ignore
/// use stellar_block_fetcher::{rpc::StellarRpcClient, FetcherConfig};
/// use tokio_util::sync::CancellationToken;
///
/// let client = StellarRpcClient::new("https://soroban-testnet.stellar.org", &FetcherConfig::default())?;
/// let head = client.get_latest_ledger(&CancellationToken::new()).await?;
/// println!("head at {}", head.sequence);
/// ```
#[derive(Debug, Clone)]
pub struct StellarRpcClient {
    client: RpcClient,
    timeout: Duration,
}

impl StellarRpcClient {
    /// Creates an HTTP client for `url` with the transport layers `config`
    /// enables.
    pub fn new(url: &str, config: &FetcherConfig) -> Result<Self, RpcError> {
        Ok(Self::from_client(build_client(url, config)?, config.rpc_timeout))
    }

    /// Wraps an existing JSON-RPC client.
    pub fn from_client(client: RpcClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Returns the chain head.
    pub async fn get_latest_ledger(
        &self,
        cancel: &CancellationToken,
    ) -> Result<LatestLedger, RpcError> {
        let call = self
            .client
            .request_noparams::<LatestLedgerResult>(GET_LATEST_LEDGER);
        let result = self.dispatch(cancel, GET_LATEST_LEDGER, call).await?;
        LatestLedger::try_from(result).map_err(|e| RpcError::invalid_payload(GET_LATEST_LEDGER, e))
    }

    /// Returns the ledger at `sequence`.
    ///
    /// A well-behaved node answers with zero or one ledger. Nothing is
    /// truncated here; the caller decides what more than one means.
    pub async fn get_ledgers(
        &self,
        cancel: &CancellationToken,
        sequence: u32,
    ) -> Result<Vec<Ledger>, RpcError> {
        let params = LedgerRangeParams {
            start_ledger: Some(sequence),
            pagination: Pagination {
                cursor: None,
                limit: 1,
            },
        };
        let call = self
            .client
            .request::<_, GetLedgersResult>(GET_LEDGERS, params);
        let result = self.dispatch(cancel, GET_LEDGERS, call).await?;

        result
            .ledgers
            .into_iter()
            .map(Ledger::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RpcError::invalid_payload(GET_LEDGERS, e))
    }

    /// Fetches one page of `getTransactions`.
    ///
    /// With a cursor the request carries only the pagination object; the
    /// node resumes from the cursor position and ignores the start ledger.
    pub async fn get_transactions_page(
        &self,
        cancel: &CancellationToken,
        ledger: u32,
        limit: u32,
        cursor: Option<PaginationToken>,
    ) -> Result<TransactionPage, RpcError> {
        let start_ledger = cursor.is_none().then_some(ledger);
        let params = LedgerRangeParams {
            start_ledger,
            pagination: Pagination { cursor, limit },
        };
        let call = self
            .client
            .request::<_, GetTransactionsResult>(GET_TRANSACTIONS, params);
        let result = self.dispatch(cancel, GET_TRANSACTIONS, call).await?;

        let transactions = result
            .transactions
            .into_iter()
            .map(RpcTransaction::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RpcError::invalid_payload(GET_TRANSACTIONS, e))?;

        Ok(TransactionPage {
            transactions,
            cursor: PaginationToken::new(result.cursor),
            latest_ledger: result.latest_ledger,
        })
    }

    /// Pages through `getTransactions` until every transaction of `ledger`
    /// has been read.
    ///
    /// Stops on an empty page, on an empty cursor, or on the first
    /// transaction belonging to another ledger (which is not returned).
    /// Returns the last cursor received together with the transactions.
    pub async fn get_transactions(
        &self,
        cancel: &CancellationToken,
        ledger: u32,
        limit: u32,
        cursor: Option<PaginationToken>,
    ) -> Result<(Option<PaginationToken>, Vec<RpcTransaction>), RpcError> {
        let span = spans::get_transactions(ledger, limit, cursor.is_some());
        let pages_span = span.clone();

        async move {
            let mut cursor = cursor;
            let mut transactions = Vec::new();
            let mut pages = 0u32;

            loop {
                let page = self
                    .get_transactions_page(cancel, ledger, limit, cursor.clone())
                    .await?;
                pages += 1;

                let mut done = page.transactions.is_empty() || page.cursor.is_none();
                for tx in page.transactions {
                    if tx.ledger != ledger {
                        trace!(found = tx.ledger, "Page ran past requested ledger");
                        done = true;
                        break;
                    }
                    transactions.push(tx);
                }

                if page.cursor.is_some() {
                    cursor = page.cursor;
                }
                if done {
                    break;
                }
            }

            pages_span.record("pages", pages);
            debug!(count = transactions.len(), pages, "Fetched ledger transactions");
            Ok((cursor, transactions))
        }
        .instrument(span)
        .await
    }

    /// Looks up a single transaction by hex hash.
    ///
    /// A `NOT_FOUND` status is returned as a record, not an error.
    pub async fn get_transaction(
        &self,
        cancel: &CancellationToken,
        hash: &str,
    ) -> Result<RpcTransaction, RpcError> {
        let params = TransactionHashParams {
            hash: hash.to_string(),
        };
        let call = self
            .client
            .request::<_, GetTransactionResult>(GET_TRANSACTION, params);
        let result = self.dispatch(cancel, GET_TRANSACTION, call).await?;
        RpcTransaction::try_from(result).map_err(|e| RpcError::invalid_payload(GET_TRANSACTION, e))
    }

    /// Races a prepared call against cancellation and the request timeout.
    async fn dispatch<F, R>(
        &self,
        cancel: &CancellationToken,
        operation: &'static str,
        call: F,
    ) -> Result<R, RpcError>
    where
        F: std::future::Future<Output = TransportResult<R>>,
    {
        if cancel.is_cancelled() {
            return Err(RpcError::Cancelled {
                operation: operation.to_string(),
            });
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RpcError::Cancelled {
                operation: operation.to_string(),
            }),
            outcome = tokio::time::timeout(self.timeout, call) => match outcome {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(RpcError::from_transport_error(operation, e)),
                Err(_) => Err(RpcError::Timeout {
                    operation: operation.to_string(),
                    timeout: self.timeout,
                }),
            },
        }
    }
}

#[async_trait]
impl LedgerSource for StellarRpcClient {
    async fn get_latest_ledger(&self, cancel: &CancellationToken) -> Result<LatestLedger, RpcError> {
        StellarRpcClient::get_latest_ledger(self, cancel).await
    }

    async fn get_ledgers(
        &self,
        cancel: &CancellationToken,
        sequence: u32,
    ) -> Result<Vec<Ledger>, RpcError> {
        StellarRpcClient::get_ledgers(self, cancel, sequence).await
    }

    async fn get_transactions(
        &self,
        cancel: &CancellationToken,
        ledger: u32,
        limit: u32,
        cursor: Option<PaginationToken>,
    ) -> Result<(Option<PaginationToken>, Vec<RpcTransaction>), RpcError> {
        StellarRpcClient::get_transactions(self, cancel, ledger, limit, cursor).await
    }
}
