// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Tower-based logging layer for the Stellar RPC client.
//!
//! Records the method, duration and outcome of every JSON-RPC call with
//! `tracing`. Head polls run once per retry interval for as long as the
//! fetcher waits on the chain, so they are logged one level lower than the
//! ledger and transaction reads.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};

use alloy_json_rpc::{RequestPacket, ResponsePacket};
use alloy_transport::TransportError;
use tower::Layer;
use tracing::{debug, trace, warn, Instrument};

use crate::spans;

/// Method polled while waiting for the chain head.
const HEAD_POLL_METHOD: &str = "getLatestLedger";

/// A Tower layer that logs Stellar RPC calls.
///
/// # Example
///
/// ```rust,ignore
/// use stellar_block_fetcher::transport::LoggingLayer;
/// use alloy_rpc_client::ClientBuilder;
///
/// let client = ClientBuilder::default()
///     .layer(LoggingLayer::new())
///     .http(rpc_url);
/// ```
#[derive(Clone, Debug, Default)]
pub struct LoggingLayer {
    /// Log request params (ledger numbers, cursors)
    log_params: bool,
    /// Log raw response payloads. Ledger metadata makes these large.
    log_responses: bool,
}

impl LoggingLayer {
    /// Creates a layer that logs method, timing and errors only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also log request params.
    pub fn with_params(mut self) -> Self {
        self.log_params = true;
        self
    }

    /// Also log raw response payloads.
    pub fn with_responses(mut self) -> Self {
        self.log_responses = true;
        self
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = LoggingService<S>;

    fn layer(&self, service: S) -> Self::Service {
        LoggingService {
            service,
            log_params: self.log_params,
            log_responses: self.log_responses,
        }
    }
}

/// A Tower service that logs Stellar RPC calls.
#[derive(Clone, Debug)]
pub struct LoggingService<S> {
    service: S,
    log_params: bool,
    log_responses: bool,
}

impl<S> tower::Service<RequestPacket> for LoggingService<S>
where
    S: tower::Service<RequestPacket, Response = ResponsePacket, Error = TransportError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    type Response = ResponsePacket;
    type Error = TransportError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: RequestPacket) -> Self::Future {
        let log_params = self.log_params;
        let log_responses = self.log_responses;
        let mut service = self.service.clone();

        let method = extract_method(&request);
        let params = log_params.then(|| extract_params(&request)).flatten();
        let head_poll = method == HEAD_POLL_METHOD;

        let span = spans::rpc_call(&method);
        let record_span = span.clone();

        Box::pin(
            async move {
                let start = Instant::now();

                match (&params, head_poll) {
                    (Some(params), _) => debug!(params = %params, "RPC request: {method}"),
                    (None, true) => trace!("RPC request: {method}"),
                    (None, false) => debug!("RPC request: {method}"),
                }

                let result = service.call(request).await;
                let duration_ms = start.elapsed().as_millis() as u64;
                record_span.record("duration_ms", duration_ms);

                match &result {
                    Ok(response) if log_responses => {
                        trace!(response = ?response, duration_ms, "RPC response: {method}");
                    }
                    Ok(_) if head_poll => trace!(duration_ms, "RPC response: {method}"),
                    Ok(_) => debug!(duration_ms, "RPC response: {method}"),
                    Err(e) => warn!(error = %e, duration_ms, "RPC error: {method}"),
                }

                result
            }
            .instrument(span),
        )
    }
}

/// Extract the RPC method name from a request packet.
fn extract_method(request: &RequestPacket) -> String {
    match request {
        RequestPacket::Single(req) => req.method().to_string(),
        RequestPacket::Batch(reqs) => match reqs.as_slice() {
            [] => "batch(empty)".to_string(),
            [only] => only.method().to_string(),
            _ => format!("batch({} calls)", reqs.len()),
        },
    }
}

/// Extract the serialized params of a single request.
fn extract_params(request: &RequestPacket) -> Option<String> {
    match request {
        RequestPacket::Single(req) => req.params().map(|raw| raw.get().to_string()),
        RequestPacket::Batch(_) => None,
    }
}
