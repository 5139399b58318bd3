// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Transport layer for the Stellar RPC client.
//!
//! Tower middleware composed into alloy's JSON-RPC client:
//!
//! - [`LoggingLayer`] records method, duration and outcome of each call
//! - [`RateLimitLayer`] enforces a minimum spacing between request starts
//!
//! [`build_client`] assembles an HTTP client with the layers a
//! [`FetcherConfig`] asks for.
//!
//! ```rust,ignore
//! use stellar_block_fetcher::transport::{LoggingLayer, RateLimitLayer};
//! use alloy_rpc_client::ClientBuilder;
//! use std::time::Duration;
//!
//! let client = ClientBuilder::default()
//!     .layer(LoggingLayer::new())
//!     .layer(RateLimitLayer::with_min_delay(Duration::from_millis(100)))
//!     .http(rpc_url);
//! ```

mod logging;
mod rate_limit;

use alloy_rpc_client::{ClientBuilder, RpcClient};

pub use logging::{LoggingLayer, LoggingService};
pub use rate_limit::{RateLimitLayer, RateLimitService};

use crate::config::FetcherConfig;
use crate::errors::RpcError;

/// Builds an HTTP JSON-RPC client for `url` with the configured layers.
///
/// # Errors
///
/// Returns [`RpcError::InvalidUrl`] if `url` does not parse.
pub fn build_client(url: &str, config: &FetcherConfig) -> Result<RpcClient, RpcError> {
    let parsed: url::Url = url.parse().map_err(|source| RpcError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;

    let client = match (config.rate_limit_delay, config.rpc_logging) {
        (Some(delay), true) => ClientBuilder::default()
            .layer(LoggingLayer::new())
            .layer(RateLimitLayer::with_min_delay(delay))
            .http(parsed),
        (Some(delay), false) => ClientBuilder::default()
            .layer(RateLimitLayer::with_min_delay(delay))
            .http(parsed),
        (None, true) => ClientBuilder::default()
            .layer(LoggingLayer::new())
            .http(parsed),
        (None, false) => ClientBuilder::default().http(parsed),
    };

    Ok(client)
}
