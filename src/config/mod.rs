// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Configuration for the Stellar block fetcher
//!
//! This module provides the configuration for the fetch engine and the RPC
//! client: polling cadence, pagination limits, network selection, timeouts
//! and rate limiting.
//!
//! # Example: Using defaults
//!
//! ```rust
//! use stellar_block_fetcher::FetcherConfig;
//!
//! // Mainnet, 1s head polling, 200 transactions per page, 60s timeout
//! let config = FetcherConfig::default();
//! ```
//!
//! # Example: Custom configuration
//!
//! ```rust
//! use stellar_block_fetcher::{FetcherConfigBuilder, Network};
//! use std::time::Duration;
//!
//! let config = FetcherConfigBuilder::with_defaults()
//!     .network(Network::Testnet)
//!     .latest_block_retry_interval(Duration::from_millis(500))
//!     .rate_limit_delay(Duration::from_millis(100))
//!     .build();
//! ```

use std::time::Duration;

use sha2::{Digest, Sha256};

pub mod constants;

use constants::{
    passphrases, DEFAULT_LATEST_BLOCK_RETRY_INTERVAL, DEFAULT_RPC_TIMEOUT,
    DEFAULT_STATS_LOG_INTERVAL, DEFAULT_STATS_WINDOW, DEFAULT_TRANSACTION_FETCH_LIMIT,
};

/// The Stellar network the fetcher reads from.
///
/// The network passphrase is part of every transaction hash, so reading
/// transactions out of ledger metadata requires knowing which network the
/// ledger belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Network {
    /// Stellar public network
    #[default]
    Mainnet,
    /// Stellar test network
    Testnet,
    /// Any other network, identified by its passphrase
    Custom(String),
}

impl Network {
    /// Returns the network passphrase.
    pub fn passphrase(&self) -> &str {
        match self {
            Network::Mainnet => passphrases::MAINNET,
            Network::Testnet => passphrases::TESTNET,
            Network::Custom(passphrase) => passphrase,
        }
    }

    /// Returns the network id: the SHA-256 of the passphrase.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stellar_block_fetcher::Network;
    ///
    /// assert_ne!(Network::Mainnet.network_id(), Network::Testnet.network_id());
    /// ```
    pub fn network_id(&self) -> [u8; 32] {
        Sha256::digest(self.passphrase().as_bytes()).into()
    }

    /// Returns true for the Stellar public network.
    pub fn is_mainnet(&self) -> bool {
        matches!(self, Network::Mainnet)
    }
}

/// Where the fetch engine reads a ledger's transactions from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    /// Read transactions from the ledger close metadata already fetched
    /// with `getLedgers`. No extra round trip.
    #[default]
    Metadata,
    /// Page through `getTransactions` for the ledger. Only for nodes whose
    /// ledger metadata cannot be read directly.
    RpcPagination,
}

/// Configuration for the fetch engine and RPC client
///
/// Use [`FetcherConfigBuilder`] for a fluent API to construct instances.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Delay between `getLatestLedger` polls while the head is behind the
    /// requested block
    /// Default: 1 second
    pub latest_block_retry_interval: Duration,

    /// Maximum page size for `getTransactions`
    /// Default: 200
    pub transaction_fetch_limit: u32,

    /// Network the fetched ledgers belong to
    /// Default: mainnet
    pub network: Network,

    /// Timeout applied to each RPC request
    /// Default: 60 seconds
    pub rpc_timeout: Duration,

    /// Minimum delay between RPC requests
    /// Default: None (no delay)
    pub rate_limit_delay: Option<Duration>,

    /// Log every RPC call through the transport logging layer
    /// Default: true
    pub rpc_logging: bool,

    /// Where transactions are read from
    /// Default: ledger metadata
    pub extraction_mode: ExtractionMode,

    /// Number of samples kept per fetch statistic
    /// Default: 50
    pub stats_window: usize,

    /// Period between statistics log lines
    /// Default: 10 seconds
    pub stats_log_interval: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self::with_common_defaults()
    }
}

impl FetcherConfig {
    /// Create config with defaults suited to a public Stellar RPC provider
    ///
    /// # Example
    ///
    /// ```rust
    /// use stellar_block_fetcher::{ExtractionMode, FetcherConfig};
    /// use std::time::Duration;
    ///
    /// let config = FetcherConfig::with_common_defaults();
    /// assert_eq!(config.latest_block_retry_interval, Duration::from_secs(1));
    /// assert_eq!(config.transaction_fetch_limit, 200);
    /// assert_eq!(config.extraction_mode, ExtractionMode::Metadata);
    /// ```
    pub fn with_common_defaults() -> Self {
        Self {
            latest_block_retry_interval: DEFAULT_LATEST_BLOCK_RETRY_INTERVAL,
            transaction_fetch_limit: DEFAULT_TRANSACTION_FETCH_LIMIT,
            network: Network::Mainnet,
            rpc_timeout: DEFAULT_RPC_TIMEOUT,
            rate_limit_delay: None,
            rpc_logging: true,
            extraction_mode: ExtractionMode::Metadata,
            stats_window: DEFAULT_STATS_WINDOW,
            stats_log_interval: DEFAULT_STATS_LOG_INTERVAL,
        }
    }

    /// Create minimal config with no polling delay
    ///
    /// Suitable for testing or a local node.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stellar_block_fetcher::FetcherConfig;
    /// use std::time::Duration;
    ///
    /// let config = FetcherConfig::minimal();
    /// assert_eq!(config.latest_block_retry_interval, Duration::ZERO);
    /// assert!(config.rate_limit_delay.is_none());
    /// ```
    pub fn minimal() -> Self {
        Self {
            latest_block_retry_interval: Duration::ZERO,
            rpc_logging: false,
            ..Self::with_common_defaults()
        }
    }

    /// Page size to request from `getTransactions` for a ledger expected to
    /// hold `expected` transactions.
    ///
    /// Never zero, so an empty ledger still issues a valid request.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stellar_block_fetcher::FetcherConfig;
    ///
    /// let config = FetcherConfig::default();
    /// assert_eq!(config.transaction_page_size(12), 12);
    /// assert_eq!(config.transaction_page_size(665), 200);
    /// assert_eq!(config.transaction_page_size(0), 1);
    /// ```
    pub fn transaction_page_size(&self, expected: usize) -> u32 {
        let expected = u32::try_from(expected).unwrap_or(u32::MAX);
        expected.min(self.transaction_fetch_limit).max(1)
    }
}

/// Builder for [`FetcherConfig`]
///
/// # Example
///
/// ```rust
/// use stellar_block_fetcher::{ExtractionMode, FetcherConfigBuilder, Network};
/// use std::time::Duration;
///
/// let config = FetcherConfigBuilder::new()
///     .network(Network::Testnet)
///     .transaction_fetch_limit(50)
///     .extraction_mode(ExtractionMode::RpcPagination)
///     .rpc_timeout(Duration::from_secs(30))
///     .build();
/// ```
pub struct FetcherConfigBuilder {
    config: FetcherConfig,
}

impl Default for FetcherConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FetcherConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: FetcherConfig::minimal(),
        }
    }

    /// Start with common defaults
    ///
    /// Initializes the builder with the same defaults as
    /// [`FetcherConfig::with_common_defaults`].
    pub fn with_defaults() -> Self {
        Self {
            config: FetcherConfig::with_common_defaults(),
        }
    }

    /// Set the delay between head polls
    pub fn latest_block_retry_interval(mut self, interval: Duration) -> Self {
        self.config.latest_block_retry_interval = interval;
        self
    }

    /// Set the maximum `getTransactions` page size
    pub fn transaction_fetch_limit(mut self, limit: u32) -> Self {
        self.config.transaction_fetch_limit = limit;
        self
    }

    /// Set the network
    pub fn network(mut self, network: Network) -> Self {
        self.config.network = network;
        self
    }

    /// Set the per-request RPC timeout
    pub fn rpc_timeout(mut self, timeout: Duration) -> Self {
        self.config.rpc_timeout = timeout;
        self
    }

    /// Set a minimum delay between RPC requests
    pub fn rate_limit_delay(mut self, delay: Duration) -> Self {
        self.config.rate_limit_delay = Some(delay);
        self
    }

    /// Enable or disable RPC call logging
    pub fn rpc_logging(mut self, enabled: bool) -> Self {
        self.config.rpc_logging = enabled;
        self
    }

    /// Set where transactions are read from
    pub fn extraction_mode(mut self, mode: ExtractionMode) -> Self {
        self.config.extraction_mode = mode;
        self
    }

    /// Set the number of samples kept per statistic
    pub fn stats_window(mut self, window: usize) -> Self {
        self.config.stats_window = window.max(1);
        self
    }

    /// Set the period between statistics log lines
    pub fn stats_log_interval(mut self, interval: Duration) -> Self {
        self.config.stats_log_interval = interval;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> FetcherConfig {
        self.config
    }
}
