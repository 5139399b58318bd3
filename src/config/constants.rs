//! Well-known network parameters and protocol constants
//!
//! This module centralizes magic constants used throughout the crate.

use std::time::Duration;

/// Network passphrases used to derive network ids for transaction hashing.
pub mod passphrases {
    /// Stellar public network (mainnet)
    pub const MAINNET: &str = "Public Global Stellar Network ; September 2015";

    /// Stellar test network
    pub const TESTNET: &str = "Test SDF Network ; September 2015";
}

/// Type URL of the chain-specific block carried in the bstream payload.
pub const STELLAR_BLOCK_TYPE_URL: &str = "type.googleapis.com/sf.stellar.type.v1.Block";

/// Version stamped on every produced Stellar block.
pub const STELLAR_BLOCK_VERSION: u32 = 1;

/// The only RPC transaction status that maps to success.
pub const SUCCESS_STATUS: &str = "SUCCESS";

/// Status reported for a transaction that was applied but did not succeed.
pub const FAILED_STATUS: &str = "FAILED";

/// Maximum nesting depth accepted while decoding XDR from the network.
pub const XDR_DEPTH_LIMIT: u32 = 500;

/// Default delay between `getLatestLedger` polls while waiting for the head.
pub const DEFAULT_LATEST_BLOCK_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Default page size for `getTransactions`.
pub const DEFAULT_TRANSACTION_FETCH_LIMIT: u32 = 200;

/// Default HTTP request timeout for RPC calls.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(60);

/// Number of samples kept per fetch statistic.
pub const DEFAULT_STATS_WINDOW: usize = 50;

/// Default period between statistics log lines.
pub const DEFAULT_STATS_LOG_INTERVAL: Duration = Duration::from_secs(10);
