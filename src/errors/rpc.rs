// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Errors raised while talking to a Stellar RPC endpoint.
//!
//! Every variant carries the name of the RPC operation that failed so the
//! caller can log the failure without additional context.

use std::time::Duration;

use alloy_transport::TransportError;

use super::DecodeError;

/// Errors that can occur during Stellar RPC operations.
///
/// # Examples
///
/// ```rust
/// use stellar_block_fetcher::RpcError;
///
/// let error = RpcError::Cancelled {
///     operation: "getLatestLedger".to_string(),
/// };
/// assert!(error.to_string().contains("getLatestLedger"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// The endpoint URL could not be parsed.
    #[error("Invalid RPC URL {url:?}")]
    InvalidUrl {
        /// The URL as given
        url: String,
        /// The underlying parse error
        #[source]
        source: url::ParseError,
    },

    /// The request never produced a JSON-RPC response.
    ///
    /// Covers connection failures, HTTP status errors and any other failure
    /// below the JSON-RPC layer.
    #[error("Transport failure during {operation}")]
    Transport {
        /// RPC method that failed
        operation: String,
        /// The underlying transport error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The node answered with a populated JSON-RPC `error` object.
    #[error("RPC error during {operation}: code {code}, message {message}")]
    Rpc {
        /// RPC method that failed
        operation: String,
        /// JSON-RPC error code
        code: i64,
        /// JSON-RPC error message
        message: String,
        /// Raw `data` member of the error object, if present
        data: Option<String>,
    },

    /// The response did not match the expected schema.
    ///
    /// Unknown fields are rejected, so this is also how schema drift on the
    /// node side surfaces.
    #[error("Malformed response for {operation}")]
    MalformedResponse {
        /// RPC method that failed
        operation: String,
        /// The underlying decode error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A response field carried an encoding that did not decode.
    #[error("Invalid payload in {operation} response")]
    InvalidPayload {
        /// RPC method whose response was invalid
        operation: String,
        /// The underlying decode error
        #[source]
        source: DecodeError,
    },

    /// The request did not complete within the configured timeout.
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        /// RPC method that timed out
        operation: String,
        /// The timeout that elapsed
        timeout: Duration,
    },

    /// The caller cancelled the request while it was in flight.
    #[error("{operation} cancelled")]
    Cancelled {
        /// RPC method that was cancelled
        operation: String,
    },
}

impl RpcError {
    /// Helper to create a `Transport` error from any error type.
    pub fn transport(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RpcError::Transport {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Helper to create a `MalformedResponse` error from any error type.
    pub fn malformed_response(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RpcError::MalformedResponse {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Helper to create an `InvalidPayload` error.
    pub fn invalid_payload(operation: impl Into<String>, source: DecodeError) -> Self {
        RpcError::InvalidPayload {
            operation: operation.into(),
            source,
        }
    }

    /// Classifies an alloy transport error for the given operation.
    pub fn from_transport_error(operation: impl Into<String>, error: TransportError) -> Self {
        let operation = operation.into();
        match error {
            TransportError::ErrorResp(payload) => RpcError::Rpc {
                operation,
                code: payload.code,
                message: payload.message.into_owned(),
                data: payload.data.map(|raw| raw.get().to_string()),
            },
            TransportError::Transport(kind) => RpcError::Transport {
                operation,
                source: Box::new(kind),
            },
            TransportError::DeserError { err, .. } => RpcError::MalformedResponse {
                operation,
                source: Box::new(err),
            },
            TransportError::SerError(err) => RpcError::MalformedResponse {
                operation,
                source: Box::new(err),
            },
            TransportError::NullResp => RpcError::MalformedResponse {
                operation,
                source: "null result where a value was expected".into(),
            },
            TransportError::UnsupportedFeature(feature) => RpcError::Transport {
                operation,
                source: feature.into(),
            },
            TransportError::LocalUsageError(source) => RpcError::Transport { operation, source },
        }
    }

    /// Returns true if the node answered with a well-formed error or a
    /// response that failed strict decoding.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            RpcError::Rpc { .. } | RpcError::MalformedResponse { .. }
        )
    }
}
