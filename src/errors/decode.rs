// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Errors raised while decoding wire encodings and XDR payloads.

/// Errors that can occur while decoding hex, base64 or XDR payloads.
///
/// Each variant records the target type name and the length of the input so
/// that a failure can be traced back to the offending record.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The payload was not valid standard base64.
    #[error("Invalid base64 for {type_name} ({len} bytes)")]
    Base64 {
        /// Name of the type being decoded
        type_name: &'static str,
        /// Length of the encoded input
        len: usize,
        /// The underlying base64 error
        #[source]
        source: base64::DecodeError,
    },

    /// The payload was not valid hex.
    #[error("Invalid hex for {type_name} ({len} bytes)")]
    Hex {
        /// Name of the type being decoded
        type_name: &'static str,
        /// Length of the encoded input
        len: usize,
        /// The underlying hex error
        #[source]
        source: hex::FromHexError,
    },

    /// The bytes did not decode as the requested XDR type.
    #[error("Invalid XDR for {type_name} ({len} bytes)")]
    Xdr {
        /// Name of the XDR type being decoded
        type_name: &'static str,
        /// Length of the raw XDR input
        len: usize,
        /// The underlying XDR error
        #[source]
        source: stellar_xdr::curr::Error,
    },

    /// Re-encoding a decoded XDR value failed.
    #[error("Failed to encode {type_name} as XDR")]
    XdrEncode {
        /// Name of the XDR type being encoded
        type_name: &'static str,
        /// The underlying XDR error
        #[source]
        source: stellar_xdr::curr::Error,
    },

    /// A union discriminant outside the versions this crate understands.
    #[error("Unsupported {type_name} version {version}")]
    UnsupportedVersion {
        /// Name of the XDR union
        type_name: &'static str,
        /// The discriminant found in the payload
        version: i32,
    },

    /// A hash did not have the expected 32-byte length.
    #[error("Invalid hash length for {type_name}: expected 32 bytes, got {len}")]
    InvalidHashLength {
        /// Name of the hash being decoded
        type_name: &'static str,
        /// Actual decoded length
        len: usize,
    },

    /// A close time was not a valid unix timestamp in seconds.
    #[error("Invalid close time {value:?}")]
    InvalidCloseTime {
        /// The value received from the node
        value: String,
    },
}

impl DecodeError {
    /// Helper to create a `Base64` error.
    pub fn base64(type_name: &'static str, len: usize, source: base64::DecodeError) -> Self {
        DecodeError::Base64 {
            type_name,
            len,
            source,
        }
    }

    /// Helper to create a `Hex` error.
    pub fn hex(type_name: &'static str, len: usize, source: hex::FromHexError) -> Self {
        DecodeError::Hex {
            type_name,
            len,
            source,
        }
    }

    /// Helper to create an `Xdr` error.
    pub fn xdr(type_name: &'static str, len: usize, source: stellar_xdr::curr::Error) -> Self {
        DecodeError::Xdr {
            type_name,
            len,
            source,
        }
    }

    /// Helper to create an `XdrEncode` error.
    pub fn xdr_encode(type_name: &'static str, source: stellar_xdr::curr::Error) -> Self {
        DecodeError::XdrEncode { type_name, source }
    }
}
