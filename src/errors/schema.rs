// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Errors for decoded values whose shape this crate does not understand.

/// Errors raised when a decoded value has no supported interpretation.
///
/// Never defaulted. The fetch aborts instead.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A contract event type outside the known set.
    #[error("Unknown contract event type {value}")]
    UnknownContractEventType {
        /// The native enum value
        value: i32,
    },

    /// A transaction result had no matching envelope in the transaction set.
    #[error("No envelope in ledger {ledger} matches transaction {tx_hash}")]
    MissingEnvelope {
        /// Ledger sequence being read
        ledger: u32,
        /// Hex hash of the orphan transaction result
        tx_hash: String,
    },
}
