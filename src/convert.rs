// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Conversions from Stellar-native enumerations to the normalized block model.

use stellar_xdr::curr as xdr;

use crate::config::constants::SUCCESS_STATUS;
use crate::errors::SchemaError;
use crate::types::stellar::{ContractEventType, TransactionStatus};

/// Maps an RPC transaction status string to the normalized status.
///
/// Only the literal `"SUCCESS"` is a success. `"FAILED"`, `"NOT_FOUND"` and
/// anything else map to [`TransactionStatus::Failed`].
///
/// # Example
///
/// ```rust
/// use stellar_block_fetcher::convert::convert_transaction_status;
/// use stellar_block_fetcher::types::stellar::TransactionStatus;
///
/// assert_eq!(convert_transaction_status("SUCCESS"), TransactionStatus::Success);
/// assert_eq!(convert_transaction_status("success"), TransactionStatus::Failed);
/// ```
pub fn convert_transaction_status(status: &str) -> TransactionStatus {
    if status == SUCCESS_STATUS {
        TransactionStatus::Success
    } else {
        TransactionStatus::Failed
    }
}

/// Maps a native contract event type value to the normalized type.
///
/// Unknown values are rejected rather than defaulted.
pub fn convert_contract_event_type(value: i32) -> Result<ContractEventType, SchemaError> {
    let native = xdr::ContractEventType::try_from(value)
        .map_err(|_| SchemaError::UnknownContractEventType { value })?;
    Ok(native.into())
}

impl From<xdr::ContractEventType> for ContractEventType {
    fn from(value: xdr::ContractEventType) -> Self {
        match value {
            xdr::ContractEventType::System => ContractEventType::System,
            xdr::ContractEventType::Contract => ContractEventType::Contract,
            xdr::ContractEventType::Diagnostic => ContractEventType::Diagnostic,
        }
    }
}
