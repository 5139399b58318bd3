// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::num::ParseIntError;

/// Errors from decoding a pagination cursor.
#[derive(Debug, thiserror::Error)]
pub enum CursorError {
    /// The primary component was not a 64-bit integer.
    #[error("Invalid cursor {cursor:?}: TOID is not numeric")]
    InvalidToid {
        /// The cursor that failed to parse
        cursor: String,
        /// The underlying parse error
        #[source]
        source: ParseIntError,
    },

    /// The dash-separated suffix was not a 64-bit integer.
    #[error("Invalid cursor {cursor:?}: suffix is not numeric")]
    InvalidSuffix {
        /// The cursor that failed to parse
        cursor: String,
        /// The underlying parse error
        #[source]
        source: ParseIntError,
    },
}
