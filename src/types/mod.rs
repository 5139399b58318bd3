// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Block models produced by the fetcher.
//!
//! - [`stellar`]: the chain-specific Stellar block (`sf.stellar.type.v1`)
//! - [`bstream`]: the chain-agnostic envelope (`sf.bstream.v1`)
//!
//! Both are protobuf messages built with `prost` derive macros.

pub mod bstream;
pub mod stellar;
