// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Chain-agnostic block envelope (`sf.bstream.v1.Block`).

/// The block envelope handed to the streaming pipeline.
///
/// The chain-specific block travels as an opaque, type-tagged payload.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Block {
    #[prost(uint64, tag = "1")]
    pub number: u64,
    /// Block id
    #[prost(string, tag = "2")]
    pub id: String,
    /// Id of the parent block
    #[prost(string, tag = "3")]
    pub parent_id: String,
    #[prost(message, optional, tag = "4")]
    pub timestamp: Option<::prost_types::Timestamp>,
    /// Last irreversible block number
    #[prost(uint64, tag = "5")]
    pub lib_num: u64,
    #[prost(uint64, tag = "10")]
    pub parent_num: u64,
    #[prost(message, optional, tag = "11")]
    pub payload: Option<::prost_types::Any>,
}

impl Block {
    /// Returns the payload type URL, if a payload is present.
    pub fn payload_type_url(&self) -> Option<&str> {
        self.payload.as_ref().map(|p| p.type_url.as_str())
    }
}
