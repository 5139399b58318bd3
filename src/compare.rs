// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Field-by-field comparison of two block envelopes.
//!
//! Used to check a freshly fetched block against a reference copy of the
//! same block, for example one read back from a block store. Transactions
//! are matched by hash, so a reordering shows up as application-order
//! differences rather than as missing transactions.
//!
//! # Example
//!
//! ```rust,ignore
//! use stellar_block_fetcher::compare::compare_blocks;
//!
//! let report = compare_blocks(&fetched.block, &stored);
//! if !report.is_identical() {
//!     eprintln!("{report}");
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use prost::Message;

use crate::types::{bstream, stellar};

/// Which event list of a transaction differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventList {
    Diagnostic,
    Transaction,
    Contract,
}

impl fmt::Display for EventList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventList::Diagnostic => "diagnostic events",
            EventList::Transaction => "transaction events",
            EventList::Contract => "contract events",
        })
    }
}

/// One transaction field that differs between the two blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionField {
    Status {
        fetched: stellar::TransactionStatus,
        reference: stellar::TransactionStatus,
    },
    ApplicationOrder { fetched: u64, reference: u64 },
    CreatedAt {
        fetched: Option<i64>,
        reference: Option<i64>,
    },
    EnvelopeXdr,
    ResultXdr,
    ResultMetaXdr,
    /// One side carries an events object, the other does not
    EventsPresence { fetched: bool, reference: bool },
    Events {
        list: EventList,
        fetched: usize,
        reference: usize,
    },
}

impl fmt::Display for TransactionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionField::Status { fetched, reference } => write!(
                f,
                "status differs: {} vs {}",
                fetched.as_str_name(),
                reference.as_str_name()
            ),
            TransactionField::ApplicationOrder { fetched, reference } => {
                write!(f, "application order differs: {fetched} vs {reference}")
            }
            TransactionField::CreatedAt { fetched, reference } => write!(
                f,
                "created at differs: {} vs {}",
                render_time(*fetched),
                render_time(*reference)
            ),
            TransactionField::EnvelopeXdr => f.write_str("envelope XDR differs"),
            TransactionField::ResultXdr => f.write_str("result XDR differs"),
            TransactionField::ResultMetaXdr => f.write_str("result meta XDR differs"),
            TransactionField::EventsPresence { fetched, reference } => write!(
                f,
                "events presence differs: {} vs {}",
                presence(*fetched),
                presence(*reference)
            ),
            TransactionField::Events {
                list,
                fetched,
                reference,
            } => write!(f, "{list} differ ({fetched} vs {reference} entries)"),
        }
    }
}

/// A single difference between two blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Difference {
    Number { fetched: u64, reference: u64 },
    Id { fetched: String, reference: String },
    ParentId { fetched: String, reference: String },
    Timestamp {
        fetched: Option<i64>,
        reference: Option<i64>,
    },
    /// A payload was absent or not a Stellar block
    Payload { side: Side, error: String },
    TransactionCount { fetched: usize, reference: usize },
    /// Only one side has a transaction with this hash
    MissingTransaction { hash: String, present_in: Side },
    Transaction {
        hash: String,
        /// Position in the fetched block
        index: usize,
        field: TransactionField,
    },
}

/// Which of the two compared blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Fetched,
    Reference,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Fetched => "fetched",
            Side::Reference => "reference",
        })
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difference::Number { fetched, reference } => {
                write!(f, "block numbers differ: {fetched} vs {reference}")
            }
            Difference::Id { fetched, reference } => {
                write!(f, "block ids differ: {fetched} vs {reference}")
            }
            Difference::ParentId { fetched, reference } => {
                write!(f, "parent ids differ: {fetched} vs {reference}")
            }
            Difference::Timestamp { fetched, reference } => write!(
                f,
                "timestamps differ: {} vs {}",
                render_time(*fetched),
                render_time(*reference)
            ),
            Difference::Payload { side, error } => {
                write!(f, "{side} payload unreadable: {error}")
            }
            Difference::TransactionCount { fetched, reference } => {
                write!(f, "transaction counts differ: {fetched} vs {reference}")
            }
            Difference::MissingTransaction { hash, present_in } => {
                write!(f, "transaction {hash} only in {present_in} block")
            }
            Difference::Transaction { hash, index, field } => {
                write!(f, "transaction {hash} (index {index}): {field}")
            }
        }
    }
}

/// Outcome of [`compare_blocks`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockComparison {
    pub differences: Vec<Difference>,
}

impl BlockComparison {
    pub fn is_identical(&self) -> bool {
        self.differences.is_empty()
    }
}

impl fmt::Display for BlockComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identical() {
            return f.write_str("blocks are identical");
        }
        writeln!(f, "found {} differences:", self.differences.len())?;
        for difference in &self.differences {
            writeln!(f, "  - {difference}")?;
        }
        Ok(())
    }
}

/// Compares a fetched block envelope with a reference copy.
///
/// Envelope fields are compared first. If either payload cannot be decoded
/// the comparison stops there.
pub fn compare_blocks(fetched: &bstream::Block, reference: &bstream::Block) -> BlockComparison {
    let mut differences = Vec::new();

    if fetched.number != reference.number {
        differences.push(Difference::Number {
            fetched: fetched.number,
            reference: reference.number,
        });
    }
    if fetched.id != reference.id {
        differences.push(Difference::Id {
            fetched: fetched.id.clone(),
            reference: reference.id.clone(),
        });
    }
    if fetched.parent_id != reference.parent_id {
        differences.push(Difference::ParentId {
            fetched: fetched.parent_id.clone(),
            reference: reference.parent_id.clone(),
        });
    }
    if fetched.timestamp != reference.timestamp {
        differences.push(Difference::Timestamp {
            fetched: fetched.timestamp.map(|t| t.seconds),
            reference: reference.timestamp.map(|t| t.seconds),
        });
    }

    let (fetched_block, reference_block) =
        match (decode_payload(fetched), decode_payload(reference)) {
            (Ok(a), Ok(b)) => (a, b),
            (a, b) => {
                for (side, result) in [(Side::Fetched, a.err()), (Side::Reference, b.err())] {
                    if let Some(error) = result {
                        differences.push(Difference::Payload { side, error });
                    }
                }
                return BlockComparison { differences };
            }
        };

    compare_transactions(&fetched_block, &reference_block, &mut differences);
    BlockComparison { differences }
}

fn decode_payload(block: &bstream::Block) -> Result<stellar::Block, String> {
    let payload = block.payload.as_ref().ok_or_else(|| "no payload".to_string())?;
    stellar::Block::decode(payload.value.as_slice()).map_err(|e| e.to_string())
}

fn compare_transactions(
    fetched: &stellar::Block,
    reference: &stellar::Block,
    differences: &mut Vec<Difference>,
) {
    if fetched.transactions.len() != reference.transactions.len() {
        differences.push(Difference::TransactionCount {
            fetched: fetched.transactions.len(),
            reference: reference.transactions.len(),
        });
    }

    let by_hash: HashMap<String, &stellar::Transaction> = reference
        .transactions
        .iter()
        .map(|tx| (tx.hash_hex(), tx))
        .collect();
    let mut seen = HashSet::with_capacity(fetched.transactions.len());

    for (index, tx) in fetched.transactions.iter().enumerate() {
        let hash = tx.hash_hex();
        match by_hash.get(&hash) {
            Some(other) => {
                for field in transaction_fields(tx, other) {
                    differences.push(Difference::Transaction {
                        hash: hash.clone(),
                        index,
                        field,
                    });
                }
            }
            None => differences.push(Difference::MissingTransaction {
                hash: hash.clone(),
                present_in: Side::Fetched,
            }),
        }
        seen.insert(hash);
    }

    for tx in &reference.transactions {
        let hash = tx.hash_hex();
        if !seen.contains(&hash) {
            differences.push(Difference::MissingTransaction {
                hash,
                present_in: Side::Reference,
            });
        }
    }
}

fn transaction_fields(a: &stellar::Transaction, b: &stellar::Transaction) -> Vec<TransactionField> {
    let mut fields = Vec::new();

    if a.status != b.status {
        fields.push(TransactionField::Status {
            fetched: a.status(),
            reference: b.status(),
        });
    }
    if a.application_order != b.application_order {
        fields.push(TransactionField::ApplicationOrder {
            fetched: a.application_order,
            reference: b.application_order,
        });
    }
    if a.created_at != b.created_at {
        fields.push(TransactionField::CreatedAt {
            fetched: a.created_at.map(|t| t.seconds),
            reference: b.created_at.map(|t| t.seconds),
        });
    }
    if a.envelope_xdr != b.envelope_xdr {
        fields.push(TransactionField::EnvelopeXdr);
    }
    if a.result_xdr != b.result_xdr {
        fields.push(TransactionField::ResultXdr);
    }
    if a.result_meta_xdr != b.result_meta_xdr {
        fields.push(TransactionField::ResultMetaXdr);
    }

    match (&a.events, &b.events) {
        (Some(x), Some(y)) => {
            if x.diagnostic_events_xdr != y.diagnostic_events_xdr {
                fields.push(TransactionField::Events {
                    list: EventList::Diagnostic,
                    fetched: x.diagnostic_events_xdr.len(),
                    reference: y.diagnostic_events_xdr.len(),
                });
            }
            if x.transaction_events_xdr != y.transaction_events_xdr {
                fields.push(TransactionField::Events {
                    list: EventList::Transaction,
                    fetched: x.transaction_events_xdr.len(),
                    reference: y.transaction_events_xdr.len(),
                });
            }
            if x.contract_events_xdr != y.contract_events_xdr {
                fields.push(TransactionField::Events {
                    list: EventList::Contract,
                    fetched: x.contract_events_xdr.len(),
                    reference: y.contract_events_xdr.len(),
                });
            }
        }
        (None, None) => {}
        (x, y) => fields.push(TransactionField::EventsPresence {
            fetched: x.is_some(),
            reference: y.is_some(),
        }),
    }

    fields
}

fn presence(present: bool) -> &'static str {
    if present {
        "present"
    } else {
        "absent"
    }
}

fn render_time(seconds: Option<i64>) -> String {
    match seconds {
        Some(s) => DateTime::<Utc>::from_timestamp(s, 0)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| s.to_string()),
        None => "none".to_string(),
    }
}
