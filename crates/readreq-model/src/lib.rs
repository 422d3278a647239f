//! Data model for DynamoDB-style read requests.
//!
//! This crate holds the raw [`ReadRequestDescriptor`] that callers populate
//! (GetItem/Query/Scan parameters, legacy and expression styles side by
//! side), the resolved [`NormalizedRequest`] a transport consumes, and the
//! shared wire types both are built from. The JSON wire format uses
//! `PascalCase` field names and `SCREAMING_SNAKE_CASE` enum values to match
//! the DynamoDB API; serde derives make the whole surface trivially
//! (de)serializable.
// "DynamoDB" appears in virtually every doc comment in this crate.
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

pub mod attribute_value;
pub mod descriptor;
pub mod normalized;
pub mod types;

pub use attribute_value::AttributeValue;
pub use descriptor::{OperationKind, ReadRequestDescriptor};
pub use normalized::{Filter, KeyCondition, NormalizedRequest, Projection};
