//! Client-side validation and canonicalization for read requests.
//!
//! Read requests arrive as a [`readreq_model::ReadRequestDescriptor`], which
//! carries both the legacy parameter style (`AttributesToGet`,
//! `KeyConditions`, `QueryFilter`/`ScanFilter`) and the expression style
//! (`ProjectionExpression`, `KeyConditionExpression`, `FilterExpression`)
//! side by side. [`RequestNormalizer`] checks every structural rule a request
//! must satisfy before it is worth sending, resolves each field family to a
//! single style, and produces a canonical
//! [`readreq_model::NormalizedRequest`].
//!
//! ```
//! use readreq_model::{AttributeValue, OperationKind, ReadRequestDescriptor};
//! use readreq_normalizer::RequestNormalizer;
//!
//! let mut desc = ReadRequestDescriptor::new(OperationKind::Query, "Orders");
//! desc.key_condition_expression = Some("pk = :p".to_owned());
//! desc.expression_attribute_values
//!     .insert(":p".to_owned(), AttributeValue::S("customer-123".to_owned()));
//!
//! let normalized = RequestNormalizer::new().normalize(&desc).unwrap();
//! assert!(normalized.warnings.is_empty());
//! ```

#![allow(clippy::module_name_repetitions)]

mod config;
mod error;
mod metadata;
mod normalizer;
mod placeholder;

pub use config::{MAX_TOTAL_SEGMENTS, NormalizerConfig};
pub use error::{ValidationError, ValidationErrorKind};
pub use metadata::{IndexKind, StaticTableMetadata, TableMetadata};
pub use normalizer::RequestNormalizer;
pub use placeholder::PlaceholderRefs;
