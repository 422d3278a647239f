//! Canonical, conflict-free form of a validated read request.
//!
//! Where the raw descriptor carries the legacy and expression parameter
//! styles as separate nullable fields, the normalized request resolves each
//! field family into an explicit two-variant sum type, so the
//! mutual-exclusion invariants hold by construction. A transport layer can
//! serialize this directly; `to_descriptor` converts back for callers that
//! want to re-validate or amend a request.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::attribute_value::AttributeValue;
use crate::descriptor::{OperationKind, ReadRequestDescriptor};
use crate::types::{Condition, ConditionalOperator, ReturnConsumedCapacity, Select};

/// The resolved projection for a request: legacy list or expression, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    /// Legacy style: explicit attribute names.
    Attributes(Vec<String>),
    /// Expression style: a projection expression string.
    Expression(String),
}

/// The resolved key condition for a QUERY: legacy map or expression, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KeyCondition {
    /// Legacy style: attribute name to condition.
    Conditions(HashMap<String, Condition>),
    /// Expression style: a key condition expression string.
    Expression(String),
}

/// The resolved result filter: legacy map or expression, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    /// Legacy style: attribute name to condition.
    Conditions(HashMap<String, Condition>),
    /// Expression style: a filter expression string.
    Expression(String),
}

/// A validated, canonical read request ready for a transport layer.
///
/// All invariants hold: field families are resolved to a single style,
/// every placeholder referenced by an expression has a map entry, and the
/// operation-specific fields are legal for `operation`. The request is
/// immutable once produced; re-normalizing `to_descriptor()` yields a
/// structurally equal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NormalizedRequest {
    /// Which read operation this request performs.
    pub operation: OperationKind,

    /// The table to read from.
    pub table_name: String,

    /// The secondary index to read, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,

    /// The primary key of the item to retrieve (GET only).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub key: HashMap<String, AttributeValue>,

    /// Whether a strongly consistent read was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistent_read: Option<bool>,

    /// The resolved projection, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<Projection>,

    /// The resolved key condition (always present for QUERY, never otherwise).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_condition: Option<KeyCondition>,

    /// The resolved result filter, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,

    /// Logical operator for legacy condition maps. Only present when at
    /// least one resolved family kept the legacy style.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional_operator: Option<ConditionalOperator>,

    /// Substitution tokens for attribute names in expressions.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_names: HashMap<String, String>,

    /// Substitution tokens for attribute values in expressions.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_values: HashMap<String, AttributeValue>,

    /// Pagination cursor.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub exclusive_start_key: HashMap<String, AttributeValue>,

    /// The maximum number of items to evaluate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,

    /// Index traversal order (QUERY only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_index_forward: Option<bool>,

    /// Parallel scan segment (SCAN only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<i32>,

    /// Parallel scan segment count (SCAN only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_segments: Option<i32>,

    /// Level of detail for consumed-capacity reporting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_consumed_capacity: Option<ReturnConsumedCapacity>,

    /// The resolved Select semantics. `None` for GET, which has no Select.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_select: Option<Select>,

    /// `true` when this is one segment of a parallel scan
    /// (`total_segments > 1`).
    pub is_parallel_scan: bool,

    /// Non-fatal findings, currently unused expression-attribute-name
    /// entries. Safe to send; the entries are simply ignored server-side.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl NormalizedRequest {
    /// Convert back into a raw descriptor.
    ///
    /// The resolved sum types map onto their originating raw fields, and
    /// `effective_select` becomes the explicit `Select`. Normalizing the
    /// result yields a request structurally equal to `self`.
    #[must_use]
    pub fn to_descriptor(&self) -> ReadRequestDescriptor {
        let mut desc = ReadRequestDescriptor::new(self.operation, self.table_name.clone());
        desc.index_name = self.index_name.clone();
        desc.key = self.key.clone();
        desc.consistent_read = self.consistent_read;
        desc.select = self.effective_select.clone();
        desc.conditional_operator = self.conditional_operator.clone();
        desc.expression_attribute_names = self.expression_attribute_names.clone();
        desc.expression_attribute_values = self.expression_attribute_values.clone();
        desc.exclusive_start_key = self.exclusive_start_key.clone();
        desc.limit = self.limit;
        desc.scan_index_forward = self.scan_index_forward;
        desc.segment = self.segment;
        desc.total_segments = self.total_segments;
        desc.return_consumed_capacity = self.return_consumed_capacity.clone();

        match &self.projection {
            Some(Projection::Attributes(attrs)) => desc.attributes_to_get = attrs.clone(),
            Some(Projection::Expression(expr)) => {
                desc.projection_expression = Some(expr.clone());
            }
            None => {}
        }
        match &self.key_condition {
            Some(KeyCondition::Conditions(map)) => desc.key_conditions = map.clone(),
            Some(KeyCondition::Expression(expr)) => {
                desc.key_condition_expression = Some(expr.clone());
            }
            None => {}
        }
        match &self.filter {
            Some(Filter::Conditions(map)) => match self.operation {
                OperationKind::Scan => desc.scan_filter = map.clone(),
                _ => desc.query_filter = map.clone(),
            },
            Some(Filter::Expression(expr)) => desc.filter_expression = Some(expr.clone()),
            None => {}
        }

        desc
    }
}
