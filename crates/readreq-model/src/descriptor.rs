//! Raw read-request descriptor as populated by the caller.
//!
//! The descriptor mirrors the union of GetItem/Query/Scan request parameters
//! with both the legacy parameter style (`AttributesToGet`, `KeyConditions`,
//! `QueryFilter`/`ScanFilter`, `ConditionalOperator`) and the expression
//! style (`ProjectionExpression`, `KeyConditionExpression`,
//! `FilterExpression`) present side by side. Nothing here is validated:
//! callers may populate any combination of fields, and the normalizer is the
//! boundary where conflicting or illegal combinations are rejected.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::attribute_value::AttributeValue;
use crate::types::{Condition, ConditionalOperator, ReturnConsumedCapacity, Select};

/// The kind of read operation a descriptor requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// Single-item read by primary key.
    #[serde(rename = "GET")]
    Get,
    /// Key-condition read over one partition.
    #[serde(rename = "QUERY")]
    Query,
    /// Full-table (or full-index) read.
    #[serde(rename = "SCAN")]
    Scan,
}

impl OperationKind {
    /// Returns the wire-format string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Query => "QUERY",
            Self::Scan => "SCAN",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw read request: the union of GetItem/Query/Scan parameters.
///
/// Optional fields are omitted when `None`; empty maps and lists are omitted
/// to produce minimal JSON payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReadRequestDescriptor {
    /// Which read operation this descriptor requests.
    pub operation: OperationKind,

    /// The name of the table to read from.
    pub table_name: String,

    /// The name of a secondary index to read (QUERY/SCAN only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,

    /// The primary key of the item to retrieve (GET only).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub key: HashMap<String, AttributeValue>,

    /// If `true`, a strongly consistent read is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistent_read: Option<bool>,

    /// Legacy projection: attribute names to retrieve.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes_to_get: Vec<String>,

    /// Expression-style projection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection_expression: Option<String>,

    /// The attributes to be returned in the result (QUERY/SCAN only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<Select>,

    /// Legacy key condition map (QUERY only).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub key_conditions: HashMap<String, Condition>,

    /// Expression-style key condition (QUERY only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_condition_expression: Option<String>,

    /// Legacy result filter for queries (QUERY only).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub query_filter: HashMap<String, Condition>,

    /// Legacy result filter for scans (SCAN only).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub scan_filter: HashMap<String, Condition>,

    /// Expression-style result filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_expression: Option<String>,

    /// Logical operator joining the entries of a legacy condition map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional_operator: Option<ConditionalOperator>,

    /// Substitution tokens for attribute names in expressions (`#name`).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_names: HashMap<String, String>,

    /// Substitution tokens for attribute values in expressions (`:value`).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_values: HashMap<String, AttributeValue>,

    /// Pagination cursor: the primary key of the first item to evaluate.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub exclusive_start_key: HashMap<String, AttributeValue>,

    /// The maximum number of items to evaluate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,

    /// Index traversal order: `true` (default) ascending, `false` descending
    /// (QUERY only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_index_forward: Option<bool>,

    /// For a parallel scan, the segment to be read by this worker (SCAN only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<i32>,

    /// For a parallel scan, the total number of segments (SCAN only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_segments: Option<i32>,

    /// Level of detail for consumed-capacity reporting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_consumed_capacity: Option<ReturnConsumedCapacity>,
}

impl ReadRequestDescriptor {
    /// Create an empty descriptor for the given operation and table.
    ///
    /// Every other field starts unset; callers fill in what they need.
    #[must_use]
    pub fn new(operation: OperationKind, table_name: impl Into<String>) -> Self {
        Self {
            operation,
            table_name: table_name.into(),
            index_name: None,
            key: HashMap::new(),
            consistent_read: None,
            attributes_to_get: Vec::new(),
            projection_expression: None,
            select: None,
            key_conditions: HashMap::new(),
            key_condition_expression: None,
            query_filter: HashMap::new(),
            scan_filter: HashMap::new(),
            filter_expression: None,
            conditional_operator: None,
            expression_attribute_names: HashMap::new(),
            expression_attribute_values: HashMap::new(),
            exclusive_start_key: HashMap::new(),
            limit: None,
            scan_index_forward: None,
            segment: None,
            total_segments: None,
            return_consumed_capacity: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ComparisonOperator;

    #[test]
    fn test_should_serialize_minimal_get_descriptor() {
        let mut desc = ReadRequestDescriptor::new(OperationKind::Get, "Orders");
        desc.key
            .insert("pk".to_owned(), AttributeValue::S("order-1".to_owned()));
        let json = serde_json::to_string(&desc).unwrap();
        assert!(json.contains(r#""Operation":"GET""#));
        assert!(json.contains(r#""TableName":"Orders""#));
        assert!(json.contains(r#""Key":{"pk":{"S":"order-1"}}"#));
        // Unset fields must be absent from the payload.
        assert!(!json.contains("IndexName"));
        assert!(!json.contains("KeyConditions"));
        assert!(!json.contains("Select"));
    }

    #[test]
    fn test_should_roundtrip_query_descriptor() {
        let mut desc = ReadRequestDescriptor::new(OperationKind::Query, "Orders");
        desc.key_condition_expression = Some("pk = :p".to_owned());
        desc.expression_attribute_values
            .insert(":p".to_owned(), AttributeValue::S("123".to_owned()));
        desc.scan_index_forward = Some(false);
        desc.limit = Some(25);
        let json = serde_json::to_string(&desc).unwrap();
        let parsed: ReadRequestDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(desc, parsed);
    }

    #[test]
    fn test_should_deserialize_legacy_scan_descriptor() {
        let json = r#"{
            "Operation": "SCAN",
            "TableName": "Orders",
            "ScanFilter": {
                "Status": {
                    "ComparisonOperator": "EQ",
                    "AttributeValueList": [{"S": "SHIPPED"}]
                }
            },
            "ConditionalOperator": "AND",
            "Segment": 0,
            "TotalSegments": 4
        }"#;
        let desc: ReadRequestDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(desc.operation, OperationKind::Scan);
        assert_eq!(desc.segment, Some(0));
        assert_eq!(desc.total_segments, Some(4));
        let cond = &desc.scan_filter["Status"];
        assert_eq!(cond.comparison_operator, ComparisonOperator::Eq);
    }

    #[test]
    fn test_should_display_operation_kind() {
        assert_eq!(OperationKind::Get.to_string(), "GET");
        assert_eq!(OperationKind::Query.to_string(), "QUERY");
        assert_eq!(OperationKind::Scan.to_string(), "SCAN");
    }
}
