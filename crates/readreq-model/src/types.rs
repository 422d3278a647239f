//! Shared wire types for read requests.
//!
//! Enum variants use idiomatic Rust `PascalCase` naming with `#[serde(rename)]`
//! attributes mapping to the `SCREAMING_SNAKE_CASE` strings the DynamoDB wire
//! protocol uses.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::attribute_value::AttributeValue;

/// The attributes to be returned by a Query or Scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Select {
    /// All attributes of each item.
    #[serde(rename = "ALL_ATTRIBUTES")]
    AllAttributes,
    /// All attributes projected into the index being read.
    #[serde(rename = "ALL_PROJECTED_ATTRIBUTES")]
    AllProjectedAttributes,
    /// Only the attributes named by the projection.
    #[serde(rename = "SPECIFIC_ATTRIBUTES")]
    SpecificAttributes,
    /// Only the count of matching items.
    #[serde(rename = "COUNT")]
    Count,
}

impl Select {
    /// Returns the wire-format string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllAttributes => "ALL_ATTRIBUTES",
            Self::AllProjectedAttributes => "ALL_PROJECTED_ATTRIBUTES",
            Self::SpecificAttributes => "SPECIFIC_ATTRIBUTES",
            Self::Count => "COUNT",
        }
    }
}

impl std::fmt::Display for Select {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Controls whether consumed-capacity information is reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReturnConsumedCapacity {
    /// Report capacity for the table and any indexes involved.
    #[serde(rename = "INDEXES")]
    Indexes,
    /// Report only the total consumed capacity.
    #[serde(rename = "TOTAL")]
    Total,
    /// Do not report consumed capacity (default).
    #[default]
    #[serde(rename = "NONE")]
    None,
}

impl ReturnConsumedCapacity {
    /// Returns the wire-format string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Indexes => "INDEXES",
            Self::Total => "TOTAL",
            Self::None => "NONE",
        }
    }
}

impl std::fmt::Display for ReturnConsumedCapacity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical operator joining multiple legacy conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConditionalOperator {
    /// All conditions must hold.
    #[default]
    #[serde(rename = "AND")]
    And,
    /// At least one condition must hold.
    #[serde(rename = "OR")]
    Or,
}

impl ConditionalOperator {
    /// Returns the wire-format string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl std::fmt::Display for ConditionalOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison operator used in legacy `Condition` entries.
///
/// These appear in `KeyConditions`, `QueryFilter`, and `ScanFilter`. Modern
/// requests use the expression-style parameters instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    /// Equal to.
    #[serde(rename = "EQ")]
    Eq,
    /// Not equal to.
    #[serde(rename = "NE")]
    Ne,
    /// Less than or equal to.
    #[serde(rename = "LE")]
    Le,
    /// Less than.
    #[serde(rename = "LT")]
    Lt,
    /// Greater than or equal to.
    #[serde(rename = "GE")]
    Ge,
    /// Greater than.
    #[serde(rename = "GT")]
    Gt,
    /// Attribute exists.
    #[serde(rename = "NOT_NULL")]
    NotNull,
    /// Attribute does not exist.
    #[serde(rename = "NULL")]
    Null,
    /// Value contains the operand.
    #[serde(rename = "CONTAINS")]
    Contains,
    /// Value does not contain the operand.
    #[serde(rename = "NOT_CONTAINS")]
    NotContains,
    /// Value begins with the operand.
    #[serde(rename = "BEGINS_WITH")]
    BeginsWith,
    /// Value is a member of the operand list.
    #[serde(rename = "IN")]
    In,
    /// Value is between two operands (inclusive).
    #[serde(rename = "BETWEEN")]
    Between,
}

impl ComparisonOperator {
    /// Returns the wire-format string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "EQ",
            Self::Ne => "NE",
            Self::Le => "LE",
            Self::Lt => "LT",
            Self::Ge => "GE",
            Self::Gt => "GT",
            Self::NotNull => "NOT_NULL",
            Self::Null => "NULL",
            Self::Contains => "CONTAINS",
            Self::NotContains => "NOT_CONTAINS",
            Self::BeginsWith => "BEGINS_WITH",
            Self::In => "IN",
            Self::Between => "BETWEEN",
        }
    }
}

impl std::fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A legacy condition: comparison operator plus operand values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Condition {
    /// The comparison operator to apply.
    pub comparison_operator: ComparisonOperator,
    /// The attribute values to compare against.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attribute_value_list: Vec<AttributeValue>,
}

/// A key represented as a map of key attribute names to values.
pub type Key = HashMap<String, AttributeValue>;

/// Expression attribute names mapping (`#name` placeholders to attribute names).
pub type ExpressionAttributeNames = HashMap<String, String>;

/// Expression attribute values mapping (`:value` placeholders to attribute values).
pub type ExpressionAttributeValues = HashMap<String, AttributeValue>;
