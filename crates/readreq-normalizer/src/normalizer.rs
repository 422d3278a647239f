//! Request validation and canonicalization.
//!
//! [`RequestNormalizer::normalize`] takes a raw [`ReadRequestDescriptor`] and
//! either produces a conflict-free [`NormalizedRequest`] or reports the first
//! structural violation as a [`ValidationError`]. Placeholder resolution is
//! the one exception to fail-fast: every unresolved or unused token is
//! collected into a single aggregated error so one report suffices to fix
//! the request.
//!
//! Normalization is a pure function of the descriptor (plus the optional
//! table-metadata collaborator): no I/O, no shared state, safe to call
//! concurrently from any number of threads.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use readreq_model::descriptor::{OperationKind, ReadRequestDescriptor};
use readreq_model::normalized::{Filter, KeyCondition, NormalizedRequest, Projection};
use readreq_model::types::Select;

use crate::config::NormalizerConfig;
use crate::error::ValidationError;
use crate::metadata::{IndexKind, TableMetadata};
use crate::placeholder::PlaceholderRefs;

/// Validate a table or index name: 3-255 characters, `[a-zA-Z0-9._-]+`.
fn validate_name(field: &str, name: &str) -> Result<(), ValidationError> {
    let valid_chars = name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || b == b'-');
    if name.len() < 3 || name.len() > 255 || !valid_chars {
        return Err(ValidationError::pattern_mismatch(field, name));
    }
    Ok(())
}

/// Reject the first field in `checks` that is present.
fn reject_present(op: OperationKind, checks: &[(&str, bool)]) -> Result<(), ValidationError> {
    for (field, present) in checks {
        if *present {
            return Err(ValidationError::not_allowed(field, op));
        }
    }
    Ok(())
}

/// Check operation-kind-specific required and forbidden fields.
fn validate_fields_for_operation(desc: &ReadRequestDescriptor) -> Result<(), ValidationError> {
    match desc.operation {
        OperationKind::Get => {
            if desc.key.is_empty() {
                return Err(ValidationError::missing_field(
                    "Key",
                    "Key is required for GET requests and must not be empty",
                ));
            }
            reject_present(
                desc.operation,
                &[
                    ("IndexName", desc.index_name.is_some()),
                    ("Select", desc.select.is_some()),
                    ("KeyConditions", !desc.key_conditions.is_empty()),
                    (
                        "KeyConditionExpression",
                        desc.key_condition_expression.is_some(),
                    ),
                    ("QueryFilter", !desc.query_filter.is_empty()),
                    ("ScanFilter", !desc.scan_filter.is_empty()),
                    ("FilterExpression", desc.filter_expression.is_some()),
                    ("ConditionalOperator", desc.conditional_operator.is_some()),
                    ("ExclusiveStartKey", !desc.exclusive_start_key.is_empty()),
                    ("Limit", desc.limit.is_some()),
                    ("ScanIndexForward", desc.scan_index_forward.is_some()),
                    ("Segment", desc.segment.is_some()),
                    ("TotalSegments", desc.total_segments.is_some()),
                ],
            )
        }
        OperationKind::Query => {
            reject_present(
                desc.operation,
                &[
                    ("Key", !desc.key.is_empty()),
                    ("ScanFilter", !desc.scan_filter.is_empty()),
                    ("Segment", desc.segment.is_some()),
                    ("TotalSegments", desc.total_segments.is_some()),
                ],
            )?;
            if desc.key_conditions.is_empty() && desc.key_condition_expression.is_none() {
                return Err(ValidationError::missing_field(
                    "KeyConditionExpression",
                    "QUERY requests require either KeyConditions or KeyConditionExpression",
                ));
            }
            Ok(())
        }
        OperationKind::Scan => reject_present(
            desc.operation,
            &[
                ("Key", !desc.key.is_empty()),
                ("KeyConditions", !desc.key_conditions.is_empty()),
                (
                    "KeyConditionExpression",
                    desc.key_condition_expression.is_some(),
                ),
                ("QueryFilter", !desc.query_filter.is_empty()),
                ("ScanIndexForward", desc.scan_index_forward.is_some()),
            ],
        ),
    }
}

/// Check each legacy/expression field family for the allowed cardinality.
fn validate_exclusive_styles(desc: &ReadRequestDescriptor) -> Result<(), ValidationError> {
    if !desc.attributes_to_get.is_empty() && desc.projection_expression.is_some() {
        return Err(ValidationError::mutually_exclusive(
            "AttributesToGet",
            "ProjectionExpression",
        ));
    }
    if !desc.key_conditions.is_empty() && desc.key_condition_expression.is_some() {
        return Err(ValidationError::mutually_exclusive(
            "KeyConditions",
            "KeyConditionExpression",
        ));
    }
    if !desc.query_filter.is_empty() && desc.filter_expression.is_some() {
        return Err(ValidationError::mutually_exclusive(
            "QueryFilter",
            "FilterExpression",
        ));
    }
    if !desc.scan_filter.is_empty() && desc.filter_expression.is_some() {
        return Err(ValidationError::mutually_exclusive(
            "ScanFilter",
            "FilterExpression",
        ));
    }
    Ok(())
}

/// `ConditionalOperator` joins legacy condition-map entries; it is
/// meaningless without a legacy map and illegal next to expression
/// parameters.
fn validate_conditional_operator(desc: &ReadRequestDescriptor) -> Result<(), ValidationError> {
    if desc.conditional_operator.is_none() {
        return Ok(());
    }
    let mut expr_params = Vec::new();
    if desc.projection_expression.is_some() {
        expr_params.push("ProjectionExpression");
    }
    if desc.key_condition_expression.is_some() {
        expr_params.push("KeyConditionExpression");
    }
    if desc.filter_expression.is_some() {
        expr_params.push("FilterExpression");
    }
    if !expr_params.is_empty() {
        let mut fields = vec!["ConditionalOperator"];
        fields.extend(&expr_params);
        return Err(ValidationError::invalid_combination(
            fields,
            format!(
                "ConditionalOperator cannot be combined with expression parameters: {{{}}}",
                expr_params.join(", ")
            ),
        ));
    }
    let has_legacy_map = !desc.key_conditions.is_empty()
        || !desc.query_filter.is_empty()
        || !desc.scan_filter.is_empty();
    if !has_legacy_map {
        return Err(ValidationError::invalid_combination(
            ["ConditionalOperator"],
            "ConditionalOperator requires a legacy condition map \
             (KeyConditions, QueryFilter, or ScanFilter)",
        ));
    }
    Ok(())
}

/// Reject present-but-blank expression strings.
fn validate_expressions_not_blank(desc: &ReadRequestDescriptor) -> Result<(), ValidationError> {
    let expressions = [
        ("ProjectionExpression", &desc.projection_expression),
        ("KeyConditionExpression", &desc.key_condition_expression),
        ("FilterExpression", &desc.filter_expression),
    ];
    for (field, expr) in expressions {
        if expr.as_deref().is_some_and(|e| e.trim().is_empty()) {
            return Err(ValidationError::missing_field(
                field,
                format!("{field} must not be empty"),
            ));
        }
    }
    Ok(())
}

/// `Limit` must be a positive integer.
fn validate_limit(desc: &ReadRequestDescriptor) -> Result<(), ValidationError> {
    if let Some(limit) = desc.limit {
        if limit < 1 {
            return Err(ValidationError::out_of_range(
                "Limit",
                format!("Limit must be greater than 0, got {limit}"),
            ));
        }
    }
    Ok(())
}

/// Reject duplicate attribute names in the legacy projection list.
fn validate_attributes_to_get(desc: &ReadRequestDescriptor) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for attr in &desc.attributes_to_get {
        if !seen.insert(attr.as_str()) {
            return Err(ValidationError::invalid_combination(
                ["AttributesToGet"],
                format!("Duplicate value in AttributesToGet: {attr}"),
            ));
        }
    }
    Ok(())
}

/// Validate the `Select` parameter against the projection style and compute
/// the effective Select semantics.
///
/// When `Select` is absent the default is `ALL_ATTRIBUTES` for table access
/// and `ALL_PROJECTED_ATTRIBUTES` for index access, unless a projection is
/// present, in which case it is `SPECIFIC_ATTRIBUTES`. GET has no Select.
fn resolve_select(desc: &ReadRequestDescriptor) -> Result<Option<Select>, ValidationError> {
    if desc.operation == OperationKind::Get {
        return Ok(None);
    }
    let has_legacy = !desc.attributes_to_get.is_empty();
    let has_expr = desc.projection_expression.is_some();
    let has_projection = has_legacy || has_expr;

    if let Some(sel) = &desc.select {
        if has_expr && *sel != Select::SpecificAttributes {
            return Err(ValidationError::invalid_combination(
                ["Select", "ProjectionExpression"],
                format!(
                    "Select must be SPECIFIC_ATTRIBUTES (or omitted) when \
                     ProjectionExpression is set, got {sel}"
                ),
            ));
        }
        match sel {
            Select::SpecificAttributes => {
                if !has_projection {
                    return Err(ValidationError::invalid_combination(
                        ["Select"],
                        "SPECIFIC_ATTRIBUTES requires either AttributesToGet or \
                         ProjectionExpression",
                    ));
                }
            }
            Select::AllProjectedAttributes => {
                if desc.index_name.is_none() {
                    return Err(ValidationError::invalid_combination(
                        ["Select", "IndexName"],
                        "ALL_PROJECTED_ATTRIBUTES is only supported when reading a \
                         secondary index",
                    ));
                }
                if has_legacy {
                    return Err(ValidationError::invalid_combination(
                        ["Select", "AttributesToGet"],
                        format!("Cannot specify AttributesToGet when Select is {sel}"),
                    ));
                }
            }
            Select::AllAttributes | Select::Count => {
                if has_legacy {
                    return Err(ValidationError::invalid_combination(
                        ["Select", "AttributesToGet"],
                        format!("Cannot specify AttributesToGet when Select is {sel}"),
                    ));
                }
            }
        }
        return Ok(Some(sel.clone()));
    }

    Ok(Some(if has_projection {
        Select::SpecificAttributes
    } else if desc.index_name.is_some() {
        Select::AllProjectedAttributes
    } else {
        Select::AllAttributes
    }))
}

/// Resolve placeholder references against the attribute name/value maps.
///
/// Missing `#name`/`:value` references and unused value entries are all
/// collected into one aggregated error (rules 6 and 7). Unused name entries
/// are reported as warnings only.
fn resolve_placeholders(desc: &ReadRequestDescriptor) -> Result<Vec<String>, ValidationError> {
    let refs = PlaceholderRefs::from_expressions(
        [
            &desc.projection_expression,
            &desc.key_condition_expression,
            &desc.filter_expression,
        ]
        .into_iter()
        .flatten()
        .map(String::as_str),
    );

    let missing_names: Vec<&String> = refs
        .names
        .iter()
        .filter(|t| !desc.expression_attribute_names.contains_key(t.as_str()))
        .collect();
    let missing_values: Vec<&String> = refs
        .values
        .iter()
        .filter(|t| !desc.expression_attribute_values.contains_key(t.as_str()))
        .collect();
    let mut unused_values: Vec<&String> = desc
        .expression_attribute_values
        .keys()
        .filter(|k| !refs.values.contains(k.as_str()))
        .collect();
    unused_values.sort();

    if !missing_names.is_empty() || !missing_values.is_empty() || !unused_values.is_empty() {
        let mut parts = Vec::new();
        if !missing_names.is_empty() || !missing_values.is_empty() {
            let unresolved: Vec<&str> = missing_names
                .iter()
                .chain(missing_values.iter())
                .map(|s| s.as_str())
                .collect();
            parts.push(format!(
                "unresolved placeholder references: {{{}}}",
                unresolved.join(", ")
            ));
        }
        if !unused_values.is_empty() {
            let unused: Vec<&str> = unused_values.iter().map(|s| s.as_str()).collect();
            parts.push(format!(
                "unused entries in ExpressionAttributeValues: {{{}}}",
                unused.join(", ")
            ));
        }
        let tokens: Vec<String> = missing_names
            .into_iter()
            .chain(missing_values)
            .chain(unused_values)
            .cloned()
            .collect();
        return Err(ValidationError::unresolved_placeholders(
            tokens,
            parts.join("; "),
        ));
    }

    let mut unused_names: Vec<&String> = desc
        .expression_attribute_names
        .keys()
        .filter(|k| !refs.names.contains(k.as_str()))
        .collect();
    unused_names.sort();
    let warnings: Vec<String> = unused_names
        .into_iter()
        .map(|name| {
            warn!(
                placeholder = %name,
                "ExpressionAttributeNames entry is unused by any expression"
            );
            format!("ExpressionAttributeNames entry {name} is unused by any expression")
        })
        .collect();
    Ok(warnings)
}

/// Validates and canonicalizes raw read-request descriptors.
///
/// Construct once and share freely; normalization holds no mutable state.
#[derive(Debug, Default)]
pub struct RequestNormalizer {
    config: NormalizerConfig,
    metadata: Option<Arc<dyn TableMetadata>>,
}

impl RequestNormalizer {
    /// Create a normalizer with default configuration and no table metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer with the given configuration.
    #[must_use]
    pub fn with_config(config: NormalizerConfig) -> Self {
        Self {
            config,
            metadata: None,
        }
    }

    /// Attach a table-metadata collaborator, enabling the
    /// consistent-read-on-GSI check.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Arc<dyn TableMetadata>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Validate `desc` and produce its canonical form.
    ///
    /// Structural conflicts fail fast with the first violation found;
    /// placeholder resolution aggregates every offending token into one
    /// error. The descriptor itself is never mutated.
    pub fn normalize(
        &self,
        desc: &ReadRequestDescriptor,
    ) -> Result<NormalizedRequest, ValidationError> {
        debug!(
            operation = %desc.operation,
            table = %desc.table_name,
            "normalizing read request"
        );

        validate_name("TableName", &desc.table_name)?;
        if let Some(index) = &desc.index_name {
            validate_name("IndexName", index)?;
        }
        validate_fields_for_operation(desc)?;
        validate_exclusive_styles(desc)?;
        validate_conditional_operator(desc)?;
        validate_expressions_not_blank(desc)?;
        validate_attributes_to_get(desc)?;
        let effective_select = resolve_select(desc)?;
        validate_limit(desc)?;
        self.validate_parallel_scan(desc)?;
        self.validate_index_consistency(desc)?;
        let warnings = resolve_placeholders(desc)?;

        let projection = if desc.attributes_to_get.is_empty() {
            desc.projection_expression.clone().map(Projection::Expression)
        } else {
            Some(Projection::Attributes(desc.attributes_to_get.clone()))
        };
        let key_condition = if desc.key_conditions.is_empty() {
            desc.key_condition_expression
                .clone()
                .map(KeyCondition::Expression)
        } else {
            Some(KeyCondition::Conditions(desc.key_conditions.clone()))
        };
        let filter = if !desc.query_filter.is_empty() {
            Some(Filter::Conditions(desc.query_filter.clone()))
        } else if !desc.scan_filter.is_empty() {
            Some(Filter::Conditions(desc.scan_filter.clone()))
        } else {
            desc.filter_expression.clone().map(Filter::Expression)
        };

        Ok(NormalizedRequest {
            operation: desc.operation,
            table_name: desc.table_name.clone(),
            index_name: desc.index_name.clone(),
            key: desc.key.clone(),
            consistent_read: desc.consistent_read,
            projection,
            key_condition,
            filter,
            conditional_operator: desc.conditional_operator.clone(),
            expression_attribute_names: desc.expression_attribute_names.clone(),
            expression_attribute_values: desc.expression_attribute_values.clone(),
            exclusive_start_key: desc.exclusive_start_key.clone(),
            limit: desc.limit,
            scan_index_forward: desc.scan_index_forward,
            segment: desc.segment,
            total_segments: desc.total_segments,
            return_consumed_capacity: desc.return_consumed_capacity.clone(),
            effective_select,
            is_parallel_scan: desc.total_segments.is_some_and(|t| t > 1),
            warnings,
        })
    }

    /// `Segment`/`TotalSegments` must be co-present with
    /// `0 <= Segment < TotalSegments <= max_total_segments`.
    fn validate_parallel_scan(&self, desc: &ReadRequestDescriptor) -> Result<(), ValidationError> {
        match (desc.segment, desc.total_segments) {
            (None, None) => Ok(()),
            (Some(_), None) => Err(ValidationError::invalid_combination(
                ["Segment", "TotalSegments"],
                "TotalSegments is required when Segment is present",
            )),
            (None, Some(_)) => Err(ValidationError::invalid_combination(
                ["Segment", "TotalSegments"],
                "Segment is required when TotalSegments is present",
            )),
            (Some(seg), Some(total)) => {
                if total < 1 || total > self.config.max_total_segments {
                    return Err(ValidationError::out_of_range(
                        "TotalSegments",
                        format!(
                            "TotalSegments must be between 1 and {}, got {total}",
                            self.config.max_total_segments
                        ),
                    ));
                }
                if seg < 0 || seg >= total {
                    return Err(ValidationError::out_of_range(
                        "Segment",
                        format!(
                            "Segment is zero-indexed and must be less than TotalSegments. \
                             Segment: {seg}, TotalSegments: {total}"
                        ),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Consistent reads are not supported on global secondary indexes.
    ///
    /// Skipped when no metadata collaborator is configured or the provider
    /// does not know the index (degraded-validation mode).
    fn validate_index_consistency(
        &self,
        desc: &ReadRequestDescriptor,
    ) -> Result<(), ValidationError> {
        if desc.consistent_read != Some(true) || self.config.skip_index_kind_check {
            return Ok(());
        }
        let Some(index) = &desc.index_name else {
            return Ok(());
        };
        let Some(metadata) = &self.metadata else {
            debug!(
                table = %desc.table_name,
                index = %index,
                "no table metadata configured, skipping index-kind check"
            );
            return Ok(());
        };
        if metadata.index_kind(&desc.table_name, index) == Some(IndexKind::GlobalSecondary) {
            return Err(ValidationError::unsupported_for_index_kind(
                index,
                format!("ConsistentRead is not supported on global secondary index {index}"),
            ));
        }
        Ok(())
    }
}
