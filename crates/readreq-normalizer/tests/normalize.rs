//! End-to-end normalization tests built from JSON wire payloads.

use std::sync::Arc;

use bytes::Bytes;
use readreq_model::types::Select;
use readreq_model::{
    AttributeValue, Filter, KeyCondition, NormalizedRequest, OperationKind, Projection,
    ReadRequestDescriptor,
};
use readreq_normalizer::{
    IndexKind, NormalizerConfig, RequestNormalizer, StaticTableMetadata, ValidationErrorKind,
};

fn parse(json: &str) -> ReadRequestDescriptor {
    serde_json::from_str(json).expect("test payload must deserialize")
}

fn normalize(json: &str) -> Result<NormalizedRequest, readreq_normalizer::ValidationError> {
    RequestNormalizer::new().normalize(&parse(json))
}

#[test]
fn test_should_normalize_expression_query_from_wire_payload() {
    let req = normalize(
        r##"{
            "Operation": "QUERY",
            "TableName": "Orders",
            "KeyConditionExpression": "pk = :p AND begins_with(sk, :prefix)",
            "FilterExpression": "#st = :open",
            "ExpressionAttributeNames": {"#st": "Status"},
            "ExpressionAttributeValues": {
                ":p": {"S": "customer-123"},
                ":prefix": {"S": "ord#"},
                ":open": {"S": "OPEN"}
            },
            "Limit": 25,
            "ScanIndexForward": false
        }"##,
    )
    .unwrap();

    assert_eq!(req.operation, OperationKind::Query);
    assert_eq!(req.effective_select, Some(Select::AllAttributes));
    assert!(matches!(req.key_condition, Some(KeyCondition::Expression(_))));
    assert!(matches!(req.filter, Some(Filter::Expression(_))));
    assert_eq!(req.limit, Some(25));
    assert!(req.warnings.is_empty());
}

#[test]
fn test_should_normalize_legacy_query_with_query_filter() {
    let req = normalize(
        r#"{
            "Operation": "QUERY",
            "TableName": "Orders",
            "KeyConditions": {
                "pk": {
                    "ComparisonOperator": "EQ",
                    "AttributeValueList": [{"S": "customer-123"}]
                }
            },
            "QueryFilter": {
                "Total": {
                    "ComparisonOperator": "GT",
                    "AttributeValueList": [{"N": "100"}]
                }
            },
            "ConditionalOperator": "AND"
        }"#,
    )
    .unwrap();

    assert!(matches!(req.key_condition, Some(KeyCondition::Conditions(_))));
    assert!(matches!(req.filter, Some(Filter::Conditions(_))));
    assert_eq!(req.effective_select, Some(Select::AllAttributes));
}

#[test]
fn test_should_reject_mixed_filter_styles_on_scan() {
    // Scenario: a caller migrating to expressions leaves the old ScanFilter
    // behind.
    let err = normalize(
        r#"{
            "Operation": "SCAN",
            "TableName": "Orders",
            "ScanFilter": {
                "Status": {
                    "ComparisonOperator": "EQ",
                    "AttributeValueList": [{"S": "OPEN"}]
                }
            },
            "FilterExpression": "Status = :s",
            "ExpressionAttributeValues": {":s": {"S": "OPEN"}}
        }"#,
    )
    .unwrap_err();

    assert_eq!(err.kind, ValidationErrorKind::MutuallyExclusiveFieldsSet);
    assert_eq!(err.fields, vec!["ScanFilter", "FilterExpression"]);
}

#[test]
fn test_should_report_missing_value_placeholder_with_token_name() {
    let err = normalize(
        r#"{
            "Operation": "QUERY",
            "TableName": "Orders",
            "KeyConditionExpression": "pk = :p"
        }"#,
    )
    .unwrap_err();

    assert_eq!(err.kind, ValidationErrorKind::UnresolvedPlaceholder);
    assert_eq!(err.fields, vec![":p"]);
    assert!(err.message.contains(":p"));
}

#[test]
fn test_should_reject_segment_without_total_segments() {
    let err = normalize(
        r#"{
            "Operation": "SCAN",
            "TableName": "Orders",
            "Segment": 3
        }"#,
    )
    .unwrap_err();

    assert_eq!(err.kind, ValidationErrorKind::InvalidFieldCombination);
    assert_eq!(err.fields, vec!["Segment", "TotalSegments"]);
}

#[test]
fn test_should_normalize_parallel_scan_segment() {
    let req = normalize(
        r#"{
            "Operation": "SCAN",
            "TableName": "Orders",
            "Segment": 3,
            "TotalSegments": 8,
            "ProjectionExpression": "pk, Total"
        }"#,
    )
    .unwrap();

    assert!(req.is_parallel_scan);
    assert_eq!(req.effective_select, Some(Select::SpecificAttributes));
    assert_eq!(req.projection, Some(Projection::Expression("pk, Total".to_owned())));
}

#[test]
fn test_should_normalize_get_with_binary_key() {
    let mut desc = ReadRequestDescriptor::new(OperationKind::Get, "Sessions");
    desc.key.insert(
        "token".to_owned(),
        AttributeValue::B(Bytes::from_static(b"\x00\x01\x02")),
    );
    desc.consistent_read = Some(true);
    let req = RequestNormalizer::new().normalize(&desc).unwrap();
    assert_eq!(req.effective_select, None);
    assert_eq!(req.consistent_read, Some(true));
}

#[test]
fn test_should_be_idempotent_for_expression_query() {
    let desc = parse(
        r##"{
            "Operation": "QUERY",
            "TableName": "Orders",
            "IndexName": "gsi-status",
            "KeyConditionExpression": "#st = :s",
            "ExpressionAttributeNames": {"#st": "Status"},
            "ExpressionAttributeValues": {":s": {"S": "OPEN"}},
            "Limit": 10
        }"##,
    );
    let normalizer = RequestNormalizer::new();
    let once = normalizer.normalize(&desc).unwrap();
    let twice = normalizer.normalize(&once.to_descriptor()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_should_be_idempotent_for_legacy_scan() {
    let desc = parse(
        r#"{
            "Operation": "SCAN",
            "TableName": "Orders",
            "ScanFilter": {
                "Status": {
                    "ComparisonOperator": "NE",
                    "AttributeValueList": [{"S": "CANCELLED"}]
                }
            },
            "ConditionalOperator": "AND",
            "Segment": 0,
            "TotalSegments": 4
        }"#,
    );
    let normalizer = RequestNormalizer::new();
    let once = normalizer.normalize(&desc).unwrap();
    let twice = normalizer.normalize(&once.to_descriptor()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_should_roundtrip_descriptor_fields_through_normalization() {
    let desc = parse(
        r#"{
            "Operation": "QUERY",
            "TableName": "Orders",
            "AttributesToGet": ["pk", "sk", "Total"],
            "KeyConditions": {
                "pk": {
                    "ComparisonOperator": "EQ",
                    "AttributeValueList": [{"S": "customer-123"}]
                }
            },
            "ExclusiveStartKey": {"pk": {"S": "customer-123"}, "sk": {"S": "ord#17"}},
            "Limit": 50,
            "ReturnConsumedCapacity": "TOTAL"
        }"#,
    );
    let req = RequestNormalizer::new().normalize(&desc).unwrap();
    let back = req.to_descriptor();

    assert_eq!(back.attributes_to_get, desc.attributes_to_get);
    assert_eq!(back.key_conditions, desc.key_conditions);
    assert_eq!(back.exclusive_start_key, desc.exclusive_start_key);
    assert_eq!(back.limit, desc.limit);
    assert_eq!(back.return_consumed_capacity, desc.return_consumed_capacity);
    // The implicit Select becomes explicit on the way back.
    assert_eq!(back.select, Some(Select::SpecificAttributes));
}

#[test]
fn test_should_serialize_normalized_request_for_transport() {
    let req = normalize(
        r#"{
            "Operation": "QUERY",
            "TableName": "Orders",
            "KeyConditionExpression": "pk = :p",
            "ExpressionAttributeValues": {":p": {"S": "customer-123"}}
        }"#,
    )
    .unwrap();
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains(r#""Operation":"QUERY""#));
    assert!(json.contains(r#""EffectiveSelect":"ALL_ATTRIBUTES""#));
    assert!(!json.contains("Warnings"));
}

#[test]
fn test_should_enforce_index_kind_with_metadata() {
    let mut meta = StaticTableMetadata::new();
    meta.insert("Orders", "gsi-status", IndexKind::GlobalSecondary);
    meta.insert("Orders", "lsi-created", IndexKind::LocalSecondary);
    let normalizer = RequestNormalizer::new().with_metadata(Arc::new(meta));

    let mut desc = parse(
        r##"{
            "Operation": "QUERY",
            "TableName": "Orders",
            "IndexName": "gsi-status",
            "ConsistentRead": true,
            "KeyConditionExpression": "#st = :s",
            "ExpressionAttributeNames": {"#st": "Status"},
            "ExpressionAttributeValues": {":s": {"S": "OPEN"}}
        }"##,
    );
    let err = normalizer.normalize(&desc).unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::UnsupportedForIndexKind);

    desc.index_name = Some("lsi-created".to_owned());
    desc.key_condition_expression = Some("pk = :s".to_owned());
    desc.expression_attribute_names.clear();
    assert!(normalizer.normalize(&desc).is_ok());
}

#[test]
fn test_should_honor_configured_segment_limit() {
    let config = NormalizerConfig {
        max_total_segments: 16,
        ..NormalizerConfig::default()
    };
    let normalizer = RequestNormalizer::with_config(config);

    let mut desc = ReadRequestDescriptor::new(OperationKind::Scan, "Orders");
    desc.segment = Some(0);
    desc.total_segments = Some(16);
    assert!(normalizer.normalize(&desc).is_ok());

    desc.total_segments = Some(17);
    let err = normalizer.normalize(&desc).unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::OutOfRangeValue);
    assert_eq!(err.fields, vec!["TotalSegments"]);
}

#[test]
fn test_should_surface_unused_name_entries_as_warnings_only() {
    let req = normalize(
        r##"{
            "Operation": "SCAN",
            "TableName": "Orders",
            "FilterExpression": "#st = :s",
            "ExpressionAttributeNames": {"#st": "Status", "#unused": "Legacy"},
            "ExpressionAttributeValues": {":s": {"S": "OPEN"}}
        }"##,
    )
    .unwrap();
    assert_eq!(req.warnings.len(), 1);
    assert!(req.warnings[0].contains("#unused"));
}
