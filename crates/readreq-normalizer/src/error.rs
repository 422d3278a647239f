//! Validation error type for request normalization.
//!
//! Every failure is returned as a value; nothing here is used for control
//! flow beyond the normalizer's own `Result`. The `kind` is stable and
//! machine-matchable, `fields` names the offending wire parameters, and
//! `message` states the violated rule precisely enough to fix the request
//! without guessing.

use std::fmt;

/// Stable classification of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ValidationErrorKind {
    /// A field the operation requires is absent or empty.
    MissingRequiredField,
    /// A field is not legal for the requested operation kind.
    FieldNotAllowedForOperation,
    /// Two fields of the same family (legacy and expression style) are both set.
    MutuallyExclusiveFieldsSet,
    /// Fields are individually legal but conflict in combination.
    InvalidFieldCombination,
    /// A numeric field is outside its allowed range.
    OutOfRangeValue,
    /// A name fails its length or character-set constraint.
    PatternMismatch,
    /// An expression references a placeholder with no map entry, or a value
    /// map entry is unused by any expression.
    UnresolvedPlaceholder,
    /// The request is not supported for the kind of index it targets.
    UnsupportedForIndexKind,
}

impl ValidationErrorKind {
    /// Returns the stable string name of this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingRequiredField => "MissingRequiredField",
            Self::FieldNotAllowedForOperation => "FieldNotAllowedForOperation",
            Self::MutuallyExclusiveFieldsSet => "MutuallyExclusiveFieldsSet",
            Self::InvalidFieldCombination => "InvalidFieldCombination",
            Self::OutOfRangeValue => "OutOfRangeValue",
            Self::PatternMismatch => "PatternMismatch",
            Self::UnresolvedPlaceholder => "UnresolvedPlaceholder",
            Self::UnsupportedForIndexKind => "UnsupportedForIndexKind",
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validation failure produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ValidationError {
    /// The classification of this failure.
    pub kind: ValidationErrorKind,
    /// The wire names of the offending fields.
    pub fields: Vec<String>,
    /// A human-readable statement of the violated rule.
    pub message: String,
}

impl ValidationError {
    /// Create an error from a kind, offending fields, and message.
    #[must_use]
    pub fn new(
        kind: ValidationErrorKind,
        fields: impl IntoIterator<Item = impl Into<String>>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            fields: fields.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }

    // -- Convenience constructors --

    /// A required field is absent or empty.
    #[must_use]
    pub fn missing_field(field: &str, message: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::MissingRequiredField, [field], message)
    }

    /// A field is not legal for the requested operation.
    #[must_use]
    pub fn not_allowed(field: &str, operation: impl fmt::Display) -> Self {
        Self::new(
            ValidationErrorKind::FieldNotAllowedForOperation,
            [field],
            format!("{field} is not allowed for {operation} requests"),
        )
    }

    /// Both styles of one field family are set.
    #[must_use]
    pub fn mutually_exclusive(legacy: &str, expression: &str) -> Self {
        Self::new(
            ValidationErrorKind::MutuallyExclusiveFieldsSet,
            [legacy, expression],
            format!("Cannot specify both {legacy} and {expression}"),
        )
    }

    /// Fields conflict in combination.
    #[must_use]
    pub fn invalid_combination(
        fields: impl IntoIterator<Item = impl Into<String>>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ValidationErrorKind::InvalidFieldCombination, fields, message)
    }

    /// A numeric field is out of range.
    #[must_use]
    pub fn out_of_range(field: &str, message: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::OutOfRangeValue, [field], message)
    }

    /// A name fails the length/character constraint.
    #[must_use]
    pub fn pattern_mismatch(field: &str, value: &str) -> Self {
        Self::new(
            ValidationErrorKind::PatternMismatch,
            [field],
            format!(
                "Value '{value}' at '{field}' failed to satisfy constraint: \
                 Member must satisfy regular expression pattern [a-zA-Z0-9_.-]+ \
                 with length between 3 and 255"
            ),
        )
    }

    /// One or more placeholder tokens could not be resolved, or value map
    /// entries are unused.
    #[must_use]
    pub fn unresolved_placeholders(
        tokens: impl IntoIterator<Item = impl Into<String>>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ValidationErrorKind::UnresolvedPlaceholder, tokens, message)
    }

    /// The request is unsupported for the targeted index kind.
    #[must_use]
    pub fn unsupported_for_index_kind(index: &str, message: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::UnsupportedForIndexKind, [index], message)
    }
}
