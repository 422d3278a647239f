//! Table metadata collaborator.
//!
//! Consistent reads are not supported on global secondary indexes, but
//! telling a GSI from an LSI requires table metadata the normalizer does not
//! own. The [`TableMetadata`] trait is the seam where a catalog, a cached
//! DescribeTable response, or a static map supplies that answer. When no
//! provider is configured, or the provider does not know the index, the
//! check is skipped rather than failing closed.

use std::collections::HashMap;
use std::fmt;

/// The kind of a secondary index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// Shares the partition key with the base table; supports consistent reads.
    LocalSecondary,
    /// Has its own partition key; eventually consistent reads only.
    GlobalSecondary,
}

impl IndexKind {
    /// Returns the string name of this index kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocalSecondary => "LOCAL_SECONDARY",
            Self::GlobalSecondary => "GLOBAL_SECONDARY",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supplies index-kind lookups for consistent-read validation.
pub trait TableMetadata: fmt::Debug + Send + Sync {
    /// Returns the kind of `index` on `table`, or `None` when unknown.
    fn index_kind(&self, table: &str, index: &str) -> Option<IndexKind>;
}

/// A map-backed [`TableMetadata`] implementation.
///
/// Useful for tests and for callers that already hold table descriptions.
#[derive(Debug, Clone, Default)]
pub struct StaticTableMetadata {
    indexes: HashMap<(String, String), IndexKind>,
}

impl StaticTableMetadata {
    /// Create an empty metadata map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the kind of `index` on `table`.
    pub fn insert(
        &mut self,
        table: impl Into<String>,
        index: impl Into<String>,
        kind: IndexKind,
    ) {
        self.indexes.insert((table.into(), index.into()), kind);
    }
}

impl TableMetadata for StaticTableMetadata {
    fn index_kind(&self, table: &str, index: &str) -> Option<IndexKind> {
        self.indexes
            .get(&(table.to_owned(), index.to_owned()))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_look_up_registered_index_kind() {
        let mut meta = StaticTableMetadata::new();
        meta.insert("Orders", "gsi-status", IndexKind::GlobalSecondary);
        meta.insert("Orders", "lsi-created", IndexKind::LocalSecondary);
        assert_eq!(
            meta.index_kind("Orders", "gsi-status"),
            Some(IndexKind::GlobalSecondary)
        );
        assert_eq!(
            meta.index_kind("Orders", "lsi-created"),
            Some(IndexKind::LocalSecondary)
        );
        assert_eq!(meta.index_kind("Orders", "missing"), None);
        assert_eq!(meta.index_kind("Other", "gsi-status"), None);
    }

    #[test]
    fn test_should_display_index_kind() {
        assert_eq!(IndexKind::GlobalSecondary.to_string(), "GLOBAL_SECONDARY");
        assert_eq!(IndexKind::LocalSecondary.to_string(), "LOCAL_SECONDARY");
    }
}
