//! Normalizer configuration.

use std::env;

/// Maximum allowed value for `TotalSegments` in a parallel scan.
pub const MAX_TOTAL_SEGMENTS: i32 = 1_000_000;

/// Configuration for [`crate::RequestNormalizer`].
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    /// Upper bound for `TotalSegments` (default 1,000,000).
    pub max_total_segments: i32,
    /// Skip the consistent-read-on-GSI check even when table metadata is
    /// available (default: false).
    pub skip_index_kind_check: bool,
}

impl NormalizerConfig {
    /// Create configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            max_total_segments: env_i32("READREQ_MAX_TOTAL_SEGMENTS", MAX_TOTAL_SEGMENTS),
            skip_index_kind_check: env_bool("READREQ_SKIP_INDEX_KIND_CHECK", false),
        }
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            max_total_segments: MAX_TOTAL_SEGMENTS,
            skip_index_kind_check: false,
        }
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key).map_or(default, |v| {
        matches!(v.as_str(), "1" | "true" | "yes" | "TRUE" | "YES")
    })
}

fn env_i32(key: &str, default: i32) -> i32 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
