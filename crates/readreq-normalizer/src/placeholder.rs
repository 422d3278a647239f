//! Lexical placeholder extraction from expression strings.
//!
//! The normalizer does not parse expressions into an AST; it only needs to
//! know which `#name` and `:value` tokens an expression references. A single
//! linear scan collects tokens matching `#[A-Za-z0-9_]+` and
//! `:[A-Za-z0-9_]+`; everything else in the expression is skipped. Sets are
//! ordered so error reports list tokens deterministically.

use std::collections::BTreeSet;

/// The placeholder tokens referenced by one or more expression strings.
///
/// Tokens are stored with their sigil (`#n`, `:v`), matching the keys of the
/// `ExpressionAttributeNames` / `ExpressionAttributeValues` maps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderRefs {
    /// Referenced `#name` tokens.
    pub names: BTreeSet<String>,
    /// Referenced `:value` tokens.
    pub values: BTreeSet<String>,
}

impl PlaceholderRefs {
    /// Collect placeholder tokens from every expression in `exprs`.
    #[must_use]
    pub fn from_expressions<'a>(exprs: impl IntoIterator<Item = &'a str>) -> Self {
        let mut refs = Self::default();
        for expr in exprs {
            refs.scan(expr);
        }
        refs
    }

    /// Scan one expression string, adding every token found.
    pub fn scan(&mut self, expr: &str) {
        let bytes = expr.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            let sigil = bytes[i];
            if sigil != b'#' && sigil != b':' {
                i += 1;
                continue;
            }
            let start = i;
            i += 1;
            let body_start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            // A bare sigil with no token body is not a placeholder.
            if i == body_start {
                continue;
            }
            let token = expr[start..i].to_owned();
            if sigil == b'#' {
                self.names.insert(token);
            } else {
                self.values.insert(token);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_extract_name_and_value_tokens() {
        let refs = PlaceholderRefs::from_expressions(["#status = :s AND #ts > :since"]);
        assert!(refs.names.contains("#status"));
        assert!(refs.names.contains("#ts"));
        assert!(refs.values.contains(":s"));
        assert!(refs.values.contains(":since"));
        assert_eq!(refs.names.len(), 2);
        assert_eq!(refs.values.len(), 2);
    }

    #[test]
    fn test_should_merge_tokens_across_expressions() {
        let refs = PlaceholderRefs::from_expressions(["pk = :p", "#n, sk", "#n > :p"]);
        assert_eq!(refs.names.len(), 1);
        assert_eq!(refs.values.len(), 1);
    }

    #[test]
    fn test_should_ignore_bare_sigils() {
        let refs = PlaceholderRefs::from_expressions(["a # b : c"]);
        assert!(refs.names.is_empty());
        assert!(refs.values.is_empty());
    }

    #[test]
    fn test_should_stop_token_at_non_word_character() {
        let refs = PlaceholderRefs::from_expressions(["begins_with(#pk.nested, :v)"]);
        assert!(refs.names.contains("#pk"));
        assert!(!refs.names.contains("#pk.nested"));
        assert!(refs.values.contains(":v"));
    }

    #[test]
    fn test_should_accept_underscores_and_digits_in_tokens() {
        let refs = PlaceholderRefs::from_expressions(["#attr_1 = :val_2"]);
        assert!(refs.names.contains("#attr_1"));
        assert!(refs.values.contains(":val_2"));
    }
}
