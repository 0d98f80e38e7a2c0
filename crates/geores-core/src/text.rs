// crates/geores-core/src/text.rs

//! Text normalization shared by the index and the resolvers.

/// Normalizes a string for accent-insensitive, case-insensitive matching.
///
/// ```rust
/// use geores_core::text::fold_key;
///
/// assert_eq!(fold_key("Zürich"), "zurich");
/// assert_eq!(fold_key("  São Paulo "), "sao paulo");
/// ```
pub fn fold_key(s: &str) -> String {
    deunicode::deunicode(s.trim()).to_lowercase()
}

/// Folds and splits on whitespace, the way names are analyzed for indexing.
pub fn tokenize(s: &str) -> Vec<String> {
    fold_key(s).split_whitespace().map(str::to_owned).collect()
}

/// Query-side sanitation applied before any index call: trim and lowercase.
///
/// Escaping of index syntax is left to the index implementation.
pub fn sanitize_query(s: &str) -> String {
    s.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_splits_on_whitespace_only() {
        assert_eq!(tokenize("St. Louis"), vec!["st.", "louis"]);
        assert_eq!(tokenize("Kansas   City"), vec!["kansas", "city"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn sanitize_trims_and_lowercases() {
        assert_eq!(sanitize_query("  Reston "), "reston");
        assert_eq!(sanitize_query(""), "");
    }
}
