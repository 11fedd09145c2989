//! Support for manipulating colon-separated account names.

pub const SEPARATOR: char = ':';

/// Returns the parent of an account path: everything before the last
/// colon, or the empty string when there is no parent. Trailing colons
/// are trimmed first.
pub fn base(path: &str) -> &str {
    let path = path.trim_end_matches(SEPARATOR);
    match path.rfind(SEPARATOR) {
        Some(i) => &path[..i],
        None => "",
    }
}

/// Whether `path` is `prefix` itself or lives under `prefix:`.
pub fn has_base(path: &str, prefix: &str) -> bool {
    path == prefix
        || (path.len() > prefix.len()
            && path.starts_with(prefix)
            && path[prefix.len()..].starts_with(SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_of_nested_path() {
        assert_eq!(base("Expenses:Food:Takeout"), "Expenses:Food");
        assert_eq!(base("Expenses:Food"), "Expenses");
    }

    #[test]
    fn base_of_top_level_path() {
        assert_eq!(base("Expenses"), "");
        assert_eq!(base(""), "");
    }

    #[test]
    fn base_trims_trailing_separators() {
        assert_eq!(base("Expenses:Food:"), "Expenses");
        assert_eq!(base("Expenses::"), "");
    }

    #[test]
    fn has_base_matches_prefix_components() {
        assert!(has_base("Expenses:Food", "Expenses"));
        assert!(has_base("Expenses:Food", "Expenses:Food"));
        assert!(!has_base("Expenses:Foodstuff", "Expenses:Food"));
        assert!(!has_base("Assets:Cash", "Expenses"));
    }
}
