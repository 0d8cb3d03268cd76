//! Naming rules for labels, tables, and columns.
//!
//! A type's label is its snake-cased name; its table is the plural form of
//! the label. Column and join-table names are derived from labels and edge
//! names, so the rules here decide most of the generated storage layout.

use heck::ToSnakeCase;

/// Snake-case an identifier.
pub fn snake(name: &str) -> String {
    name.to_snake_case()
}

/// Pluralize the last word of a snake-cased identifier.
pub fn plural(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('y') {
        if !stem.is_empty() && !ends_with_vowel(stem) {
            return format!("{stem}ies");
        }
    }
    if word.ends_with('s')
        || word.ends_with("sh")
        || word.ends_with("ch")
        || word.ends_with('x')
        || word.ends_with('z')
    {
        return format!("{word}es");
    }
    format!("{word}s")
}

/// Singularize the last word of a snake-cased identifier. Inverse of
/// [`plural`] for the suffix rules it applies; words without a plural
/// suffix are returned unchanged.
pub fn singular(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{stem}y");
        }
    }
    if let Some(stem) = word.strip_suffix("es") {
        if stem.ends_with('s') || stem.ends_with("sh") || stem.ends_with("ch") || stem.ends_with('x') || stem.ends_with('z') {
            return stem.to_string();
        }
    }
    if let Some(stem) = word.strip_suffix('s') {
        if !stem.is_empty() && !stem.ends_with('s') {
            return stem.to_string();
        }
    }
    word.to_string()
}

fn ends_with_vowel(word: &str) -> bool {
    matches!(
        word.chars().last(),
        Some('a' | 'e' | 'i' | 'o' | 'u')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake() {
        assert_eq!(snake("User"), "user");
        assert_eq!(snake("GroupInfo"), "group_info");
        assert_eq!(snake("HTTPRequest"), "http_request");
        assert_eq!(snake("user_id"), "user_id");
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural("user"), "users");
        assert_eq!(plural("category"), "categories");
        assert_eq!(plural("status"), "statuses");
        assert_eq!(plural("box"), "boxes");
        assert_eq!(plural("dish"), "dishes");
        assert_eq!(plural("day"), "days");
        assert_eq!(plural("group_info"), "group_infos");
    }

    #[test]
    fn test_singular() {
        assert_eq!(singular("users"), "user");
        assert_eq!(singular("friends"), "friend");
        assert_eq!(singular("categories"), "category");
        assert_eq!(singular("statuses"), "status");
        assert_eq!(singular("boxes"), "box");
        assert_eq!(singular("parent"), "parent");
    }

    #[test]
    fn test_plural_singular_inverse() {
        for word in ["user", "category", "status", "box", "follower"] {
            assert_eq!(singular(&plural(word)), word);
        }
    }
}
