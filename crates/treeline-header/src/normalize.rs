//! Label normalization
//!
//! Both functions are pure and deterministic.

/// Canonical form of a header label
///
/// Trims, removes `**` bold markers, drops every trailing `:` (so `::`
/// collapses along with a single colon), trims again and lower-cases.
/// Empty input yields an empty string.
///
/// `normalize(&normalize(x)) == normalize(x)` for every `x`.
#[must_use]
pub fn normalize(text: &str) -> String {
    let unbolded = text.trim().replace("**", "");
    unbolded
        .trim_end_matches(|c: char| c == ':' || c.is_whitespace())
        .trim()
        .to_lowercase()
}

/// Map key for a category node under a nested header
///
/// `"Favorite Color::"` → `"favoriteColor"`, `"**Avatar:**"` → `"avatar"`.
/// Strips bold markers and trailing colons, lower-cases, camel-cases every
/// word after the first, then drops anything that is not alphanumeric.
/// Returns an empty string when nothing usable is left.
#[must_use]
pub fn category_name(text: &str) -> String {
    let unbolded = text.trim().replace("**", "");
    let label = unbolded
        .trim_end_matches(|c: char| c == ':' || c.is_whitespace())
        .to_lowercase();

    let mut name = String::with_capacity(label.len());
    for (i, word) in label.split_whitespace().enumerate() {
        let mut chars = word.chars();
        if i > 0 {
            if let Some(first) = chars.next() {
                name.extend(first.to_uppercase());
            }
        }
        name.extend(chars);
    }
    name.retain(char::is_alphanumeric);
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalize_strips_all_surface_syntaxes() {
        for text in ["My Info", "My Info:", "My Info::", "**My Info:**", "**My Info**:", "  my info :: "] {
            assert_eq!(normalize(text), "my info", "input: {text:?}");
        }
    }

    #[test]
    fn normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("::"), "");
        assert_eq!(normalize("****"), "");
    }

    #[test]
    fn normalize_keeps_inner_colons() {
        assert_eq!(normalize("url: https://x"), "url: https://x");
        assert_eq!(normalize("a::b::"), "a::b");
    }

    #[test]
    fn category_name_camel_cases() {
        assert_eq!(category_name("Avatar::"), "avatar");
        assert_eq!(category_name("**Role:**"), "role");
        assert_eq!(category_name("Favorite Color:"), "favoriteColor");
        assert_eq!(category_name("e-mail  address"), "emailAddress");
    }

    #[test]
    fn category_name_can_be_empty() {
        assert_eq!(category_name("::"), "");
        assert_eq!(category_name("--- !!"), "");
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(text in ".{0,40}") {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_normalize_ignores_header_syntax(key in "[A-Za-z][A-Za-z0-9 ]{0,20}") {
            let expected = normalize(&key);
            prop_assert_eq!(normalize(&format!("{key}::")), expected.clone());
            prop_assert_eq!(normalize(&format!("**{key}:**")), expected.clone());
            prop_assert_eq!(normalize(&format!("**{key}**:")), expected);
        }
    }
}
