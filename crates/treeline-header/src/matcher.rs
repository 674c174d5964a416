//! Exact header matching
//!
//! [`HeaderMatcher`] compares normalized node text against normalized
//! patterns. Substring or containment checks are never used.

use crate::format::HeaderPattern;
use crate::normalize::normalize;
use treeline_tree::Node;

/// Finds header nodes by normalized-equality
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderMatcher;

impl HeaderMatcher {
    /// Create new matcher
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// First node (in the given order) whose normalized text equals any
    /// normalized pattern
    ///
    /// Patterns that normalize to an empty string never match.
    #[must_use]
    pub fn match_exact<'a, P: AsRef<str>>(&self, nodes: &'a [Node], patterns: &[P]) -> Option<&'a Node> {
        let wanted: Vec<String> = patterns
            .iter()
            .map(|p| normalize(p.as_ref()))
            .filter(|p| !p.is_empty())
            .collect();
        if wanted.is_empty() {
            return None;
        }

        nodes.iter().find(|node| {
            let text = normalize(&node.text);
            wanted.iter().any(|w| *w == text)
        })
    }

    /// First node matching any read-side variant of `pattern`'s key
    #[inline]
    #[must_use]
    pub fn match_key<'a>(&self, nodes: &'a [Node], pattern: &HeaderPattern) -> Option<&'a Node> {
        self.match_exact(nodes, pattern.variants())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use treeline_tree::NodeId;

    fn nodes(texts: &[&str]) -> Vec<Node> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Node::new(NodeId::new(format!("n{i}")), *t, i))
            .collect()
    }

    #[test]
    fn prose_mentioning_key_never_matches() {
        let children = nodes(&["Notes about My Info usage", "My Info::"]);
        let pattern = HeaderPattern::for_key("My Info");

        let found = HeaderMatcher::new().match_key(&children, &pattern).unwrap();
        assert_eq!(found.id, NodeId::from("n1"));
    }

    #[test]
    fn first_match_wins() {
        let children = nodes(&["other", "**Tags:**", "Tags::"]);
        let found = HeaderMatcher::new()
            .match_key(&children, &HeaderPattern::for_key("tags"))
            .unwrap();
        assert_eq!(found.text, "**Tags:**");
    }

    #[test]
    fn no_match_returns_none() {
        let children = nodes(&["Tagsline::", "My Tags::"]);
        let found = HeaderMatcher::new().match_exact(&children, &["Tags"]);
        assert!(found.is_none());
    }

    #[test]
    fn empty_patterns_never_match_empty_text() {
        let children = nodes(&["", "::"]);
        assert!(HeaderMatcher::new().match_exact(&children, &["", "**"]).is_none());
    }

    proptest! {
        #[test]
        fn prop_key_inside_prose_is_not_a_match(
            key in "[A-Za-z]{1,10}",
            prefix in "[a-z]{1,8} ",
        ) {
            let prose = format!("{prefix}{key} usage");
            let children = nodes(&[prose.as_str()]);
            let found = HeaderMatcher::new().match_key(&children, &HeaderPattern::for_key(&key));
            prop_assert!(found.is_none());
        }
    }
}
