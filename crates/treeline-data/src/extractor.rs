//! Data extraction
//!
//! [`DataExtractor`] reads single-level and two-level key/value data from a
//! container node. It only reads; absent data is `None`, never an error.

use crate::error::DataResult;
use crate::value::{FieldValue, NestedValues};
use std::sync::Arc;
use treeline_header::{category_name, HeaderFormat, HeaderMatcher, HeaderPattern};
use treeline_tree::{Node, NodeId, TreeStore};

/// Reads header → value data
#[derive(Clone)]
pub struct DataExtractor {
    store: Arc<dyn TreeStore>,
    matcher: HeaderMatcher,
}

impl DataExtractor {
    /// Create extractor over a store
    #[inline]
    #[must_use]
    pub fn new(store: Arc<dyn TreeStore>) -> Self {
        Self {
            store,
            matcher: HeaderMatcher::new(),
        }
    }

    /// Header node for `key` among `container`'s direct children
    ///
    /// Tries all five surface variants of `key` with exact matching.
    ///
    /// # Errors
    /// Store errors from reading the container's children
    pub async fn find_header(&self, container: &NodeId, key: &str) -> DataResult<Option<Node>> {
        let children = self.store.get_children(container).await?;
        let pattern = HeaderPattern::for_key(key);
        Ok(self.matcher.match_key(&children, &pattern).cloned())
    }

    /// Value(s) stored under `key`
    ///
    /// `None` if the header is missing or has no value children; a string
    /// for one child; an ordered list for more.
    ///
    /// # Errors
    /// Store errors from either read
    pub async fn find_value(&self, container: &NodeId, key: &str) -> DataResult<Option<FieldValue>> {
        match self.find_header(container, key).await? {
            Some(header) => self.values_of(&header.id).await,
            None => {
                tracing::trace!(%container, key, "header not found");
                Ok(None)
            }
        }
    }

    /// Category → value map stored under `parent_key`
    ///
    /// - `None`: the header does not exist
    /// - empty map: the header exists with no categories
    ///
    /// Category keys come from [`category_name`]; categories whose name is
    /// empty or that hold no value children are left out.
    ///
    /// # Errors
    /// Store errors from any read
    pub async fn find_nested_values(
        &self,
        container: &NodeId,
        parent_key: &str,
    ) -> DataResult<Option<NestedValues>> {
        let Some(header) = self.find_header(container, parent_key).await? else {
            return Ok(None);
        };

        let mut categories = self.store.get_children(&header.id).await?;
        categories.sort_by_key(|c| c.order);

        let mut values = NestedValues::new();
        for category in categories {
            let name = category_name(&category.text);
            if name.is_empty() {
                continue;
            }
            if let Some(value) = self.values_of(&category.id).await? {
                values.insert(name, value);
            }
        }
        Ok(Some(values))
    }

    /// Every header-shaped child of `container` with its values
    ///
    /// A child counts as a header when it is written in one of the
    /// [`HeaderFormat`] syntaxes. Keys are the labels as written; headers
    /// without values and repeated labels after the first are skipped.
    ///
    /// # Errors
    /// Store errors from any read
    pub async fn read_all(&self, container: &NodeId) -> DataResult<NestedValues> {
        let mut children = self.store.get_children(container).await?;
        children.sort_by_key(|c| c.order);

        let mut values = NestedValues::new();
        for child in children {
            let Some(label) = HeaderFormat::detect(&child.text).and_then(|f| f.label(&child.text)) else {
                continue;
            };
            if values.contains_key(label) {
                continue;
            }
            if let Some(value) = self.values_of(&child.id).await? {
                values.insert(label.to_string(), value);
            }
        }
        Ok(values)
    }

    async fn values_of(&self, header: &NodeId) -> DataResult<Option<FieldValue>> {
        let mut children = self.store.get_children(header).await?;
        children.sort_by_key(|c| c.order);
        Ok(FieldValue::from_texts(children.into_iter().map(|c| c.text).collect()))
    }
}

impl std::fmt::Debug for DataExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataExtractor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treeline_test_utils::seed_header;
    use treeline_tree::MemoryStore;

    async fn fixture() -> (Arc<MemoryStore>, DataExtractor) {
        let store = Arc::new(MemoryStore::new());
        let extractor = DataExtractor::new(store.clone());
        (store, extractor)
    }

    #[tokio::test]
    async fn missing_header_is_none() {
        let (store, extractor) = fixture().await;
        let page = store.create_root("Page").await.unwrap();

        assert_eq!(extractor.find_value(&page, "Location").await.unwrap(), None);
        assert_eq!(extractor.find_nested_values(&page, "My Info").await.unwrap(), None);
    }

    #[tokio::test]
    async fn header_without_values_is_none() {
        let (store, extractor) = fixture().await;
        let (page, _) = seed_header(store.as_ref(), "Page", "Location::", &[]).await;

        assert_eq!(extractor.find_value(&page, "Location").await.unwrap(), None);
    }

    #[tokio::test]
    async fn single_and_list_values() {
        let (store, extractor) = fixture().await;
        let (page, _) = seed_header(store.as_ref(), "Page", "**Location:**", &["Oakland"]).await;
        seed_header(store.as_ref(), "Page", "Tags::", &["a", "b", "c"]).await;

        assert_eq!(
            extractor.find_value(&page, "location").await.unwrap(),
            Some(FieldValue::from("Oakland"))
        );
        assert_eq!(
            extractor.find_value(&page, "Tags").await.unwrap(),
            Some(FieldValue::from(["a", "b", "c"]))
        );
    }

    #[tokio::test]
    async fn prose_is_not_a_header() {
        let (store, extractor) = fixture().await;
        let (page, _) = seed_header(store.as_ref(), "Page", "Notes about My Info usage", &["noise"]).await;
        assert_eq!(extractor.find_value(&page, "My Info").await.unwrap(), None);

        seed_header(store.as_ref(), "Page", "My Info::", &["real"]).await;
        assert_eq!(
            extractor.find_value(&page, "My Info").await.unwrap(),
            Some(FieldValue::from("real"))
        );
    }

    #[tokio::test]
    async fn nested_header_without_categories_is_empty_map() {
        let (store, extractor) = fixture().await;
        let (page, _) = seed_header(store.as_ref(), "Page", "My Info::", &[]).await;

        let nested = extractor.find_nested_values(&page, "My Info").await.unwrap();
        assert_eq!(nested, Some(NestedValues::new()));
    }

    #[tokio::test]
    async fn nested_skips_empty_and_unnamed_categories() {
        let (store, extractor) = fixture().await;
        let (page, header) = seed_header(store.as_ref(), "Page", "My Info::", &[]).await;
        let avatar = store.create_child(&header, "Avatar::", 0).await.unwrap();
        store.create_child(&avatar, "url", 0).await.unwrap();
        store.create_child(&header, "Pronouns::", 1).await.unwrap();
        let odd = store.create_child(&header, "::", 2).await.unwrap();
        store.create_child(&odd, "lost", 0).await.unwrap();
        let color = store.create_child(&header, "**Favorite Color:**", 3).await.unwrap();
        store.create_child(&color, "teal", 0).await.unwrap();
        store.create_child(&color, "rust", 1).await.unwrap();

        let nested = extractor
            .find_nested_values(&page, "My Info")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(nested.len(), 2);
        assert_eq!(nested["avatar"], FieldValue::from("url"));
        assert_eq!(nested["favoriteColor"], FieldValue::from(["teal", "rust"]));
        assert!(!nested.contains_key("pronouns"));
    }

    #[tokio::test]
    async fn read_all_collects_headers_in_order() {
        let (store, extractor) = fixture().await;
        let (page, _) = seed_header(store.as_ref(), "Page", "Location::", &["Oakland"]).await;
        seed_header(store.as_ref(), "Page", "plain prose", &["ignored"]).await;
        seed_header(store.as_ref(), "Page", "**Tags:**", &["a", "b"]).await;
        seed_header(store.as_ref(), "Page", "Empty::", &[]).await;

        let all = extractor.read_all(&page).await.unwrap();

        let keys: Vec<_> = all.keys().map(String::as_str).collect();
        assert_eq!(keys, ["Location", "Tags"]);
        assert_eq!(all["Tags"], FieldValue::from(["a", "b"]));
    }
}
