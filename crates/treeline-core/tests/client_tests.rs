//! End-to-end behaviour of the client over in-memory and faulty stores.

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use treeline_core::prelude::*;
use treeline_core::{telemetry, CascadeConfig, CascadeError, PendingClaim};
use treeline_test_utils::{FaultyStore, LaggyStore, RecordingStore};
use treeline_tree::{MemoryStore, Node, StoreResult};

/// Serves its first child listing from a snapshot, 100 ms late
struct SlowFirstListing {
    inner: MemoryStore,
    armed: AtomicBool,
}

impl SlowFirstListing {
    fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            armed: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl TreeStore for SlowFirstListing {
    async fn resolve_root_by_title(&self, title: &str) -> StoreResult<Option<NodeId>> {
        self.inner.resolve_root_by_title(title).await
    }

    async fn create_root(&self, title: &str) -> StoreResult<NodeId> {
        self.inner.create_root(title).await
    }

    async fn get_children(&self, parent: &NodeId) -> StoreResult<Vec<Node>> {
        let children = self.inner.get_children(parent).await?;
        if self.armed.swap(false, Ordering::SeqCst) {
            sleep(Duration::from_millis(100)).await;
        }
        Ok(children)
    }

    async fn create_child(&self, parent: &NodeId, text: &str, order: usize) -> StoreResult<NodeId> {
        self.inner.create_child(parent, text, order).await
    }

    async fn update_text(&self, id: &NodeId, text: &str) -> StoreResult<()> {
        self.inner.update_text(id, text).await
    }

    async fn delete_node(&self, id: &NodeId) -> StoreResult<()> {
        self.inner.delete_node(id).await
    }
}

fn nested(pairs: &[(&str, &str)]) -> NestedValues {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), FieldValue::from(*v)))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn repeated_cascade_is_read_only() {
    telemetry::init_tracing("treeline=debug");
    let store = Arc::new(RecordingStore::new(MemoryStore::new()));
    let client = Treeline::new(store.clone(), TreelineConfig::default());

    let first = client.cascade_to_path(&["A", "B", "C"]).await.unwrap();
    let mutations = store.counts().mutations();
    let second = client.cascade_to_path(&["A", "B", "C"]).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(store.counts().mutations(), mutations);
}

#[tokio::test(start_paused = true)]
async fn cascade_converges_through_stale_reads() {
    let store = Arc::new(RecordingStore::new(LaggyStore::new(MemoryStore::new(), 3)));
    let client = Treeline::new(store.clone(), TreelineConfig::default());

    let leaf = client.cascade_to_path(&["Team", "Members", "ada"]).await.unwrap();

    assert_eq!(store.counts().create_root, 1);
    assert_eq!(store.counts().create_child, 2);
    assert_eq!(store.inner().inner().node(&leaf).unwrap().text, "ada");
}

#[tokio::test(start_paused = true)]
async fn timeout_names_the_stuck_level() {
    let memory = MemoryStore::new();
    let root = memory.create_root("A").await.unwrap();
    let store = Arc::new(FaultyStore::new(memory).with_failing_child_creates());
    let config = TreelineConfig::new().with_cascade(CascadeConfig::new().with_timeout(Duration::from_millis(3000)));
    let client = Treeline::new(store, config);
    let started = Instant::now();

    let err = client.cascade_to_path(&["A", "B"]).await.unwrap_err();

    let TreelineError::Cascade(cascade) = &err else {
        panic!("expected cascade error, got {err:?}");
    };
    assert!(cascade.is_timeout());
    assert_eq!(cascade.stuck_claim(), Some(&PendingClaim::child(1, root, "B")));
    assert!(started.elapsed() >= Duration::from_millis(3000));
    assert!(started.elapsed() < Duration::from_millis(3200));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn blank_segment_is_invalid_path() {
    let client = Treeline::new(Arc::new(MemoryStore::new()), TreelineConfig::default());

    let err = client.cascade_to_path(&["A", " ", "C"]).await.unwrap_err();
    assert!(matches!(err, TreelineError::Cascade(CascadeError::InvalidPath { .. })));
}

#[tokio::test]
async fn single_and_multi_value_round_trip() {
    let client = Treeline::new(Arc::new(MemoryStore::new()), TreelineConfig::default());
    let c = client.cascade_to_path(&["People", "ada"]).await.unwrap();

    assert!(client.write_value(&c, "Location", "Oakland", true).await);
    assert!(client.write_value(&c, "Tags", vec!["a", "b", "c"], true).await);

    assert_eq!(
        client.read_value(&c, "Location").await.unwrap(),
        Some(FieldValue::from("Oakland"))
    );
    assert_eq!(
        client.read_value(&c, "Tags").await.unwrap(),
        Some(FieldValue::from(vec!["a", "b", "c"]))
    );
    assert_eq!(client.read_value(&c, "Missing").await.unwrap(), None);
}

#[tokio::test]
async fn nested_round_trip_leaves_unwritten_categories_out() {
    let client = Treeline::new(Arc::new(MemoryStore::new()), TreelineConfig::default());
    let c = client.cascade_to_path(&["People", "ada"]).await.unwrap();
    let values = nested(&[("avatar", "url"), ("role", "Dev")]);

    assert!(client.write_nested_values(&c, "My Info", &values, true).await);

    let read = client.read_nested_values(&c, "My Info").await.unwrap().unwrap();
    assert_eq!(read, values);
    assert!(!read.contains_key("location"));
}

#[tokio::test]
async fn nested_write_with_one_failing_category_still_succeeds() {
    let store = Arc::new(FaultyStore::new(MemoryStore::new()).with_failing_text("broken::"));
    let client = Treeline::new(store, TreelineConfig::default());
    let c = client.cascade_to_path(&["People"]).await.unwrap();
    let values = nested(&[("broken", "x"), ("role", "Dev")]);

    let outcome = client
        .try_write_nested_values(&c, "My Info", &values, HeaderFormat::Attribute)
        .await
        .unwrap();
    assert_eq!(outcome.written, vec!["role".to_string()]);
    assert_eq!(outcome.failed.len(), 1);

    assert!(client.write_nested_values(&c, "My Info", &values, true).await);
    assert_eq!(
        client.read_nested_values(&c, "My Info").await.unwrap(),
        Some(nested(&[("role", "Dev")]))
    );
}

#[tokio::test]
async fn nested_write_with_every_category_failing_reports_false() {
    let store = Arc::new(FaultyStore::new(MemoryStore::new()).with_failing_text("broken::"));
    let client = Treeline::new(store, TreelineConfig::default());
    let c = client.cascade_to_path(&["People"]).await.unwrap();

    assert!(!client.write_nested_values(&c, "My Info", &nested(&[("broken", "x")]), true).await);
}

#[tokio::test]
async fn prose_mentioning_a_key_is_not_its_header() {
    let memory = MemoryStore::new();
    let c = memory.create_root("People").await.unwrap();
    memory.create_child(&c, "Notes about My Info usage", 0).await.unwrap();
    let client = Treeline::new(Arc::new(memory), TreelineConfig::default());

    assert_eq!(client.read_nested_values(&c, "My Info").await.unwrap(), None);
    assert!(client.write_nested_values(&c, "My Info", &nested(&[("role", "Dev")]), true).await);
    assert_eq!(
        client.read_nested_values(&c, "My Info").await.unwrap(),
        Some(nested(&[("role", "Dev")]))
    );
}

#[tokio::test]
async fn configured_read_cache_is_invalidated_by_writes() {
    let config = TreelineConfig::from_toml_str("read_cache_ttl_ms = 60000").unwrap();
    let client = Treeline::new(Arc::new(MemoryStore::new()), config);
    assert!(client.read_cache().is_some());
    let c = client.cascade_to_path(&["People"]).await.unwrap();

    assert!(client.write_value(&c, "Tags", vec!["a"], true).await);
    assert_eq!(client.read_value(&c, "Tags").await.unwrap(), Some(FieldValue::from("a")));

    assert!(client.write_value(&c, "Tags", vec!["a", "b"], false).await);
    assert_eq!(
        client.read_value(&c, "Tags").await.unwrap(),
        Some(FieldValue::from(vec!["a", "b"]))
    );
}

#[tokio::test(start_paused = true)]
async fn read_overlapping_a_write_is_not_cached() {
    let memory = MemoryStore::new();
    let c = memory.create_root("People").await.unwrap();
    let client = Treeline::new(Arc::new(SlowFirstListing::new(memory)), TreelineConfig::default())
        .with_default_read_cache();

    let (during, wrote) = tokio::join!(client.read_value(&c, "Location"), async {
        sleep(Duration::from_millis(10)).await;
        client.write_value(&c, "Location", "Oakland", true).await
    });

    assert!(wrote);
    assert_eq!(during.unwrap(), None, "read started before the write");
    assert_eq!(
        client.read_value(&c, "Location").await.unwrap(),
        Some(FieldValue::from("Oakland"))
    );
}

#[tokio::test(start_paused = true)]
async fn repeated_writes_over_a_lagging_store_keep_one_header() {
    let store = Arc::new(LaggyStore::new(MemoryStore::new(), 2));
    let client = Treeline::new(store.clone(), TreelineConfig::default());
    let c = client.cascade_to_path(&["People", "ada"]).await.unwrap();

    assert!(client.write_value(&c, "Location", "Oakland", true).await);
    assert!(client.write_value(&c, "Location", "Berkeley", true).await);

    assert_eq!(store.inner().child_texts(&c), ["Location::"]);
    assert_eq!(
        client.read_value(&c, "Location").await.unwrap(),
        Some(FieldValue::from("Berkeley"))
    );
}
