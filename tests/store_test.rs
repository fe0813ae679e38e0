//! Tests for the durable key-value stores.

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use shotterms::store::CACHE_KEY;
use shotterms::{
    CacheConfig, FileStore, KvStore, ManualClock, MemoryStore, ParsedTerms, ResultCache,
    ShotSize, ShotTermsError,
};

#[tokio::test]
async fn file_store_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("nested"));

    assert_eq!(store.get("shotterms.quota").await.unwrap(), None);

    store
        .set("shotterms.quota", r#"{"used":1}"#.to_string())
        .await
        .unwrap();
    assert_eq!(
        store.get("shotterms.quota").await.unwrap().as_deref(),
        Some(r#"{"used":1}"#)
    );

    store
        .set("shotterms.quota", r#"{"used":2}"#.to_string())
        .await
        .unwrap();
    assert_eq!(
        store.get("shotterms.quota").await.unwrap().as_deref(),
        Some(r#"{"used":2}"#)
    );

    // one file per key, no temporary left behind
    let path = dir.path().join("nested").join("shotterms.quota.json");
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());
}

#[tokio::test]
async fn file_store_remove_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());

    store.set("k", "v".to_string()).await.unwrap();
    store.remove("k").await.unwrap();
    assert_eq!(store.get("k").await.unwrap(), None);
    store.remove("k").await.unwrap();
}

#[tokio::test]
async fn file_store_rejects_path_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());

    let err = store.set("../escape", "v".to_string()).await.unwrap_err();
    assert!(matches!(err, ShotTermsError::InvalidInput(_)));
}

#[tokio::test]
async fn cache_survives_a_new_process() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
    ));
    let terms = ParsedTerms {
        shot_size: Some(ShotSize::CloseUp),
        confidence: 0.9,
        ..Default::default()
    };

    let first = ResultCache::new(
        Arc::new(FileStore::new(dir.path())),
        clock.clone(),
        CacheConfig::default(),
    );
    first.put("一个特写", terms.clone()).await;
    drop(first);

    let second = ResultCache::new(
        Arc::new(FileStore::new(dir.path())),
        clock,
        CacheConfig::default(),
    );
    assert_eq!(second.get("一个特写").await, Some(terms));
    assert!(dir.path().join(format!("{CACHE_KEY}.json")).exists());
}

#[tokio::test]
async fn memory_store_roundtrip() {
    let store = MemoryStore::new();
    assert!(store.is_empty().await);

    store.set("a", "1".to_string()).await.unwrap();
    store.set("b", "2".to_string()).await.unwrap();
    assert_eq!(store.len().await, 2);
    assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));

    store.remove("a").await.unwrap();
    store.remove("missing").await.unwrap();
    assert_eq!(store.get("a").await.unwrap(), None);
    assert_eq!(store.len().await, 1);
}
