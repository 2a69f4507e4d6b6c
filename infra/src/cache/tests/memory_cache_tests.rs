//! Tests for the in-memory TTL store

use chrono::Duration;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use tk_core::clock::ManualClock;
use tk_core::domain::entities::token::TokenKind;
use tk_core::repositories::{BucketTokenStore, CacheStore, TokenStore};

use crate::cache::MemoryCache;

fn create_test_cache() -> (Arc<ManualClock>, Arc<MemoryCache>) {
    let clock = Arc::new(ManualClock::starting_now());
    let cache = Arc::new(MemoryCache::with_clock(clock.clone()));
    (clock, cache)
}

#[tokio::test]
async fn test_set_and_get() {
    let (_, cache) = create_test_cache();

    cache.set_with_expiry("k", "v", 60).await.unwrap();
    assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));
    assert_eq!(cache.get("missing").await.unwrap(), None);
}

#[tokio::test]
async fn test_entries_expire() {
    let (clock, cache) = create_test_cache();

    cache.set_with_expiry("k", "v", 60).await.unwrap();
    clock.advance(Duration::seconds(59));
    assert!(cache.get("k").await.unwrap().is_some());

    clock.advance(Duration::seconds(1));
    assert!(cache.get("k").await.unwrap().is_none());
    assert_eq!(cache.purge_expired().await, 1);
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_compare_and_set() {
    let (_, cache) = create_test_cache();

    assert!(cache.compare_and_set("k", None, "a", 60).await.unwrap());
    assert!(!cache.compare_and_set("k", None, "b", 60).await.unwrap());
    assert!(!cache.compare_and_set("k", Some("x"), "b", 60).await.unwrap());
    assert!(cache.compare_and_set("k", Some("a"), "b", 60).await.unwrap());
    assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("b"));
}

#[tokio::test]
async fn test_compare_and_set_treats_expired_as_absent() {
    let (clock, cache) = create_test_cache();

    cache.set_with_expiry("k", "old", 10).await.unwrap();
    clock.advance(Duration::seconds(11));

    assert!(!cache.compare_and_set("k", Some("old"), "new", 60).await.unwrap());
    assert!(cache.compare_and_set("k", None, "new", 60).await.unwrap());
}

#[tokio::test]
async fn test_write_resets_ttl() {
    let (clock, cache) = create_test_cache();

    cache.set_with_expiry("k", "a", 60).await.unwrap();
    clock.advance(Duration::seconds(50));
    cache.compare_and_set("k", Some("a"), "b", 60).await.unwrap();

    assert_eq!(cache.ttl("k").await, Some(60));
}

#[tokio::test]
async fn test_delete() {
    let (_, cache) = create_test_cache();

    cache.set_with_expiry("k", "v", 60).await.unwrap();
    assert!(cache.delete("k").await.unwrap());
    assert!(!cache.delete("k").await.unwrap());
}

#[tokio::test]
async fn test_bucket_expires_with_kind_lifetime() {
    let (clock, cache) = create_test_cache();
    let store = BucketTokenStore::new(cache.clone(), 5);

    store
        .insert(1, TokenKind::Access, "a", StdDuration::from_secs(3_600))
        .await
        .unwrap();

    clock.advance(Duration::minutes(59));
    assert!(store.contains(1, TokenKind::Access, "a").await.unwrap());

    // a second insert slides the whole bucket's expiry forward
    store
        .insert(1, TokenKind::Access, "b", StdDuration::from_secs(3_600))
        .await
        .unwrap();
    clock.advance(Duration::minutes(30));
    assert!(store.contains(1, TokenKind::Access, "a").await.unwrap());

    clock.advance(Duration::minutes(31));
    assert!(store.list(1, TokenKind::Access).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_removal_extends_bucket_lifetime() {
    let (clock, cache) = create_test_cache();
    let store = BucketTokenStore::new(cache.clone(), 5);

    store
        .insert(1, TokenKind::Access, "a", StdDuration::from_secs(3_600))
        .await
        .unwrap();
    store
        .insert(1, TokenKind::Access, "b", StdDuration::from_secs(3_600))
        .await
        .unwrap();
    store
        .remove(1, TokenKind::Access, "a", StdDuration::from_secs(30 * 86_400))
        .await
        .unwrap();

    clock.advance(Duration::days(29));
    assert_eq!(store.list(1, TokenKind::Access).await.unwrap(), vec!["b"]);
}

#[tokio::test(start_paused = true)]
async fn test_purger_sweeps_expired_buckets() {
    let (clock, cache) = create_test_cache();
    cache.set_with_expiry("gone", "v", 60).await.unwrap();
    cache.set_with_expiry("kept", "v", 3_600).await.unwrap();
    clock.advance(Duration::seconds(61));

    let purger = cache.spawn_purger(StdDuration::from_secs(30));
    tokio::time::sleep(StdDuration::from_secs(31)).await;

    assert_eq!(cache.purge_expired().await, 0);
    assert_eq!(cache.len().await, 1);
    assert!(!purger.is_finished());
}

#[tokio::test(start_paused = true)]
async fn test_purger_stops_when_cache_dropped() {
    let (_, cache) = create_test_cache();
    let purger = cache.spawn_purger(StdDuration::from_secs(30));

    drop(cache);
    tokio::time::sleep(StdDuration::from_secs(61)).await;

    assert!(purger.is_finished());
}
