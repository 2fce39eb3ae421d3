use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use studypath_store::{ResponseCache, Store, DEFAULT_CACHE_TTL};

fn cache() -> ResponseCache {
    ResponseCache::new(Arc::new(Store::open_in_memory().unwrap()))
}

#[test]
fn default_ttl_is_one_hour() {
    assert_eq!(DEFAULT_CACHE_TTL, Duration::from_secs(3600));
}

#[test]
fn put_then_get_returns_value() {
    let cache = cache();
    cache
        .put("quiz/maths", &serde_json::json!({ "questions": 10 }), None)
        .unwrap();

    let value: serde_json::Value = cache.get("quiz/maths").unwrap().unwrap();
    assert_eq!(value["questions"], 10);
}

#[test]
fn get_missing_key_returns_none() {
    let cache = cache();
    let value: Option<serde_json::Value> = cache.get("absent").unwrap();
    assert!(value.is_none());
}

#[test]
fn put_overwrites_existing_entry() {
    let cache = cache();
    cache.put("k", &"first", None).unwrap();
    cache.put("k", &"second", None).unwrap();

    let value: String = cache.get("k").unwrap().unwrap();
    assert_eq!(value, "second");
    assert_eq!(cache.len().unwrap(), 1);
}

#[test]
fn expired_entry_is_evicted_on_read() {
    let cache = cache();
    cache
        .put("short", &"v", Some(Duration::from_millis(50)))
        .unwrap();

    // Within the TTL the value is served.
    let value: Option<String> = cache.get("short").unwrap();
    assert_eq!(value.as_deref(), Some("v"));

    std::thread::sleep(Duration::from_millis(120));

    // Past the TTL: not found, and the row is physically gone.
    let value: Option<String> = cache.get("short").unwrap();
    assert!(value.is_none());
    assert_eq!(cache.len().unwrap(), 0);
}

#[test]
fn unread_expired_entries_linger_until_swept() {
    let cache = cache();
    cache
        .put("stale", &"v", Some(Duration::from_millis(30)))
        .unwrap();
    cache.put("fresh", &"v", None).unwrap();

    std::thread::sleep(Duration::from_millis(100));

    // Lazy eviction only happens on access, so the row is still there.
    assert_eq!(cache.len().unwrap(), 2);

    let removed = cache.sweep_expired().unwrap();
    assert_eq!(removed, 1);
    assert_eq!(cache.len().unwrap(), 1);

    let fresh: Option<String> = cache.get("fresh").unwrap();
    assert!(fresh.is_some());
}
