//! Cache prefix isolation and cross-decorator behavior (spec §8).

use std::time::Duration;

use relay_cache::{RelayCache, Ttl};

#[tokio::test]
async fn set_then_keys_returns_unprefixed_key() {
    let cache = RelayCache::local(100, Duration::from_secs(60));
    cache.main().set("foo", b"bar".to_vec(), Ttl::Default, "test").await;

    let keys = cache.main().keys("*", "test").await;
    assert_eq!(keys, vec!["foo".to_string()]);
}

#[tokio::test]
async fn clear_does_not_touch_reserved_store() {
    let cache = RelayCache::local(100, Duration::from_secs(60));
    cache.reserved().set("chain-id", b"0x128".to_vec(), Ttl::Indefinite, "test").await;
    cache.main().set("transient", b"x".to_vec(), Ttl::Default, "test").await;

    cache.main().clear("test").await;

    assert_eq!(cache.main().get("transient", "test").await, None);
    assert_eq!(cache.reserved().get("chain-id", "test").await, Some(b"0x128".to_vec()));
}
