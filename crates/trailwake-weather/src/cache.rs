//! Time-bounded cache over a [`KvStore`].
//!
//! Every cached payload has a sibling `<key>:t` entry holding its write
//! timestamp in epoch milliseconds. An entry is valid iff
//! `now - stored_at <= max_age`; invalid entries are deleted lazily on the
//! next read, never proactively swept. There is no eviction policy beyond
//! TTL and no capacity bound: the key space is one entry per
//! coordinate/metric/day bucket.
//!
//! Reads are read-then-write without a mutual-exclusion guard across the
//! pair of keys; two overlapping calls for the same key can both miss and
//! both write. Last writer wins, which is acceptable at single-user request
//! rates.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::store::KvStore;

fn timestamp_key(key: &str) -> String {
    format!("{key}:t")
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// TTL key/value cache. Cheap to clone when the store is.
#[derive(Clone)]
pub struct TtlCache<S> {
    store: S,
}

impl<S: KvStore> TtlCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Serialize `data` under `key` and record the write time under
    /// `key:t`. Returns false when the store refused either write;
    /// callers treat that as "no persistence", not an error.
    pub fn save<T: Serialize>(&self, key: &str, data: &T) -> bool {
        let payload = match serde_json::to_string(data) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Cache serialize failed for {}: {}", key, e);
                return false;
            }
        };

        if !self.store.set_item(key, &payload) {
            return false;
        }
        self.store.set_item(&timestamp_key(key), &now_ms().to_string())
    }

    /// Load the payload under `key` if it is younger than `max_age`.
    ///
    /// Misses on: absent timestamp, corrupted timestamp (both entries are
    /// deleted so the next fetch starts clean), expiry (likewise deleted),
    /// absent payload, or a payload that no longer deserializes.
    pub fn load<T: DeserializeOwned>(&self, key: &str, max_age: Duration) -> Option<T> {
        let ts_key = timestamp_key(key);
        let raw_ts = self.store.get_item(&ts_key)?;

        let stored_at: i64 = match raw_ts.parse() {
            Ok(ts) => ts,
            Err(_) => {
                tracing::warn!("Corrupted cache timestamp for {}, purging", key);
                self.purge(key);
                return None;
            }
        };

        let age = now_ms().saturating_sub(stored_at);
        if age > max_age.as_millis() as i64 {
            tracing::debug!("Cache expired for {} (age {}ms)", key, age);
            self.purge(key);
            return None;
        }

        let payload = self.store.get_item(key)?;
        match serde_json::from_str(&payload) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("Cache payload unreadable for {}: {}", key, e);
                None
            }
        }
    }

    fn purge(&self, key: &str) {
        self.store.remove_item(key);
        self.store.remove_item(&timestamp_key(key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Payload {
        value: u32,
        label: String,
    }

    fn sample() -> Payload {
        Payload {
            value: 7,
            label: "seven".into(),
        }
    }

    fn cache() -> (TtlCache<MemoryStore>, MemoryStore) {
        let store = MemoryStore::new();
        (TtlCache::new(store.clone()), store)
    }

    #[test]
    fn test_save_then_load_returns_value() {
        let (cache, _) = cache();
        assert!(cache.save("k", &sample()));
        let loaded: Payload = cache.load("k", Duration::from_secs(60)).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_load_without_save_is_miss() {
        let (cache, _) = cache();
        assert!(cache.load::<Payload>("k", Duration::from_secs(60)).is_none());
    }

    #[test]
    fn test_expired_entry_removes_both_keys() {
        let (cache, store) = cache();
        assert!(cache.save("k", &sample()));

        std::thread::sleep(Duration::from_millis(30));
        assert!(cache.load::<Payload>("k", Duration::from_millis(5)).is_none());

        // Lazy invalidation deleted the payload and the timestamp.
        assert!(store.get_item("k").is_none());
        assert!(store.get_item("k:t").is_none());
    }

    #[test]
    fn test_corrupted_timestamp_self_heals() {
        let (cache, store) = cache();
        assert!(cache.save("k", &sample()));
        store.set_item("k:t", "not-a-number");

        assert!(cache.load::<Payload>("k", Duration::from_secs(60)).is_none());
        assert!(store.get_item("k").is_none());
        assert!(store.get_item("k:t").is_none());
    }

    #[test]
    fn test_unreadable_payload_is_miss_not_error() {
        let (cache, store) = cache();
        assert!(cache.save("k", &sample()));
        store.set_item("k", "{ definitely not json");

        assert!(cache.load::<Payload>("k", Duration::from_secs(60)).is_none());
    }

    #[test]
    fn test_timestamp_without_payload_is_miss() {
        let (cache, store) = cache();
        store.set_item("k:t", &chrono::Utc::now().timestamp_millis().to_string());
        assert!(cache.load::<Payload>("k", Duration::from_secs(60)).is_none());
    }

    #[test]
    fn test_fresh_entry_survives_repeated_loads() {
        let (cache, _) = cache();
        assert!(cache.save("k", &sample()));
        for _ in 0..3 {
            assert!(cache.load::<Payload>("k", Duration::from_secs(60)).is_some());
        }
    }
}
