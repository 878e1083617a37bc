use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Process-wide memo for expensive provider responses, keyed by request
/// signature. Entries expire on read once the time-to-live has passed.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, Entry<V>>>,
}

struct Entry<V> {
    stored_at: Instant,
    value: V,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: K, value: V) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        entries.insert(
            key,
            Entry {
                stored_at: Instant::now(),
                value,
            },
        );
    }
}

#[test]
fn serves_within_ttl_test() {
    let cache = TtlCache::new(Duration::from_secs(60));
    cache.insert("k", 1);

    assert_eq!(cache.get(&"k"), Some(1));
    assert_eq!(cache.get(&"missing"), None);
}

#[test]
fn expires_on_read_test() {
    let cache = TtlCache::new(Duration::from_millis(10));
    cache.insert("k", 1);

    std::thread::sleep(Duration::from_millis(20));

    assert_eq!(cache.get(&"k"), None);
}

#[test]
fn insert_refreshes_expiry_test() {
    let cache = TtlCache::new(Duration::from_millis(40));
    cache.insert("k", 1);

    std::thread::sleep(Duration::from_millis(25));
    cache.insert("k", 2);
    std::thread::sleep(Duration::from_millis(25));

    assert_eq!(cache.get(&"k"), Some(2));
}
