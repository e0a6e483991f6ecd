//! In-memory caching: a guarded lazy cell and a TTL memo cache.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Thread-safe container for a single lazily-initialized value.
///
/// All access serializes on one mutex, so no thread observes a
/// half-initialized state.
pub struct Atomic<T> {
    value: Mutex<Option<T>>,
}

impl<T: Clone + PartialEq> Atomic<T> {
    pub fn new() -> Self {
        Self {
            value: Mutex::new(None),
        }
    }

    pub fn with_value(value: T) -> Self {
        Self {
            value: Mutex::new(Some(value)),
        }
    }

    /// Stores `value` and returns `true`.
    ///
    /// With `on_diff` set, an equal value is kept untouched and the call
    /// returns `false`.
    pub fn set(&self, value: T, on_diff: bool) -> bool {
        let mut slot = self.value.lock().expect("atomic lock poisoned");
        if on_diff && slot.as_ref() == Some(&value) {
            return false;
        }
        *slot = Some(value);
        true
    }

    /// Returns the stored value, computing it with `init` on first access.
    ///
    /// `init` runs while the lock is held, so concurrent first reads invoke it
    /// exactly once. An `init` that re-enters the same cell deadlocks.
    pub fn get_or_init<F>(&self, init: F) -> T
    where
        F: FnOnce() -> T,
    {
        let mut slot = self.value.lock().expect("atomic lock poisoned");
        if let Some(value) = &*slot {
            return value.clone();
        }
        let value = init();
        *slot = Some(value.clone());
        value
    }

    pub fn get(&self) -> Option<T> {
        self.value.lock().expect("atomic lock poisoned").clone()
    }
}

impl<T: Clone + PartialEq> Default for Atomic<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Expiring memo cache; entries older than the TTL count as absent.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, (Instant, V)>>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(key) {
            Some((stored, value)) if stored.elapsed() <= self.ttl => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Inserts `value`, resetting the entry age.
    pub fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(key, (Instant::now(), value));
    }

    pub fn invalidate(&self, key: &K) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn atomic_initializes_once() {
        let calls = AtomicUsize::new(0);
        let cell: Atomic<i32> = Atomic::new();

        let first = cell.get_or_init(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            42
        });
        let second = cell.get_or_init(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            99
        });

        assert_eq!(first, 42);
        assert_eq!(second, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn atomic_initializes_once_across_threads() {
        let cell = Arc::new(Atomic::<i32>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cell = Arc::clone(&cell);
                let calls = Arc::clone(&calls);
                std::thread::spawn(move || {
                    cell.get_or_init(|| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        7
                    })
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().expect("thread panicked"), 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn atomic_set_on_diff_skips_equal_values() {
        let cell = Atomic::with_value(1);
        assert!(!cell.set(1, true));
        assert!(cell.set(2, true));
        assert!(cell.set(2, false));
        assert_eq!(cell.get(), Some(2));
    }

    #[test]
    fn ttl_cache_returns_fresh_entries() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("key", 1);
        assert_eq!(cache.get(&"key"), Some(1));
    }

    #[test]
    fn ttl_cache_expires_entries() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.insert("key", 1);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get(&"key"), None);
    }

    #[test]
    fn ttl_cache_invalidate_removes_entry() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("key", 1);
        cache.invalidate(&"key");
        assert_eq!(cache.get(&"key"), None);
    }
}
