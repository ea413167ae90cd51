use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// What to do with an entry after [`ExpiringCache::modify_at`] touched it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryAction {
    Keep,
    Remove,
}

/// Bounded key/value store where every entry lives for a fixed TTL. The
/// least recently used entry is evicted once capacity is reached.
pub(crate) struct ExpiringCache<K: Hash + Eq, V> {
    inner: Mutex<LruCache<K, Entry<V>>>,
    ttl: Duration,
}

impl<K: Hash + Eq, V: Clone> ExpiringCache<K, V> {
    pub(crate) fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Replaces any previous entry and restarts its TTL.
    pub(crate) fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    pub(crate) fn insert_at(&self, key: K, value: V, now: Instant) {
        let entry = Entry {
            value,
            expires_at: now + self.ttl,
        };
        self.lock().put(key, entry);
    }

    #[cfg(test)]
    pub(crate) fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    #[cfg(test)]
    pub(crate) fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        let mut cache = self.lock();
        match cache.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                cache.pop(key);
                None
            }
            None => None,
        }
    }

    /// Runs `f` on a live entry under the cache lock, so check-and-update
    /// sequences are atomic. Expired entries are dropped and `None` returned.
    pub(crate) fn modify_at<R>(
        &self,
        key: &K,
        now: Instant,
        f: impl FnOnce(&mut V) -> (R, EntryAction),
    ) -> Option<R> {
        let mut cache = self.lock();
        let entry = cache.get_mut(key)?;
        if entry.expires_at <= now {
            cache.pop(key);
            return None;
        }

        let (result, action) = f(&mut entry.value);
        if action == EntryAction::Remove {
            cache.pop(key);
        }
        Some(result)
    }

    #[cfg(test)]
    pub(crate) fn remove(&self, key: &K) -> Option<V> {
        self.lock().pop(key).map(|entry| entry.value)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<K, Entry<V>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
