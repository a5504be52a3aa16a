use lru::LruCache;
use parking_lot::Mutex;
use std::borrow::Borrow;
use std::fmt::{Debug, Formatter};
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    last_access: Instant,
}

/// Size bounded cache with access based expiry.
///
/// An entry expires once it has not been read or written for `ttl`. When the
/// cache is full the least recently used entry is evicted.
pub struct ExpiringCache<K: Hash + Eq, V> {
    ttl: Duration,
    inner: Mutex<LruCache<K, Entry<V>>>,
}

impl<K: Hash + Eq, V> Debug for ExpiringCache<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ExpiringCache")
            .field("ttl", &self.ttl)
            .field("capacity", &inner.cap())
            .field("len", &inner.len())
            .finish()
    }
}

impl<K: Hash + Eq, V: Clone> ExpiringCache<K, V> {
    /// Create a cache holding at most `capacity` entries, a zero capacity holds one.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            ttl,
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Get a live entry and refresh its access time.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut inner = self.inner.lock();
        let expired = match inner.get_mut(key) {
            None => return None,
            Some(entry) if entry.last_access.elapsed() >= self.ttl => true,
            Some(entry) => {
                entry.last_access = Instant::now();
                return Some(entry.value.clone());
            }
        };
        if expired {
            inner.pop(key);
        }
        None
    }

    /// Insert or replace an entry.
    pub fn insert(&self, key: K, value: V) {
        self.inner.lock().put(
            key,
            Entry {
                value,
                last_access: Instant::now(),
            },
        );
    }

    /// Drop one entry.
    pub fn invalidate<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().pop(key);
    }

    /// Drop every entry.
    pub fn invalidate_all(&self) {
        self.inner.lock().clear();
    }

    /// Number of entries, expired ones included until they are touched.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the cache holds no entry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
