//! Bounded least-recently-used cache of computed encodings.
//!
//! A thin layer over [`lru::LruCache`] that counts hits, misses and
//! evictions. The cache knows nothing about hashing; it only memoizes
//! whatever the encoder computes. It is owned and mutated by a single
//! thread.

use std::borrow::Borrow;
use std::hash::Hash;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3Builder;

/// Cumulative cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub len: usize,
    pub capacity: usize,
}

pub struct LruCache<K, V> {
    inner: lru::LruCache<K, V, Xxh3Builder>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq,
{
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: lru::LruCache::with_hasher(capacity, Xxh3Builder::new()),
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Look up `key` and mark it most recently used on a hit.
    ///
    /// A miss is counted but inserts nothing.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.inner.get(key) {
            Some(value) => {
                self.hits += 1;
                Some(value)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Look up `key` without touching recency or counters.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.peek(key)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains(key)
    }

    /// Insert or overwrite `key`, making it most recently used.
    ///
    /// Returns the entry evicted to make room, if any.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if self.inner.contains(&key) {
            self.inner.put(key, value);
            return None;
        }
        let evicted = self.inner.push(key, value);
        if evicted.is_some() {
            self.evictions += 1;
        }
        evicted
    }

    /// Return the cached value for `key`, computing and inserting it on a
    /// miss.
    pub fn get_or_insert_with<F>(&mut self, key: K, compute: F) -> &V
    where
        F: FnOnce() -> V,
    {
        if self.inner.contains(&key) {
            self.hits += 1;
        } else {
            self.misses += 1;
            if self.inner.len() == self.inner.cap().get() {
                self.evictions += 1;
            }
        }
        self.inner.get_or_insert(key, compute)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.cap().get()
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&mut self) {
        self.inner.clear();
        self.hits = 0;
        self.misses = 0;
        self.evictions = 0;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            len: self.len(),
            capacity: self.capacity(),
        }
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.inner.iter().map(|(key, _)| key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(cap: usize) -> LruCache<String, u32> {
        LruCache::new(NonZeroUsize::new(cap).unwrap())
    }

    fn keys(c: &LruCache<String, u32>) -> Vec<&str> {
        c.keys().map(String::as_str).collect()
    }

    // ==================== Basic operations ====================

    #[test]
    fn put_then_get() {
        let mut c = cache(2);
        assert!(c.put("a".into(), 1).is_none());
        assert_eq!(c.get("a"), Some(&1));
        assert_eq!(c.len(), 1);
        assert_eq!(c.capacity(), 2);
    }

    #[test]
    fn miss_does_not_insert() {
        let mut c = cache(2);
        assert_eq!(c.get("nope"), None);
        assert!(c.is_empty());
        assert_eq!(c.stats().misses, 1);
    }

    #[test]
    fn overwrite_keeps_len() {
        let mut c = cache(2);
        c.put("a".into(), 1);
        c.put("a".into(), 2);
        assert_eq!(c.len(), 1);
        assert_eq!(c.peek("a"), Some(&2));
        assert_eq!(c.stats().evictions, 0);
    }

    // ==================== Recency ====================

    #[test]
    fn evicts_least_recently_used() {
        let mut c = cache(2);
        c.put("a".into(), 1);
        c.put("b".into(), 2);
        let evicted = c.put("c".into(), 3);
        assert_eq!(evicted, Some(("a".to_string(), 1)));
        assert!(!c.contains("a"));
        assert_eq!(keys(&c), vec!["c", "b"]);
    }

    #[test]
    fn get_hit_refreshes_recency() {
        let mut c = cache(2);
        c.put("a".into(), 1);
        c.put("b".into(), 2);
        assert_eq!(c.get("a"), Some(&1));
        c.put("c".into(), 3);
        assert!(c.contains("a"));
        assert!(!c.contains("b"));
    }

    #[test]
    fn peek_and_contains_do_not_refresh() {
        let mut c = cache(2);
        c.put("a".into(), 1);
        c.put("b".into(), 2);
        assert_eq!(c.peek("a"), Some(&1));
        assert!(c.contains("a"));
        c.put("c".into(), 3);
        assert!(!c.contains("a"));
        assert_eq!(c.stats().hits, 0);
    }

    #[test]
    fn capacity_one() {
        let mut c = cache(1);
        c.put("a".into(), 1);
        c.put("b".into(), 2);
        assert_eq!(keys(&c), vec!["b"]);
        assert_eq!(c.get("b"), Some(&2));
        assert_eq!(c.stats().evictions, 1);
    }

    #[test]
    fn recency_order_after_mixed_ops() {
        let mut c = cache(3);
        c.put("a".into(), 1);
        c.put("b".into(), 2);
        c.put("c".into(), 3);
        c.get("a");
        c.put("b".into(), 20);
        assert_eq!(keys(&c), vec!["b", "a", "c"]);
        c.put("d".into(), 4);
        assert_eq!(keys(&c), vec!["d", "b", "a"]);
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut c = cache(8);
        for i in 0..100u32 {
            c.put(format!("k{i}"), i);
            assert!(c.len() <= 8);
        }
        assert_eq!(c.len(), 8);
        assert_eq!(c.stats().evictions, 92);
        let expected: Vec<String> = (92..100).rev().map(|i| format!("k{i}")).collect();
        assert_eq!(keys(&c), expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    // ==================== get_or_insert_with ====================

    #[test]
    fn get_or_insert_computes_once() {
        let mut c = cache(4);
        let mut calls = 0;
        let v = *c.get_or_insert_with("x".into(), || {
            calls += 1;
            7
        });
        assert_eq!(v, 7);
        let v = *c.get_or_insert_with("x".into(), || {
            calls += 1;
            8
        });
        assert_eq!(v, 7);
        assert_eq!(calls, 1);
        let stats = c.stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }

    #[test]
    fn get_or_insert_evicts_when_full() {
        let mut c = cache(1);
        c.put("a".into(), 1);
        assert_eq!(*c.get_or_insert_with("b".into(), || 2), 2);
        assert!(!c.contains("a"));
        assert_eq!(c.stats().evictions, 1);
        assert_eq!(*c.get_or_insert_with("b".into(), || 3), 2);
        assert_eq!(c.stats().evictions, 1);
    }

    #[test]
    fn clear_resets_entries_and_stats() {
        let mut c = cache(2);
        c.put("a".into(), 1);
        c.get("a");
        c.get("b");
        c.clear();
        assert!(c.is_empty());
        assert_eq!(keys(&c), Vec::<&str>::new());
        assert_eq!(
            c.stats(),
            CacheStats {
                capacity: 2,
                ..Default::default()
            }
        );
        c.put("c".into(), 3);
        assert_eq!(c.get("c"), Some(&3));
    }
}
