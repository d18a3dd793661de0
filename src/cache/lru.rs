//! LRU Cache Module
//!
//! Least recently used cache populated on demand by an asynchronous
//! retrieval function.
//!
//! `get` has a single await point: the retrieval future of a miss. The state
//! lock is only held around the synchronous map and queue updates, so a hit
//! never suspends and another task may run between the miss and the write
//! back.
//!
//! Concurrent misses on the same key are not coalesced: every caller that
//! observed the miss computes its own value. After the retrieval resolves the
//! cache is checked again and, if another caller already stored the key, the
//! late value is returned to its caller but NOT written. Two callers racing on
//! one key can therefore see different values while only the first one to
//! finish is cached.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::pin::Pin;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{CacheStats, NodeId, Queue};

/// Boxed future produced by a retrieval function.
pub type RetrievalFuture<V, E> = Pin<Box<dyn Future<Output = Result<V, E>> + Send>>;

type Retrieval<K, V, E> = Box<dyn Fn(K) -> RetrievalFuture<V, E> + Send + Sync>;

// == Cache Entry ==
#[derive(Debug)]
struct Entry<V> {
    value: V,
    /// Handle of the key's node in the recency queue
    node: NodeId,
}

// == Cache State ==
/// Mutable part of the cache, guarded by a single lock.
#[derive(Debug)]
struct CacheState<K, V> {
    entries: HashMap<K, Entry<V>>,
    queue: Queue<K>,
    stats: CacheStats,
}

impl<K, V> CacheState<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone,
{
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            queue: Queue::with_capacity(capacity),
            stats: CacheStats::new(),
        }
    }

    /// Returns the cached value and marks the key as most recently used.
    fn lookup(&mut self, key: &K) -> Option<V> {
        match self.entries.get(key) {
            Some(entry) => {
                self.queue.move_to_tail(entry.node);
                self.stats.record_hit();
                Some(entry.value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Stores a retrieved value unless the key was cached in the meantime.
    ///
    /// Returns false when an existing entry was kept instead.
    fn insert_if_absent(&mut self, key: K, value: V, capacity: usize) -> bool {
        if let Some(entry) = self.entries.get(&key) {
            self.queue.move_to_tail(entry.node);
            self.stats.record_discarded();
            return false;
        }

        if self.entries.len() >= capacity {
            self.evict_oldest();
        }

        let node = self.queue.enqueue(key.clone());
        self.entries.insert(key, Entry { value, node });
        self.stats.set_total_entries(self.entries.len());
        true
    }

    /// Drops the least recently used entry.
    ///
    /// The queue holds exactly the cached keys, so it cannot be empty while
    /// the cache is full.
    fn evict_oldest(&mut self) {
        let oldest = self.queue.dequeue();
        debug_assert!(
            oldest.is_ok(),
            "recency queue out of sync with entries: {:?}",
            oldest
        );

        if let Ok(key) = oldest {
            debug!(?key, "Evicting least recently used key");
            self.entries.remove(&key);
            self.stats.record_eviction();
        }
    }
}

// == LRU Cache ==
/// Fixed capacity LRU cache that fills itself through a retrieval function.
pub struct LruCache<K, V, E> {
    /// Maximum number of entries
    capacity: NonZeroUsize,
    state: Mutex<CacheState<K, V>>,
    /// Called once per miss to compute the value of a key
    retrieval: Retrieval<K, V, E>,
}

impl<K, V, E> LruCache<K, V, E>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone,
{
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries
    /// * `retrieval` - Async function computing the value of a missing key
    pub fn new<F, Fut>(capacity: NonZeroUsize, retrieval: F) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        K: 'static,
        V: 'static,
        E: 'static,
    {
        Self {
            capacity,
            state: Mutex::new(CacheState::with_capacity(capacity.get())),
            retrieval: boxed(retrieval),
        }
    }

    // == Get ==
    /// Returns the value of `key`, retrieving and caching it on a miss.
    ///
    /// Errors from the retrieval function are returned unchanged and leave the
    /// cache as it was.
    pub async fn get(&self, key: K) -> Result<V, E> {
        let cached = self.state.lock().lookup(&key);
        if let Some(value) = cached {
            debug!(?key, "Cache hit");
            return Ok(value);
        }

        debug!(?key, "Cache miss");
        let value = (self.retrieval)(key.clone()).await?;

        let stored = self
            .state
            .lock()
            .insert_if_absent(key, value.clone(), self.capacity.get());
        if !stored {
            debug!("Key was cached by a concurrent lookup, keeping the existing entry");
        }

        Ok(value)
    }

    // == Replace Retrieval ==
    /// Swaps the retrieval function used for future misses.
    pub fn replace_retrieval<F, Fut>(&mut self, retrieval: F)
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        K: 'static,
        V: 'static,
        E: 'static,
    {
        self.retrieval = boxed(retrieval);
    }

    // == Size ==
    /// Returns the current number of entries.
    pub fn size(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Checks whether `key` is cached without touching its recency.
    pub fn contains(&self, key: &K) -> bool {
        self.state.lock().entries.contains_key(key)
    }

    /// Returns the cached keys from least to most recently used.
    pub fn keys(&self) -> Vec<K> {
        self.state.lock().queue.iter().cloned().collect()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.entries.len());
        stats
    }
}

impl<K, V, E> fmt::Debug for LruCache<K, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("size", &self.state.lock().entries.len())
            .finish_non_exhaustive()
    }
}

fn boxed<K, V, E, F, Fut>(retrieval: F) -> Retrieval<K, V, E>
where
    F: Fn(K) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
    K: 'static,
    V: 'static,
    E: 'static,
{
    Box::new(move |key: K| Box::pin(retrieval(key)) as RetrievalFuture<V, E>)
}
