//! Cache Module
//!
//! Provides an in-memory LRU cache populated on demand by an async
//! retrieval function.

mod lru;
mod queue;
mod stats;


// Re-export public types
pub use lru::{LruCache, RetrievalFuture};
pub use queue::{Iter, NodeId, Queue};
pub use stats::CacheStats;
