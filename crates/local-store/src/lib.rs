//! Persistence for dirscope sessions.
//!
//! Everything here sits on top of the [`KeyValueStore`] abstraction: one key
//! holds the list of known session names, one key per session holds that
//! session's serialized result cache. The store implementation (file-backed,
//! in-memory) is interchangeable.

pub mod cache;
pub mod kv;
pub mod registry;

pub use cache::CacheMap;
pub use kv::{FileStore, KeyValueStore, MemoryStore, StoreError};
