//! Local caching - bounded query-result caches and durable JSON records.
//!
//! This module provides:
//! - `QueryCache`: a fixed-capacity key/value map with strict FIFO eviction,
//!   used for search results and filter results
//! - `CacheStorage`: named JSON records under the app cache directory,
//!   written atomically so readers never see a half-written file

pub mod query_cache;
pub mod storage;

pub use query_cache::{QueryCache, FILTER_CACHE_SIZE, SEARCH_CACHE_SIZE};
pub use storage::CacheStorage;
