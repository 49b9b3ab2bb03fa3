//! The stores that sit between the UI and the gateway.
//!
//! - `ChapterStore`: the catalog cache (TTL, bounded sub-caches,
//!   optimistic projection, persistence)
//! - `ProgressStore`: gateway-gated completion recording and streaks
//! - `query`: the pure search/filter engine over a catalog snapshot

pub mod chapters;
pub mod progress;
pub mod query;

pub use chapters::{CacheStats, ChapterStore};
pub use progress::ProgressStore;
pub use query::{filter_chapters, search_chapters, ChapterFilter};
