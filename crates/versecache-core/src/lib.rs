//! versecache-core - offline-first client library for a daily Gita reading
//! service.
//!
//! The backend is the source of truth; everything here is a layered cache
//! over it:
//!
//! - `gateway`: the `ContentGateway` trait and the HTTP `ApiClient`
//! - `store::ChapterStore`: the catalog cache - 24h TTL, bounded search and
//!   filter sub-caches, optimistic progress projection, durable persistence
//! - `store::ProgressStore`: gateway-gated completion recording with streak
//!   tracking, reconciled into the chapter store via a one-way sync
//! - `cache`: the FIFO-bounded `QueryCache` and atomic JSON `CacheStorage`
//! - `testing`: a configurable `MockGateway` for driving the stores headless

pub mod cache;
pub mod config;
pub mod gateway;
pub mod models;
pub mod ports;
pub mod store;
pub mod testing;
pub mod utils;

pub use cache::{CacheStorage, QueryCache};
pub use config::Config;
pub use gateway::{ApiClient, ContentGateway, GatewayError};
pub use models::{Chapter, ProgressSummary, Verse};
pub use ports::{HapticPort, NoopHaptics, NoopNotifications, NotificationPort};
pub use store::{ChapterFilter, ChapterStore, ProgressStore};
