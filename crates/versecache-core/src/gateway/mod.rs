//! Remote content gateway for the reading service.
//!
//! The backend is the source of truth for the chapter catalog, verse text,
//! and recorded completions. Everything local is a cache over it. The
//! gateway is a trait so stores can be driven by the HTTP client in the
//! app and by `testing::MockGateway` in tests.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Chapter, ProgressSummary, Verse};

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::GatewayError;

#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// Fetch the full chapter catalog, each entry annotated with the
    /// user's completed-verse count.
    async fn fetch_catalog_with_progress(&self) -> Result<Vec<Chapter>>;

    /// Fetch the user's progress snapshot (streaks, completed set, favorites).
    async fn fetch_user_progress(&self) -> Result<ProgressSummary>;

    /// Persist a verse completion. Local progress must not be updated
    /// unless this succeeds.
    async fn record_completion(&self, verse_id: &str, time_spent_seconds: i64) -> Result<()>;

    /// Fetch all verses of a chapter. Paginated upstream; implementations
    /// return the complete chapter.
    async fn fetch_verses(&self, chapter_number: i32) -> Result<Vec<Verse>>;
}
