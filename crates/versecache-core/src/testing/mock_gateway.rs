//! Mock content gateway for testing.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::gateway::{ContentGateway, GatewayError};
use crate::models::{Chapter, ProgressSummary, Verse};

/// A recorded completion call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCompletion {
    pub verse_id: String,
    pub time_spent_seconds: i64,
}

/// Mock implementation of the `ContentGateway` trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable catalog, progress, and verse data
/// - Track completion calls for assertions
/// - Fail the next gateway call with an injected error (consumed once)
pub struct MockGateway {
    chapters: Arc<RwLock<Vec<Chapter>>>,
    progress: Arc<RwLock<ProgressSummary>>,
    verses: Arc<RwLock<HashMap<i32, Vec<Verse>>>>,
    completions: Arc<RwLock<Vec<RecordedCompletion>>>,
    /// If set, the next gateway call fails with this error.
    next_error: Arc<RwLock<Option<GatewayError>>>,
    catalog_fetches: Arc<RwLock<u32>>,
    progress_fetches: Arc<RwLock<u32>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            chapters: Arc::new(RwLock::new(Vec::new())),
            progress: Arc::new(RwLock::new(ProgressSummary::default())),
            verses: Arc::new(RwLock::new(HashMap::new())),
            completions: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            catalog_fetches: Arc::new(RwLock::new(0)),
            progress_fetches: Arc::new(RwLock::new(0)),
        }
    }

    /// Set the catalog to return for subsequent fetches.
    pub async fn set_chapters(&self, chapters: Vec<Chapter>) {
        *self.chapters.write().await = chapters;
    }

    /// Set the progress summary to return for subsequent fetches.
    pub async fn set_progress(&self, progress: ProgressSummary) {
        *self.progress.write().await = progress;
    }

    /// Set the verses to return for a chapter.
    pub async fn set_verses(&self, chapter_number: i32, verses: Vec<Verse>) {
        self.verses.write().await.insert(chapter_number, verses);
    }

    /// Configure the next gateway call to fail with the given error.
    pub async fn set_next_error(&self, error: GatewayError) {
        *self.next_error.write().await = Some(error);
    }

    /// Get recorded completion calls.
    pub async fn recorded_completions(&self) -> Vec<RecordedCompletion> {
        self.completions.read().await.clone()
    }

    /// Number of completion calls recorded.
    pub async fn completion_count(&self) -> usize {
        self.completions.read().await.len()
    }

    /// Number of catalog fetches served.
    pub async fn catalog_fetch_count(&self) -> u32 {
        *self.catalog_fetches.read().await
    }

    /// Number of progress fetches served.
    pub async fn progress_fetch_count(&self) -> u32 {
        *self.progress_fetches.read().await
    }

    /// Take the next error if set.
    async fn take_error(&self) -> Option<GatewayError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl ContentGateway for MockGateway {
    async fn fetch_catalog_with_progress(&self) -> Result<Vec<Chapter>> {
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        *self.catalog_fetches.write().await += 1;
        Ok(self.chapters.read().await.clone())
    }

    async fn fetch_user_progress(&self) -> Result<ProgressSummary> {
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        *self.progress_fetches.write().await += 1;
        Ok(self.progress.read().await.clone())
    }

    async fn record_completion(&self, verse_id: &str, time_spent_seconds: i64) -> Result<()> {
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        self.completions.write().await.push(RecordedCompletion {
            verse_id: verse_id.to_string(),
            time_spent_seconds,
        });
        Ok(())
    }

    async fn fetch_verses(&self, chapter_number: i32) -> Result<Vec<Verse>> {
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        Ok(self
            .verses
            .read()
            .await
            .get(&chapter_number)
            .cloned()
            .unwrap_or_default())
    }
}
