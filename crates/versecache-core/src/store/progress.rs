//! The progress store: gateway-gated completion recording.
//!
//! Unlike the chapter store's optimistic projection, `mark_as_read` talks
//! to the backend first and only mutates local state once the completion
//! is persisted remotely. A gateway failure propagates to the caller and
//! leaves the summary untouched, so the local view never claims a
//! completion the backend rejected. The chapter store is brought back in
//! line afterwards via `ChapterStore::sync_completed_verses`.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use tracing::{debug, warn};

use crate::cache::CacheStorage;
use crate::gateway::ContentGateway;
use crate::models::ProgressSummary;
use crate::ports::{HapticPort, NoopHaptics, NoopNotifications, NotificationPort};

/// Name of the durable record holding the progress summary.
const PROGRESS_RECORD: &str = "progress";

/// The progress reconciliation store.
pub struct ProgressStore {
    gateway: Arc<dyn ContentGateway>,
    storage: CacheStorage,
    summary: ProgressSummary,
    haptics: Arc<dyn HapticPort>,
    notifications: Arc<dyn NotificationPort>,
}

impl ProgressStore {
    /// Create a store with no-op feedback ports, rehydrating the summary
    /// from its persisted record when one exists.
    pub fn new(gateway: Arc<dyn ContentGateway>, storage: CacheStorage) -> Self {
        let mut store = Self {
            gateway,
            storage,
            summary: ProgressSummary::default(),
            haptics: Arc::new(NoopHaptics),
            notifications: Arc::new(NoopNotifications),
        };

        if let Some(summary) = store.storage.load::<ProgressSummary>(PROGRESS_RECORD) {
            debug!(
                completed = summary.completed_verses.len(),
                streak = summary.current_streak,
                "Rehydrated progress summary"
            );
            store.summary = summary;
        }
        store
    }

    /// Inject device feedback ports.
    pub fn with_ports(
        mut self,
        haptics: Arc<dyn HapticPort>,
        notifications: Arc<dyn NotificationPort>,
    ) -> Self {
        self.haptics = haptics;
        self.notifications = notifications;
        self
    }

    /// Record a verse completion against today's date.
    ///
    /// Returns `Ok(true)` when a new completion was recorded, `Ok(false)`
    /// when the verse was already completed (no gateway call, no mutation),
    /// and an error when the backend rejected the completion - in which
    /// case local state is untouched.
    pub async fn mark_as_read(&mut self, verse_id: &str, time_spent_seconds: i64) -> Result<bool> {
        self.mark_as_read_on(verse_id, time_spent_seconds, Utc::now().date_naive())
            .await
    }

    /// `mark_as_read` with the current date passed explicitly.
    pub async fn mark_as_read_on(
        &mut self,
        verse_id: &str,
        time_spent_seconds: i64,
        today: NaiveDate,
    ) -> Result<bool> {
        if self.summary.completed_verses.contains(verse_id) {
            debug!(verse_id, "Verse already completed, skipping");
            return Ok(false);
        }

        // Backend first: local state must not get ahead of a completion
        // the server may reject.
        if let Err(e) = self.gateway.record_completion(verse_id, time_spent_seconds).await {
            self.haptics.error();
            return Err(e.context(format!("Failed to record completion for {}", verse_id)));
        }

        let previous_longest = self.summary.longest_streak;
        self.summary
            .record_completion(verse_id, time_spent_seconds, today);

        if self.summary.longest_streak > previous_longest && self.summary.longest_streak > 1 {
            self.notifications.notify(
                "New longest streak",
                &format!("{} days of reading in a row", self.summary.longest_streak),
            );
        }

        self.haptics.success();
        self.persist();
        Ok(true)
    }

    /// Replace the summary with the backend's authoritative snapshot.
    pub async fn sync_remote(&mut self) -> Result<()> {
        let summary = self
            .gateway
            .fetch_user_progress()
            .await
            .context("Failed to fetch progress snapshot")?;

        debug!(
            completed = summary.completed_verses.len(),
            "Adopted remote progress snapshot"
        );
        self.summary = summary;
        self.persist();
        Ok(())
    }

    /// Mirror a favorite state decided elsewhere (the chapter store owns
    /// the toggle) into this store's bookkeeping.
    pub fn set_favorite(&mut self, chapter_number: i32, favorite: bool) {
        let changed = if favorite {
            self.summary.favorite_chapters.insert(chapter_number)
        } else {
            self.summary.favorite_chapters.remove(&chapter_number)
        };
        if changed {
            self.persist();
        }
    }

    pub fn summary(&self) -> &ProgressSummary {
        &self.summary
    }

    pub fn completed_verses(&self) -> &HashSet<String> {
        &self.summary.completed_verses
    }

    fn persist(&self) {
        if let Err(e) = self.storage.save(PROGRESS_RECORD, &self.summary) {
            warn!(error = %e, "Failed to persist progress summary");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
