//! The catalog cache: chapter list, TTL policy, and the bounded sub-caches.
//!
//! `ChapterStore` owns the in-memory catalog snapshot and orchestrates
//! refresh against the gateway. Reads are served from memory while the
//! snapshot is within its TTL; a refresh replaces the snapshot wholesale
//! and clears both query sub-caches, whose entries are keyed against the
//! previous catalog generation. Every mutation persists the store to a
//! durable JSON record so it survives process restarts.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::{CacheStorage, QueryCache, FILTER_CACHE_SIZE, SEARCH_CACHE_SIZE};
use crate::gateway::ContentGateway;
use crate::models::{Chapter, ProgressSummary};
use crate::utils::format_age;

use super::query::{self, ChapterFilter};

/// Consider the catalog stale after 24 hours.
/// The corpus changes rarely; a daily refresh keeps progress annotations
/// reasonably fresh without hammering the backend.
const CACHE_TTL_HOURS: i64 = 24;

/// Name of the durable record holding the catalog snapshot.
const CHAPTERS_RECORD: &str = "chapters";

/// Hit/miss counters for the in-memory snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// The persisted form of the store.
///
/// The two sub-caches are serialized as ordered arrays of key/value pairs;
/// a JSON map would lose the insertion order that FIFO eviction depends on.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCatalog {
    chapters: Vec<Chapter>,
    #[serde(rename = "lastFetched")]
    last_fetched: Option<DateTime<Utc>>,
    progress: ProgressSummary,
    #[serde(rename = "searchCache", default)]
    search_cache: Vec<(String, Vec<Chapter>)>,
    #[serde(rename = "filterCache", default)]
    filter_cache: Vec<(String, Vec<Chapter>)>,
}

/// The catalog cache.
pub struct ChapterStore {
    gateway: Arc<dyn ContentGateway>,
    storage: CacheStorage,

    chapters: Vec<Chapter>,
    last_fetched: Option<DateTime<Utc>>,
    progress: ProgressSummary,
    search_cache: QueryCache<Vec<Chapter>>,
    filter_cache: QueryCache<Vec<Chapter>>,

    search_query: String,
    selected_filter: ChapterFilter,

    error: Option<String>,
    loading: bool,
    refreshing: bool,
    stats: CacheStats,
}

impl ChapterStore {
    /// Create a store, rehydrating from the persisted record when one
    /// exists. A missing or corrupt record starts the store cold.
    pub fn new(gateway: Arc<dyn ContentGateway>, storage: CacheStorage) -> Self {
        let mut store = Self {
            gateway,
            storage,
            chapters: Vec::new(),
            last_fetched: None,
            progress: ProgressSummary::default(),
            search_cache: QueryCache::new(SEARCH_CACHE_SIZE),
            filter_cache: QueryCache::new(FILTER_CACHE_SIZE),
            search_query: String::new(),
            selected_filter: ChapterFilter::All,
            error: None,
            loading: false,
            refreshing: false,
            stats: CacheStats::default(),
        };

        if let Some(stored) = store.storage.load::<StoredCatalog>(CHAPTERS_RECORD) {
            debug!(chapters = stored.chapters.len(), "Rehydrated chapter cache");
            store.restore(stored);
        }
        store
    }

    /// Whether the in-memory snapshot is still within its TTL.
    /// Exactly 24 hours old counts as stale.
    pub fn is_valid(&self) -> bool {
        match self.last_fetched {
            Some(fetched) => Utc::now() - fetched < Duration::hours(CACHE_TTL_HOURS),
            None => false,
        }
    }

    /// Serve the catalog, refreshing from the gateway when the snapshot is
    /// empty, stale, or `force_refresh` is set.
    ///
    /// A failed refresh sets the error string and keeps the previous
    /// snapshot and sub-caches untouched (stale-but-available).
    pub async fn fetch_chapters(&mut self, force_refresh: bool) {
        if !force_refresh && !self.chapters.is_empty() && self.is_valid() {
            self.stats.hits += 1;
            debug!(chapters = self.chapters.len(), "Serving catalog from memory");
            return;
        }

        self.loading = true;
        self.refresh_from_gateway().await;
        self.loading = false;
    }

    /// Force a refresh under the `refreshing` flag (pull-to-refresh UX
    /// tracks this separately from the initial `loading` flag).
    pub async fn refresh_chapters(&mut self) {
        self.refreshing = true;
        self.refresh_from_gateway().await;
        self.refreshing = false;
    }

    async fn refresh_from_gateway(&mut self) {
        self.stats.misses += 1;

        // Both fetches are awaited before any state is touched; the apply
        // step below is synchronous, so an interleaved refresh can only
        // overwrite a complete snapshot, never observe a partial merge.
        let result = futures::try_join!(
            self.gateway.fetch_catalog_with_progress(),
            self.gateway.fetch_user_progress(),
        );

        match result {
            Ok((chapters, progress)) => {
                self.apply_refresh(chapters, progress);
                info!(chapters = self.chapters.len(), "Catalog refreshed");
            }
            Err(e) => {
                warn!(error = %e, "Catalog refresh failed, keeping stale snapshot");
                self.error = Some(e.to_string());
            }
        }
    }

    /// Replace the snapshot wholesale. No await points in here.
    fn apply_refresh(&mut self, mut chapters: Vec<Chapter>, progress: ProgressSummary) {
        for chapter in &mut chapters {
            chapter.is_favorite = progress.favorite_chapters.contains(&chapter.chapter_number);
        }
        self.chapters = chapters;
        self.progress = progress;
        self.last_fetched = Some(Utc::now());
        // Cached result lists are keyed against the previous catalog
        // generation and must not survive it.
        self.search_cache.clear();
        self.filter_cache.clear();
        self.error = None;
        self.persist();
    }

    /// Optimistically project a completed verse into the snapshot.
    ///
    /// Updates the in-memory counters only; recording the completion with
    /// the backend is `ProgressStore::mark_as_read`'s job, and a later full
    /// sync reconciles any divergence. Already-completed verses are a no-op.
    pub fn mark_chapter_read(&mut self, chapter_number: i32, verse_id: &str) {
        if self.progress.completed_verses.contains(verse_id) {
            debug!(verse_id, "Verse already completed, nothing to project");
            return;
        }

        if let Some(chapter) = self.chapter_mut(chapter_number) {
            chapter.completed_verses += 1;
        }
        self.progress.completed_verses.insert(verse_id.to_string());
        self.progress.total_verses_read += 1;

        self.invalidate_views();
        self.persist();
    }

    /// Flip a chapter's favorite flag and mirror it into the favorites set
    /// in the same synchronous update. Returns the new state, or `None` for
    /// an unknown chapter.
    pub fn toggle_chapter_favorite(&mut self, chapter_number: i32) -> Option<bool> {
        let chapter = self.chapter_mut(chapter_number)?;
        chapter.is_favorite = !chapter.is_favorite;
        let now_favorite = chapter.is_favorite;

        if now_favorite {
            self.progress.favorite_chapters.insert(chapter_number);
        } else {
            self.progress.favorite_chapters.remove(&chapter_number);
        }

        self.invalidate_views();
        self.persist();
        Some(now_favorite)
    }

    /// The current filtered/searched view, consulting the sub-caches before
    /// recomputing.
    ///
    /// With no search text the view is cached per filter id. With search
    /// text the search stage is cached per trimmed query and the categorical
    /// filter applied on top per call, so one cached search serves all four
    /// filters.
    pub fn filtered_chapters(&mut self) -> Vec<Chapter> {
        let query = self.search_query.trim().to_string();
        let filter = self.selected_filter;

        if query.is_empty() {
            if let Some(cached) = self.filter_cache.get(filter.as_str()) {
                return cached.clone();
            }
            let result = query::filter_chapters(&self.chapters, "", filter);
            self.filter_cache.put(filter.as_str(), result.clone());
            self.persist();
            return result;
        }

        let searched = match self.search_cache.get(&query) {
            Some(cached) => cached.clone(),
            None => {
                let searched = query::search_chapters(&self.chapters, &query);
                self.search_cache.put(&query, searched.clone());
                self.persist();
                searched
            }
        };
        searched.into_iter().filter(|c| filter.matches(c)).collect()
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.search_query = query.to_string();
    }

    pub fn set_selected_filter(&mut self, filter: ChapterFilter) {
        self.selected_filter = filter;
    }

    /// One-way sync: adopt the authoritative completed set from the
    /// progress store and recompute every chapter's completed count from it.
    pub fn sync_completed_verses(&mut self, completed: HashSet<String>) {
        self.progress.completed_verses = completed;
        self.progress.total_verses_read = self.progress.completed_verses.len() as i32;

        let counts = self.progress.completions_by_chapter();
        for chapter in &mut self.chapters {
            chapter.completed_verses =
                counts.get(&chapter.chapter_number).copied().unwrap_or(0);
        }

        self.invalidate_views();
        self.persist();
    }

    /// Drop the snapshot, both sub-caches, and the persisted record.
    pub fn clear_cache(&mut self) {
        self.chapters.clear();
        self.last_fetched = None;
        self.progress = ProgressSummary::default();
        self.search_cache.clear();
        self.filter_cache.clear();
        self.error = None;
        self.stats = CacheStats::default();

        if let Err(e) = self.storage.remove(CHAPTERS_RECORD) {
            warn!(error = %e, "Failed to remove persisted chapter cache");
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn progress(&self) -> &ProgressSummary {
        &self.progress
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn last_fetched(&self) -> Option<DateTime<Utc>> {
        self.last_fetched
    }

    pub fn search_cache(&self) -> &QueryCache<Vec<Chapter>> {
        &self.search_cache
    }

    pub fn filter_cache(&self) -> &QueryCache<Vec<Chapter>> {
        &self.filter_cache
    }

    /// Cache age for status lines, e.g. "2h ago".
    pub fn cache_age_display(&self) -> String {
        match self.last_fetched {
            Some(fetched) => format_age((Utc::now() - fetched).num_minutes()),
            None => "never".to_string(),
        }
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn chapter_mut(&mut self, chapter_number: i32) -> Option<&mut Chapter> {
        self.chapters
            .iter_mut()
            .find(|c| c.chapter_number == chapter_number)
    }

    /// Cached result lists embed chapter snapshots; after a progress
    /// mutation they would serve stale counters, so both caches are cleared
    /// and views recompute (cheap at tens of chapters).
    fn invalidate_views(&mut self) {
        self.search_cache.clear();
        self.filter_cache.clear();
    }

    fn persist(&self) {
        let stored = StoredCatalog {
            chapters: self.chapters.clone(),
            last_fetched: self.last_fetched,
            progress: self.progress.clone(),
            search_cache: self.search_cache.to_pairs(),
            filter_cache: self.filter_cache.to_pairs(),
        };
        if let Err(e) = self.storage.save(CHAPTERS_RECORD, &stored) {
            warn!(error = %e, "Failed to persist chapter cache");
        }
    }

    fn restore(&mut self, stored: StoredCatalog) {
        self.chapters = stored.chapters;
        self.last_fetched = stored.last_fetched;
        self.progress = stored.progress;
        self.search_cache = QueryCache::from_pairs(SEARCH_CACHE_SIZE, stored.search_cache);
        self.filter_cache = QueryCache::from_pairs(FILTER_CACHE_SIZE, stored.filter_cache);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockGateway};
    use tempfile::TempDir;

    fn store() -> (TempDir, ChapterStore) {
        let temp = TempDir::new().expect("temp dir");
        let storage = CacheStorage::new(temp.path().to_path_buf()).expect("storage");
        let gateway = Arc::new(MockGateway::new());
        (temp, ChapterStore::new(gateway, storage))
    }

    #[test]
    fn test_cold_store_is_invalid() {
        let (_temp, store) = store();
        assert!(!store.is_valid());
        assert!(store.chapters().is_empty());
        assert_eq!(store.cache_age_display(), "never");
    }

    #[test]
    fn test_ttl_boundary() {
        let (_temp, mut store) = store();

        store.last_fetched = Some(Utc::now() - Duration::hours(23));
        assert!(store.is_valid());

        // Exactly 24h (and anything beyond) is stale
        store.last_fetched = Some(Utc::now() - Duration::hours(24));
        assert!(!store.is_valid());

        store.last_fetched = Some(Utc::now() - Duration::hours(25));
        assert!(!store.is_valid());
    }

    #[test]
    fn test_filtered_view_populates_and_serves_cache() {
        let (_temp, mut store) = store();
        store.chapters = fixtures::gita_catalog();

        store.set_search_query("yoga");
        let first = store.filtered_chapters();
        assert_eq!(first.len(), 3);
        assert!(store.search_cache().contains_key("yoga"));

        // Mutate the catalog behind the cache's back; the cached search
        // result is served as-is until something invalidates it
        store.chapters.remove(0);
        let second = store.filtered_chapters();
        assert_eq!(second.len(), 3);
    }

    #[test]
    fn test_search_key_is_trimmed() {
        let (_temp, mut store) = store();
        store.chapters = fixtures::gita_catalog();

        store.set_search_query("  yoga  ");
        store.filtered_chapters();
        assert!(store.search_cache().contains_key("yoga"));
        assert!(!store.search_cache().contains_key("  yoga  "));
    }

    #[test]
    fn test_empty_search_uses_filter_cache() {
        let (_temp, mut store) = store();
        store.chapters = fixtures::gita_catalog();

        store.set_selected_filter(ChapterFilter::All);
        store.filtered_chapters();
        assert!(store.filter_cache().contains_key("all"));
        assert!(store.search_cache().is_empty());

        store.set_selected_filter(ChapterFilter::Favorites);
        assert!(store.filtered_chapters().is_empty());
        assert!(store.filter_cache().contains_key("favorites"));
    }

    #[test]
    fn test_one_cached_search_serves_all_filters() {
        let (_temp, mut store) = store();
        let mut chapters = fixtures::gita_catalog();
        chapters[0].completed_verses = chapters[0].verse_count;
        store.chapters = chapters;

        store.set_search_query("yoga");
        store.set_selected_filter(ChapterFilter::All);
        assert_eq!(store.filtered_chapters().len(), 3);

        store.set_selected_filter(ChapterFilter::Completed);
        let completed = store.filtered_chapters();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].chapter_number, 1);

        // Both views came out of the same cached search stage
        assert_eq!(store.search_cache().len(), 1);
    }

    #[test]
    fn test_mark_chapter_read_clears_views() {
        let (_temp, mut store) = store();
        store.chapters = fixtures::gita_catalog();

        store.filtered_chapters();
        assert!(!store.filter_cache().is_empty());

        store.mark_chapter_read(1, "1.1");
        assert!(store.filter_cache().is_empty());
        assert!(store.search_cache().is_empty());
        assert_eq!(store.chapters()[0].completed_verses, 1);
    }

    #[test]
    fn test_toggle_favorite_unknown_chapter() {
        let (_temp, mut store) = store();
        store.chapters = fixtures::gita_catalog();
        assert_eq!(store.toggle_chapter_favorite(99), None);
        assert!(store.progress().favorite_chapters.is_empty());
    }

    #[test]
    fn test_toggle_favorite_is_atomic_both_ways() {
        let (_temp, mut store) = store();
        store.chapters = fixtures::gita_catalog();

        assert_eq!(store.toggle_chapter_favorite(2), Some(true));
        assert!(store.chapters()[1].is_favorite);
        assert!(store.progress().favorite_chapters.contains(&2));

        assert_eq!(store.toggle_chapter_favorite(2), Some(false));
        assert!(!store.chapters()[1].is_favorite);
        assert!(!store.progress().favorite_chapters.contains(&2));
    }
}
