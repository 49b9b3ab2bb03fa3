use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Verse;

/// The user's reading progress: streaks, totals, and the authoritative
/// completed-verse and favorite-chapter sets.
///
/// `current_streak <= longest_streak` holds after every mutation, and
/// `total_verses_read` matches `completed_verses.len()` after any full
/// reconciliation (optimistic updates may let it diverge briefly).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgressSummary {
    #[serde(rename = "currentStreak")]
    pub current_streak: i32,
    #[serde(rename = "longestStreak")]
    pub longest_streak: i32,
    #[serde(rename = "totalVersesRead")]
    pub total_verses_read: i32,
    #[serde(rename = "totalSeconds")]
    pub total_seconds: i64,
    #[serde(rename = "lastReadDate")]
    pub last_read_date: Option<NaiveDate>,
    #[serde(rename = "completedVerses", default)]
    pub completed_verses: HashSet<String>,
    #[serde(rename = "favoriteChapters", default)]
    pub favorite_chapters: HashSet<i32>,
}

impl ProgressSummary {
    /// Record a completed verse and update streaks and totals.
    ///
    /// Returns `false` without touching anything when the verse is already
    /// in the completed set - completion is idempotent per verse.
    ///
    /// Streak rules relative to `last_read_date`:
    /// - no previous date: streak becomes 1
    /// - exactly one day later: streak increments
    /// - more than one day later: streak resets to 1
    /// - same day: streak unchanged
    /// - earlier day (clock moved backwards): treated like same day,
    ///   and `last_read_date` keeps the later date
    pub fn record_completion(
        &mut self,
        verse_id: &str,
        time_spent_seconds: i64,
        today: NaiveDate,
    ) -> bool {
        if self.completed_verses.contains(verse_id) {
            return false;
        }

        match self.last_read_date {
            None => self.current_streak = 1,
            Some(last) => {
                let days = (today - last).num_days();
                if days == 1 {
                    self.current_streak += 1;
                } else if days > 1 {
                    self.current_streak = 1;
                }
            }
        }
        self.longest_streak = self.longest_streak.max(self.current_streak);

        if self.last_read_date.map_or(true, |last| today >= last) {
            self.last_read_date = Some(today);
        }

        self.completed_verses.insert(verse_id.to_string());
        self.total_verses_read += 1;
        self.total_seconds += time_spent_seconds;
        true
    }

    /// Count how many verses of the given chapter are in the completed set.
    pub fn completed_in_chapter(&self, chapter_number: i32) -> i32 {
        self.completed_verses
            .iter()
            .filter(|id| Verse::chapter_of(id) == Some(chapter_number))
            .count() as i32
    }

    /// Group the completed set into per-chapter counts.
    /// Malformed ids are skipped; the set is backend-supplied.
    pub fn completions_by_chapter(&self) -> HashMap<i32, i32> {
        let mut counts = HashMap::new();
        for id in &self.completed_verses {
            match Verse::chapter_of(id) {
                Some(chapter) => *counts.entry(chapter).or_insert(0) += 1,
                None => debug!(verse_id = %id, "Skipping malformed verse id"),
            }
        }
        counts
    }
}
