//! Search and filter over the chapter catalog.
//!
//! Pure functions: a deterministic view of a catalog snapshot given the
//! two UI-controlled parameters (search text and the selected filter).
//! Catalog order is preserved; nothing here re-sorts.

use serde::{Deserialize, Serialize};

use crate::models::Chapter;
use crate::utils::contains_ignore_case;

/// The categorical chapter filter. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChapterFilter {
    #[default]
    All,
    InProgress,
    Completed,
    Favorites,
}

impl ChapterFilter {
    /// Stable id, used as the filter-cache key and on the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChapterFilter::All => "all",
            ChapterFilter::InProgress => "in-progress",
            ChapterFilter::Completed => "completed",
            ChapterFilter::Favorites => "favorites",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "all" => Some(ChapterFilter::All),
            "in-progress" => Some(ChapterFilter::InProgress),
            "completed" => Some(ChapterFilter::Completed),
            "favorites" => Some(ChapterFilter::Favorites),
            _ => None,
        }
    }

    pub fn matches(&self, chapter: &Chapter) -> bool {
        match self {
            ChapterFilter::All => true,
            ChapterFilter::InProgress => chapter.is_in_progress(),
            ChapterFilter::Completed => chapter.is_completed(),
            ChapterFilter::Favorites => chapter.is_favorite,
        }
    }
}

/// Retain chapters whose English title, Sanskrit title, or theme contains
/// the query (case-insensitive, OR across the three fields). A blank or
/// whitespace-only query matches everything.
pub fn search_chapters(chapters: &[Chapter], search_query: &str) -> Vec<Chapter> {
    let query = search_query.trim();
    if query.is_empty() {
        return chapters.to_vec();
    }
    chapters
        .iter()
        .filter(|c| matches_search(c, query))
        .cloned()
        .collect()
}

/// The full query pipeline: search stage, then one categorical filter.
pub fn filter_chapters(
    chapters: &[Chapter],
    search_query: &str,
    filter: ChapterFilter,
) -> Vec<Chapter> {
    search_chapters(chapters, search_query)
        .into_iter()
        .filter(|c| filter.matches(c))
        .collect()
}

fn matches_search(chapter: &Chapter, query: &str) -> bool {
    contains_ignore_case(&chapter.name, query)
        || contains_ignore_case(&chapter.name_sanskrit, query)
        || chapter
            .theme
            .as_deref()
            .map_or(false, |theme| contains_ignore_case(theme, query))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Chapter> {
        vec![
            Chapter {
                chapter_number: 1,
                name: "Arjuna Vishada Yoga".to_string(),
                name_sanskrit: "अर्जुनविषादयोग".to_string(),
                theme: Some("Arjuna's Dilemma".to_string()),
                verse_count: 10,
                completed_verses: 10,
                is_favorite: false,
            },
            Chapter {
                chapter_number: 2,
                name: "Sankhya Yoga".to_string(),
                name_sanskrit: "सांख्ययोग".to_string(),
                theme: Some("Transcendental Knowledge".to_string()),
                verse_count: 5,
                completed_verses: 0,
                is_favorite: true,
            },
            Chapter {
                chapter_number: 3,
                name: "Karma Yoga".to_string(),
                name_sanskrit: "कर्मयोग".to_string(),
                theme: Some("Path of Action".to_string()),
                verse_count: 43,
                completed_verses: 7,
                is_favorite: false,
            },
        ]
    }

    #[test]
    fn test_all_filter_preserves_everything_in_order() {
        let chapters = catalog();
        let result = filter_chapters(&chapters, "", ChapterFilter::All);
        assert_eq!(result.len(), 3);
        let numbers: Vec<i32> = result.iter().map(|c| c.chapter_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_completed_filter() {
        // Chapter 1 has read all 10 of 10; chapter 2 none of 5
        let result = filter_chapters(&catalog(), "", ChapterFilter::Completed);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].chapter_number, 1);
    }

    #[test]
    fn test_in_progress_filter() {
        let result = filter_chapters(&catalog(), "", ChapterFilter::InProgress);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].chapter_number, 3);

        // With only finished and untouched chapters, nothing is in progress
        let two = &catalog()[..2];
        assert!(filter_chapters(two, "", ChapterFilter::InProgress).is_empty());
    }

    #[test]
    fn test_favorites_filter() {
        let result = filter_chapters(&catalog(), "", ChapterFilter::Favorites);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].chapter_number, 2);
    }

    #[test]
    fn test_search_matches_any_of_three_fields() {
        let chapters = catalog();

        // English title
        let by_name = search_chapters(&chapters, "arjuna");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].chapter_number, 1);

        // Sanskrit title
        let by_sanskrit = search_chapters(&chapters, "सांख्य");
        assert_eq!(by_sanskrit.len(), 1);
        assert_eq!(by_sanskrit[0].chapter_number, 2);

        // Theme
        let by_theme = search_chapters(&chapters, "action");
        assert_eq!(by_theme.len(), 1);
        assert_eq!(by_theme[0].chapter_number, 3);

        // "yoga" appears in every English title
        assert_eq!(search_chapters(&chapters, "YOGA").len(), 3);
    }

    #[test]
    fn test_search_trims_whitespace() {
        let chapters = catalog();
        assert_eq!(search_chapters(&chapters, "  arjuna  ").len(), 1);
        assert_eq!(search_chapters(&chapters, "   ").len(), 3);
    }

    #[test]
    fn test_search_composes_with_filter() {
        let chapters = catalog();
        // "yoga" matches all three, then Completed narrows to chapter 1
        let result = filter_chapters(&chapters, "yoga", ChapterFilter::Completed);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].chapter_number, 1);

        let none = filter_chapters(&chapters, "arjuna", ChapterFilter::Favorites);
        assert!(none.is_empty());
    }

    #[test]
    fn test_filter_ids_round_trip() {
        for filter in [
            ChapterFilter::All,
            ChapterFilter::InProgress,
            ChapterFilter::Completed,
            ChapterFilter::Favorites,
        ] {
            assert_eq!(ChapterFilter::from_str(filter.as_str()), Some(filter));
        }
        assert_eq!(ChapterFilter::from_str("recent"), None);
    }
}
