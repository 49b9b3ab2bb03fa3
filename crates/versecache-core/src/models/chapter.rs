use serde::{Deserialize, Serialize};

/// A chapter of the catalog with its merged progress projection.
///
/// The catalog fields come from the content service and are replaced
/// wholesale on refresh. `completed_verses` and `is_favorite` are the
/// locally-merged progress view; they are recomputed from the user's
/// completion set on every full sync and bumped optimistically in between.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(rename = "chapterNumber")]
    pub chapter_number: i32,
    pub name: String,
    #[serde(rename = "nameSanskrit")]
    pub name_sanskrit: String,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(rename = "verseCount")]
    pub verse_count: i32,
    #[serde(rename = "completedVerses", default)]
    pub completed_verses: i32,
    #[serde(rename = "isFavorite", default)]
    pub is_favorite: bool,
}

impl Chapter {
    /// A chapter is completed once every verse has been read.
    /// The count may transiently overshoot between an optimistic update
    /// and the next reconciliation, so this checks `>=` rather than `==`.
    pub fn is_completed(&self) -> bool {
        self.verse_count > 0 && self.completed_verses >= self.verse_count
    }

    pub fn is_in_progress(&self) -> bool {
        self.completed_verses > 0 && !self.is_completed()
    }

    pub fn progress_percent(&self) -> i32 {
        if self.verse_count == 0 {
            return 0;
        }
        let completed = self.completed_verses.min(self.verse_count);
        ((completed as f32 / self.verse_count as f32) * 100.0) as i32
    }

    /// Short progress label for list displays, e.g. "12/47".
    pub fn progress_display(&self) -> String {
        format!("{}/{}", self.completed_verses, self.verse_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(verse_count: i32, completed_verses: i32) -> Chapter {
        Chapter {
            chapter_number: 1,
            name: "Arjuna Vishada Yoga".to_string(),
            name_sanskrit: "अर्जुनविषादयोग".to_string(),
            theme: Some("Arjuna's Dilemma".to_string()),
            verse_count,
            completed_verses,
            is_favorite: false,
        }
    }

    #[test]
    fn test_completion_states() {
        assert!(!chapter(47, 0).is_completed());
        assert!(!chapter(47, 0).is_in_progress());

        assert!(chapter(47, 12).is_in_progress());
        assert!(!chapter(47, 12).is_completed());

        assert!(chapter(47, 47).is_completed());
        assert!(!chapter(47, 47).is_in_progress());

        // Optimistic overshoot still counts as completed
        assert!(chapter(47, 48).is_completed());
        assert!(!chapter(47, 48).is_in_progress());
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(chapter(47, 0).progress_percent(), 0);
        assert_eq!(chapter(10, 5).progress_percent(), 50);
        assert_eq!(chapter(47, 47).progress_percent(), 100);
        assert_eq!(chapter(47, 48).progress_percent(), 100); // clamped
        assert_eq!(chapter(0, 0).progress_percent(), 0);
    }

    #[test]
    fn test_deserialize_wire_format() {
        let json = r#"{
            "chapterNumber": 2,
            "name": "Sankhya Yoga",
            "nameSanskrit": "सांख्ययोग",
            "theme": "Transcendental Knowledge",
            "verseCount": 72,
            "completedVerses": 3
        }"#;

        let chapter: Chapter = serde_json::from_str(json).expect("parse chapter");
        assert_eq!(chapter.chapter_number, 2);
        assert_eq!(chapter.verse_count, 72);
        assert_eq!(chapter.completed_verses, 3);
        // Not present in the payload, defaults to false
        assert!(!chapter.is_favorite);
    }
}
