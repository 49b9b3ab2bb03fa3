use serde::{Deserialize, Serialize};

/// A single verse within a chapter.
///
/// Verse ids are strings of the form `"<chapter>.<verse>"` (e.g. `"2.47"`).
/// The completed-verse set stores these ids, so a chapter's completed count
/// can be recomputed locally by parsing the prefix before the dot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verse {
    pub id: String,
    #[serde(rename = "chapterNumber")]
    pub chapter_number: i32,
    #[serde(rename = "verseNumber")]
    pub verse_number: i32,
    #[serde(rename = "textSanskrit")]
    pub text_sanskrit: String,
    #[serde(default)]
    pub transliteration: Option<String>,
    pub translation: String,
}

impl Verse {
    /// Build the canonical verse id for a chapter/verse pair.
    pub fn make_id(chapter_number: i32, verse_number: i32) -> String {
        format!("{}.{}", chapter_number, verse_number)
    }

    /// Parse the owning chapter number out of a verse id.
    /// Returns `None` for ids that don't follow the `"chapter.verse"` form.
    pub fn chapter_of(verse_id: &str) -> Option<i32> {
        verse_id
            .split_once('.')
            .and_then(|(chapter, _)| chapter.parse().ok())
    }

    pub fn display_ref(&self) -> String {
        format!("{}.{}", self.chapter_number, self.verse_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_id() {
        assert_eq!(Verse::make_id(2, 47), "2.47");
        assert_eq!(Verse::make_id(18, 1), "18.1");
    }

    #[test]
    fn test_chapter_of() {
        assert_eq!(Verse::chapter_of("2.47"), Some(2));
        assert_eq!(Verse::chapter_of("18.78"), Some(18));

        // Malformed ids are skipped, not errors
        assert_eq!(Verse::chapter_of("247"), None);
        assert_eq!(Verse::chapter_of("x.1"), None);
        assert_eq!(Verse::chapter_of(""), None);
    }

    #[test]
    fn test_deserialize_wire_format() {
        let json = r#"{
            "id": "2.47",
            "chapterNumber": 2,
            "verseNumber": 47,
            "textSanskrit": "कर्मण्येवाधिकारस्ते मा फलेषु कदाचन",
            "transliteration": "karmany evadhikaras te ma phalesu kadacana",
            "translation": "You have a right to perform your duty, but not to the fruits of action."
        }"#;

        let verse: Verse = serde_json::from_str(json).expect("parse verse");
        assert_eq!(verse.id, "2.47");
        assert_eq!(Verse::chapter_of(&verse.id), Some(verse.chapter_number));
    }
}
