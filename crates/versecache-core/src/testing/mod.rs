//! Testing utilities: a mock gateway and recording feedback ports.
//!
//! `MockGateway` implements `ContentGateway` with configurable responses,
//! recorded completion calls, and one-shot injectable errors, so the stores
//! can be driven without a backend. `RecordingHaptics` counts feedback taps
//! for assertions.

mod mock_gateway;

pub use mock_gateway::{MockGateway, RecordedCompletion};

use std::sync::atomic::{AtomicU32, Ordering};

use crate::ports::HapticPort;

/// Counts haptic taps instead of vibrating anything.
#[derive(Debug, Default)]
pub struct RecordingHaptics {
    successes: AtomicU32,
    errors: AtomicU32,
}

impl RecordingHaptics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> u32 {
        self.successes.load(Ordering::SeqCst)
    }

    pub fn error_count(&self) -> u32 {
        self.errors.load(Ordering::SeqCst)
    }
}

impl HapticPort for RecordingHaptics {
    fn success(&self) {
        self.successes.fetch_add(1, Ordering::SeqCst);
    }

    fn error(&self) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }
}

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::models::{Chapter, Verse};

    /// Create a test chapter with the given progress counters.
    pub fn chapter(chapter_number: i32, name: &str, verse_count: i32, completed_verses: i32) -> Chapter {
        Chapter {
            chapter_number,
            name: name.to_string(),
            name_sanskrit: format!("अध्याय {}", chapter_number),
            theme: None,
            verse_count,
            completed_verses,
            is_favorite: false,
        }
    }

    /// The opening chapters of the catalog with their real titles,
    /// convenient for search tests.
    pub fn gita_catalog() -> Vec<Chapter> {
        vec![
            Chapter {
                chapter_number: 1,
                name: "Arjuna Vishada Yoga".to_string(),
                name_sanskrit: "अर्जुनविषादयोग".to_string(),
                theme: Some("Arjuna's Dilemma".to_string()),
                verse_count: 47,
                completed_verses: 0,
                is_favorite: false,
            },
            Chapter {
                chapter_number: 2,
                name: "Sankhya Yoga".to_string(),
                name_sanskrit: "सांख्ययोग".to_string(),
                theme: Some("Transcendental Knowledge".to_string()),
                verse_count: 72,
                completed_verses: 0,
                is_favorite: false,
            },
            Chapter {
                chapter_number: 3,
                name: "Karma Yoga".to_string(),
                name_sanskrit: "कर्मयोग".to_string(),
                theme: Some("Path of Action".to_string()),
                verse_count: 43,
                completed_verses: 0,
                is_favorite: false,
            },
        ]
    }

    /// Create a test verse with placeholder text.
    pub fn verse(chapter_number: i32, verse_number: i32) -> Verse {
        Verse {
            id: Verse::make_id(chapter_number, verse_number),
            chapter_number,
            verse_number,
            text_sanskrit: "श्लोक".to_string(),
            transliteration: None,
            translation: format!("Verse {}.{}", chapter_number, verse_number),
        }
    }
}
