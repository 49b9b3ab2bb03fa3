//! Data models for the reading catalog and user progress.
//!
//! This module contains the data structures shared by the gateway,
//! the stores, and the persisted cache records:
//!
//! - `Chapter`: a catalog entry with its merged progress projection
//! - `Verse`: an individual reading item, addressed as `"chapter.verse"`
//! - `ProgressSummary`: streaks, totals, and the completed/favorite sets

pub mod chapter;
pub mod progress;
pub mod verse;

pub use chapter::Chapter;
pub use progress::ProgressSummary;
pub use verse::Verse;
