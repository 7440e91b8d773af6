// ── Event classification ──
//
// Maps a raw event type tag to a semantic category. Table-driven so new
// tags can be added without touching the alert engine.

use crate::model::{Category, Event};

/// Type-tag to category mapping. Unlisted tags classify as `Benign`.
const CLASSIFICATION_TABLE: &[(&str, Category)] = &[
    ("danger", Category::Danger),
    ("pin_check", Category::SuccessfulCheck),
];

/// Classify an event by its declared type tag.
///
/// Pure and total: every event maps to exactly one category.
pub fn classify(event: &Event) -> Category {
    CLASSIFICATION_TABLE
        .iter()
        .find(|(tag, _)| *tag == event.kind)
        .map_or(Category::Benign, |(_, category)| *category)
}
