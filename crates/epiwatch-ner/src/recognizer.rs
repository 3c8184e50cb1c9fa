//! The entity recognition capability consumed by the extractor.

use serde::Serialize;

use crate::entity_types::EntityType;

/// An entity span reported by a recognizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognizedEntity {
    /// Surface text exactly as it appears in the input.
    pub text: String,
    pub label: EntityType,
    /// Byte offsets into the input.
    pub start: usize,
    pub end: usize,
}

/// A biomedical named-entity recognizer.
///
/// Loaded once at start-up and shared behind an `Arc`. Implementations report
/// entities in their own order; callers must not assume alphabetic order.
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Vec<RecognizedEntity>;

    fn name(&self) -> &str {
        "recognizer"
    }
}
