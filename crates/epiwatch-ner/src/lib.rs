//! Clinical entity and country extraction.
//!
//! The recognizer is a capability injected into [`EntityExtractor`]; the
//! bundled [`TrieNer`] matches a clinical vocabulary with an Aho-Corasick
//! automaton. Country detection runs against the ISO 3166-1 name table.

mod entity_types;
pub mod countries;
pub mod extractor;
pub mod recognizer;
pub mod trie_ner;
pub mod whitelist;

pub use countries::{CountryMatch, CountryTable};
pub use entity_types::{normalize_entity_label, EntityType};
pub use extractor::EntityExtractor;
pub use recognizer::{EntityRecognizer, RecognizedEntity};
pub use trie_ner::{TrieNer, TrieStats};
pub use whitelist::ClinicalWhitelist;

pub type Result<T> = std::result::Result<T, NerError>;

#[derive(Debug, thiserror::Error)]
pub enum NerError {
    #[error("Vocabulary loading failed: {0}")]
    VocabularyLoad(String),

    #[error("Automaton build failed: {0}")]
    Build(#[from] aho_corasick::BuildError),
}

impl From<std::io::Error> for NerError {
    fn from(e: std::io::Error) -> Self {
        NerError::VocabularyLoad(e.to_string())
    }
}
