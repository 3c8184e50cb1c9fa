//! Per-abstract entity and country extraction.

use std::sync::Arc;

use tracing::debug;

use crate::countries::{CountryMatch, CountryTable};
use crate::recognizer::EntityRecognizer;

/// Entities shorter than this many characters are dropped.
pub const DEFAULT_MIN_ENTITY_LEN: usize = 3;

/// Turns abstract text into entity mentions and country names.
#[derive(Clone)]
pub struct EntityExtractor {
    recognizer: Arc<dyn EntityRecognizer>,
    countries: CountryTable,
    country_match: CountryMatch,
    min_entity_len: usize,
}

impl EntityExtractor {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self {
            recognizer,
            countries: CountryTable::iso3166(),
            country_match: CountryMatch::default(),
            min_entity_len: DEFAULT_MIN_ENTITY_LEN,
        }
    }

    pub fn with_countries(mut self, countries: CountryTable) -> Self {
        self.countries = countries;
        self
    }

    pub fn with_country_match(mut self, mode: CountryMatch) -> Self {
        self.country_match = mode;
        self
    }

    pub fn with_min_entity_len(mut self, len: usize) -> Self {
        self.min_entity_len = len;
        self
    }

    /// Lowercase entity mentions in recognizer order. `None` yields nothing.
    pub fn extract_entities(&self, text: Option<&str>) -> Vec<String> {
        let Some(text) = text else {
            return Vec::new();
        };
        let entities: Vec<String> = self
            .recognizer
            .recognize(text)
            .into_iter()
            .map(|e| e.text.to_lowercase())
            .filter(|e| e.chars().count() >= self.min_entity_len)
            .collect();

        debug!(
            recognizer = self.recognizer.name(),
            count = entities.len(),
            "Extracted entities"
        );
        entities
    }

    /// Country names found in the text, in table order. `None` yields nothing.
    pub fn extract_countries(&self, text: Option<&str>) -> Vec<String> {
        match text {
            Some(text) => self.countries.find_in(text, self.country_match),
            None => Vec::new(),
        }
    }
}

impl std::fmt::Debug for EntityExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityExtractor")
            .field("recognizer", &self.recognizer.name())
            .field("countries", &self.countries.len())
            .field("country_match", &self.country_match)
            .field("min_entity_len", &self.min_entity_len)
            .finish()
    }
}
