//! Fast clinical NER using an Aho-Corasick trie for dictionary matching.
//!
//! Vocabulary comes either from the embedded clinical term list or from a
//! TSV file (`term<TAB>label`, header row) so a curated lexicon can replace
//! it without a rebuild.
//!
//! Matching is ASCII case-insensitive, leftmost-longest, and only accepts
//! hits that sit on word boundaries ("pain" does not fire inside "Spain").

use std::path::Path;

use aho_corasick::{AhoCorasick, MatchKind};
use tracing::{debug, info};

use crate::entity_types::{normalize_entity_label, EntityType};
use crate::recognizer::{EntityRecognizer, RecognizedEntity};
use crate::{NerError, Result};

/// A fast entity recognizer using an Aho-Corasick automaton.
pub struct TrieNer {
    automaton: AhoCorasick,
    /// Maps pattern index -> entity type
    pattern_types: Vec<EntityType>,
    stats: TrieStats,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrieStats {
    pub symptom_count: usize,
    pub disease_count: usize,
    pub other_count: usize,
    pub total_patterns: usize,
}

impl TrieNer {
    /// Build from `(term, type)` pairs. Blank terms are dropped.
    pub fn from_terms<I, S>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, EntityType)>,
        S: AsRef<str>,
    {
        let mut patterns: Vec<String> = Vec::new();
        let mut pattern_types: Vec<EntityType> = Vec::new();

        for (term, entity_type) in terms {
            let term = term.as_ref().trim();
            if term.is_empty() {
                continue;
            }
            patterns.push(term.to_string());
            pattern_types.push(entity_type);
        }

        if patterns.is_empty() {
            return Err(NerError::VocabularyLoad("vocabulary is empty".to_string()));
        }

        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .ascii_case_insensitive(true)
            .build(&patterns)?;

        let count = |t: EntityType| pattern_types.iter().filter(|p| **p == t).count();
        let symptom_count = count(EntityType::Symptom);
        let disease_count = count(EntityType::Disease);
        let stats = TrieStats {
            symptom_count,
            disease_count,
            other_count: patterns.len() - symptom_count - disease_count,
            total_patterns: patterns.len(),
        };

        Ok(Self { automaton, pattern_types, stats })
    }

    /// Build from the embedded clinical vocabulary.
    pub fn with_embedded_vocabulary() -> Result<Self> {
        let ner = Self::from_terms(embedded_vocabulary())?;
        info!(
            "TrieNer (embedded): {} symptoms, {} diseases, {} other terms",
            ner.stats.symptom_count, ner.stats.disease_count, ner.stats.other_count
        );
        Ok(ner)
    }

    /// Build from a TSV vocabulary file with `term` and `label` columns.
    pub fn from_vocabulary_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut lines = content.lines();

        let header = lines
            .next()
            .ok_or_else(|| NerError::VocabularyLoad(format!("empty vocabulary file {:?}", path)))?;
        let headers: Vec<&str> = header.split('\t').map(str::trim).collect();

        let col_idx = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let term_idx = col_idx("term")
            .ok_or_else(|| NerError::VocabularyLoad("missing term column".to_string()))?;
        let label_idx = col_idx("label");

        let mut terms = Vec::new();
        for line in lines {
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let cols: Vec<&str> = line.split('\t').collect();
            let term = cols.get(term_idx).copied().unwrap_or("");
            let label = label_idx
                .and_then(|i| cols.get(i).copied())
                .map(normalize_entity_label)
                .unwrap_or(EntityType::Other);
            terms.push((term.to_string(), label));
        }

        let ner = Self::from_terms(terms)?;
        info!(
            "TrieNer loaded {} patterns from {:?}",
            ner.stats.total_patterns, path
        );
        Ok(ner)
    }

    /// Extract entities from text, in order of appearance.
    ///
    /// Time complexity: O(n) where n = text length
    pub fn extract(&self, text: &str) -> Vec<RecognizedEntity> {
        let entities: Vec<RecognizedEntity> = self
            .automaton
            .find_iter(text)
            .filter(|mat| on_word_boundary(text, mat.start(), mat.end()))
            .map(|mat| RecognizedEntity {
                text: text[mat.start()..mat.end()].to_string(),
                label: self.pattern_types[mat.pattern().as_usize()],
                start: mat.start(),
                end: mat.end(),
            })
            .collect();

        debug!(count = entities.len(), "TrieNer matched entities");
        entities
    }

    /// Get statistics about loaded patterns.
    pub fn stats(&self) -> &TrieStats {
        &self.stats
    }
}

impl EntityRecognizer for TrieNer {
    fn recognize(&self, text: &str) -> Vec<RecognizedEntity> {
        self.extract(text)
    }

    fn name(&self) -> &str {
        "trie"
    }
}

fn on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

// ─────────────────────────────────────────────────────────────────────────
// Embedded clinical vocabulary

fn embedded_vocabulary() -> Vec<(&'static str, EntityType)> {
    let symptoms = [
        "fever", "rash", "vomiting", "diarrhea", "diarrhoea", "cough", "headache",
        "fatigue", "nausea", "pain", "sore throat", "shortness of breath",
        "jaundice", "myalgia", "arthralgia", "chills", "dyspnea", "dyspnoea",
        "malaise", "conjunctivitis", "seizures", "dehydration", "bleeding",
        "weight loss", "night sweats", "anorexia", "lethargy", "hypotension",
    ];
    let diseases = [
        "dengue", "zika", "malaria", "cholera", "typhoid", "influenza", "sepsis",
        "tuberculosis", "hepatitis", "asthma", "covid-19", "infection", "measles",
        "chikungunya", "ebola", "pneumonia", "meningitis", "leptospirosis",
        "mpox", "hiv", "diabetes", "hypertension", "encephalitis", "rabies",
        "scrub typhus", "shigellosis", "rotavirus",
    ];
    let pathogens = [
        "sars-cov-2", "plasmodium falciparum", "vibrio cholerae",
        "salmonella typhi", "aedes aegypti", "mycobacterium tuberculosis",
    ];
    let other = [
        "patient", "patients", "children", "adults", "outbreak", "epidemic",
        "mortality", "morbidity", "hospitalization", "vaccine", "vaccination",
        "transmission", "surveillance", "incidence", "prevalence", "cases",
    ];

    symptoms.iter().map(|t| (*t, EntityType::Symptom))
        .chain(diseases.iter().map(|t| (*t, EntityType::Disease)))
        .chain(pathogens.iter().map(|t| (*t, EntityType::Pathogen)))
        .chain(other.iter().map(|t| (*t, EntityType::Other)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trie_extraction_keeps_surface_text_and_order() {
        let ner = TrieNer::with_embedded_vocabulary().unwrap();

        let entities = ner.extract("Patient in India has Fever and dengue");
        let texts: Vec<&str> = entities.iter().map(|e| e.text.as_str()).collect();

        assert_eq!(texts, vec!["Patient", "Fever", "dengue"]);
        assert_eq!(entities[1].label, EntityType::Symptom);
        assert_eq!(entities[2].label, EntityType::Disease);
    }

    #[test]
    fn test_longest_match_and_word_boundaries() {
        let ner = TrieNer::with_embedded_vocabulary().unwrap();

        let entities = ner.extract("Shortness of breath, painful joints in Spain");
        let texts: Vec<&str> = entities.iter().map(|e| e.text.as_str()).collect();

        assert_eq!(texts, vec!["Shortness of breath"]);
    }

    #[test]
    fn test_hyphenated_terms() {
        let ner = TrieNer::with_embedded_vocabulary().unwrap();
        let entities = ner.extract("COVID-19 caused by SARS-CoV-2.");
        let texts: Vec<&str> = entities.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["COVID-19", "SARS-CoV-2"]);
    }

    #[test]
    fn test_load_from_vocabulary_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.tsv");
        std::fs::write(
            &path,
            "term\tlabel\nyellow fever\tDISEASE\n# comment\nfever\tSYMPTOM\n\nitch\n",
        )
        .unwrap();

        let ner = TrieNer::from_vocabulary_file(&path).unwrap();
        assert_eq!(ner.stats().total_patterns, 3);
        assert_eq!(ner.stats().disease_count, 1);
        assert_eq!(ner.stats().symptom_count, 1);

        let entities = ner.extract("Yellow fever then fever");
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].text, "Yellow fever");
    }

    #[test]
    fn test_missing_term_column_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.tsv");
        std::fs::write(&path, "name\tlabel\nfever\tSYMPTOM\n").unwrap();
        assert!(TrieNer::from_vocabulary_file(&path).is_err());
    }

    #[test]
    fn test_empty_vocabulary_is_error() {
        let empty: Vec<(&str, EntityType)> = vec![("  ", EntityType::Other)];
        assert!(TrieNer::from_terms(empty).is_err());
    }
}
