//! The clinical term whitelist used to keep triplets on-topic.

use std::collections::HashSet;

/// Terms allowed into a triplet.
pub const DEFAULT_CLINICAL_TERMS: &[&str] = &[
    "fever",
    "rash",
    "vomiting",
    "diarrhea",
    "cough",
    "headache",
    "fatigue",
    "dengue",
    "zika",
    "malaria",
    "cholera",
    "typhoid",
    "jaundice",
    "influenza",
    "sepsis",
    "tuberculosis",
    "hepatitis",
    "asthma",
    "covid-19",
    "sore throat",
    "shortness of breath",
    "nausea",
    "pain",
    "infection",
];

#[derive(Debug, Clone)]
pub struct ClinicalWhitelist {
    terms: HashSet<String>,
}

impl ClinicalWhitelist {
    /// The default whitelist plus `extra` terms.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        for term in extra {
            let term = term.as_ref().trim().to_lowercase();
            if !term.is_empty() {
                list.terms.insert(term);
            }
        }
        list
    }

    /// Case- and whitespace-insensitive membership test.
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(&term.trim().to_lowercase())
    }

    /// Whitelisted terms of `entities`, normalized, first occurrence kept.
    pub fn filter_terms<S: AsRef<str>>(&self, entities: &[S]) -> Vec<String> {
        let mut seen = HashSet::new();
        entities
            .iter()
            .filter(|e| self.contains((*e).as_ref()))
            .map(|e| e.as_ref().trim().to_lowercase())
            .filter(|e| seen.insert(e.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl Default for ClinicalWhitelist {
    fn default() -> Self {
        Self {
            terms: DEFAULT_CLINICAL_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_normalizes() {
        let list = ClinicalWhitelist::default();
        assert_eq!(list.len(), 24);
        assert!(list.contains("  Fever "));
        assert!(!list.contains("patient"));
        let terms = list.filter_terms(&["  Fever ", "COVID-19", "patient"]);
        assert_eq!(terms, vec!["fever", "covid-19"]);
    }

    #[test]
    fn test_filter_dedupes_in_order() {
        let list = ClinicalWhitelist::default();
        let terms = list.filter_terms(&["patient", "dengue", "fever", "Dengue", "india"]);
        assert_eq!(terms, vec!["dengue", "fever"]);
    }

    #[test]
    fn test_extra_terms() {
        let list = ClinicalWhitelist::with_extra(["Measles", " "]);
        assert_eq!(list.len(), 25);
        assert_eq!(list.filter_terms(&["measles"]), vec!["measles"]);
    }
}
