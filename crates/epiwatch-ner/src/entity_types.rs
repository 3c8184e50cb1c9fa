//! Entity type classification and normalization.

use std::collections::HashMap;

/// Normalized entity type for clinical NER.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EntityType {
    Symptom,
    Disease,
    Pathogen,
    Anatomy,
    Other,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Symptom => "SYMPTOM",
            EntityType::Disease => "DISEASE",
            EntityType::Pathogen => "PATHOGEN",
            EntityType::Anatomy => "ANATOMY",
            EntityType::Other => "OTHER",
        }
    }
}

// Map vocabulary/model labels to normalized types
fn get_label_map() -> &'static HashMap<&'static str, EntityType> {
    use std::sync::OnceLock;
    static LABEL_MAP: OnceLock<HashMap<&'static str, EntityType>> = OnceLock::new();
    LABEL_MAP.get_or_init(|| {
        let mut m = HashMap::new();

        m.insert("SYMPTOM", EntityType::Symptom);
        m.insert("SIGN_OR_SYMPTOM", EntityType::Symptom);
        m.insert("FINDING", EntityType::Symptom);

        m.insert("DISEASE", EntityType::Disease);
        m.insert("Disease", EntityType::Disease);
        m.insert("SpecificDisease", EntityType::Disease);
        m.insert("DiseaseClass", EntityType::Disease);

        m.insert("PATHOGEN", EntityType::Pathogen);
        m.insert("TAXON", EntityType::Pathogen);
        m.insert("ORGANISM", EntityType::Pathogen);

        m.insert("ANATOMY", EntityType::Anatomy);
        m.insert("ORGAN", EntityType::Anatomy);
        m.insert("TISSUE", EntityType::Anatomy);

        // scispaCy's generic label
        m.insert("ENTITY", EntityType::Other);
        m.insert("OTHER", EntityType::Other);

        m
    })
}

/// Normalize a vocabulary or model label to our standard EntityType.
pub fn normalize_entity_label(label: &str) -> EntityType {
    // Handle BIO tagging (B-, I- prefixes)
    let clean_label = label.trim().trim_start_matches("B-").trim_start_matches("I-");

    get_label_map()
        .get(clean_label)
        .or_else(|| get_label_map().get(clean_label.to_uppercase().as_str()))
        .copied()
        .unwrap_or(EntityType::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_disease_labels() {
        assert_eq!(normalize_entity_label("Disease"), EntityType::Disease);
        assert_eq!(normalize_entity_label("B-DISEASE"), EntityType::Disease);
        assert_eq!(normalize_entity_label("SpecificDisease"), EntityType::Disease);
    }

    #[test]
    fn test_normalize_symptom_and_unknown() {
        assert_eq!(normalize_entity_label("symptom"), EntityType::Symptom);
        assert_eq!(normalize_entity_label("I-FINDING"), EntityType::Symptom);
        assert_eq!(normalize_entity_label("GENE"), EntityType::Other);
    }
}
