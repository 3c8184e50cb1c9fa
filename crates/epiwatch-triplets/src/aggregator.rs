//! Triplet aggregation.
//!
//! For every record with at least two distinct whitelisted terms and at least
//! one country, each unordered term pair is counted once per country. The pair
//! is stored sorted, so `symptom <= disease` always holds; the names are
//! positional labels, not clinical categories.
//!
//! ThreatIndex = count / max(count), recomputed on every run.

use std::collections::HashMap;

use epiwatch_common::Record;
use epiwatch_ner::{ClinicalWhitelist, EntityExtractor};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Per-record extraction output, the input to [`aggregate_extracted`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedRecord {
    pub entities: Vec<String>,
    pub countries: Vec<String>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TripletKey {
    pub symptom: String,
    pub disease: String,
    pub country: String,
}

impl TripletKey {
    /// Key for an unordered pair of terms; the pair is sorted.
    pub fn canonical(a: &str, b: &str, country: &str) -> Self {
        let (symptom, disease) = if a <= b { (a, b) } else { (b, a) };
        Self {
            symptom: symptom.to_string(),
            disease: disease.to_string(),
            country: country.to_string(),
        }
    }
}

/// One aggregated triplet. Field names serialize as the export headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SummaryRow {
    pub symptom: String,
    pub disease: String,
    pub country: String,
    pub count: u64,
    pub threat_index: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrendRow {
    pub symptom: String,
    pub disease: String,
    pub country: String,
    pub year: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregation {
    /// Descending by count; ties keep first-seen order.
    pub summary: Vec<SummaryRow>,
    pub trends: Vec<TrendRow>,
}

/// Outcome of the latest pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineResult {
    /// Nothing has been processed yet.
    #[default]
    NotRun,
    /// Processed, but no triplet survived.
    Empty,
    Ready {
        summary: Vec<SummaryRow>,
        trends: Vec<TrendRow>,
    },
}

impl PipelineResult {
    pub fn summary(&self) -> &[SummaryRow] {
        match self {
            PipelineResult::Ready { summary, .. } => summary,
            _ => &[],
        }
    }

    pub fn trends(&self) -> &[TrendRow] {
        match self {
            PipelineResult::Ready { trends, .. } => trends,
            _ => &[],
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PipelineResult::Ready { .. })
    }
}

impl From<Aggregation> for PipelineResult {
    fn from(agg: Aggregation) -> Self {
        if agg.summary.is_empty() {
            PipelineResult::Empty
        } else {
            PipelineResult::Ready {
                summary: agg.summary,
                trends: agg.trends,
            }
        }
    }
}

/// Runs extraction and counting over a batch of records.
#[derive(Debug, Clone)]
pub struct TripletAggregator {
    extractor: EntityExtractor,
    whitelist: ClinicalWhitelist,
}

impl TripletAggregator {
    pub fn new(extractor: EntityExtractor, whitelist: ClinicalWhitelist) -> Self {
        Self { extractor, whitelist }
    }

    pub fn extract(&self, record: &Record) -> ExtractedRecord {
        let text = record.abstract_str();
        ExtractedRecord {
            entities: self.extractor.extract_entities(text),
            countries: self.extractor.extract_countries(text),
            year: record.year(),
        }
    }

    pub fn aggregate(&self, records: &[Record]) -> Aggregation {
        let extracted: Vec<ExtractedRecord> = records.iter().map(|r| self.extract(r)).collect();
        aggregate_extracted(&extracted, &self.whitelist)
    }

    pub fn run_pipeline(&self, records: &[Record]) -> PipelineResult {
        let result = PipelineResult::from(self.aggregate(records));
        info!(
            records = records.len(),
            triplets = result.summary().len(),
            trend_rows = result.trends().len(),
            "Pipeline finished"
        );
        result
    }
}

/// Count triplets over already-extracted records.
pub fn aggregate_extracted(
    records: &[ExtractedRecord],
    whitelist: &ClinicalWhitelist,
) -> Aggregation {
    let mut index: HashMap<TripletKey, usize> = HashMap::new();
    let mut counted: Vec<(TripletKey, u64)> = Vec::new();
    let mut trends = Vec::new();
    let mut kept = 0usize;

    for record in records {
        if record.entities.is_empty() || record.countries.is_empty() {
            continue;
        }
        let terms = whitelist.filter_terms(&record.entities);
        if terms.len() < 2 {
            continue;
        }
        kept += 1;

        for country in &record.countries {
            let country = country.to_lowercase();
            for (i, a) in terms.iter().enumerate() {
                for b in &terms[i + 1..] {
                    let key = TripletKey::canonical(a, b, &country);
                    if let Some(year) = record.year {
                        trends.push(TrendRow {
                            symptom: key.symptom.clone(),
                            disease: key.disease.clone(),
                            country: key.country.clone(),
                            year,
                        });
                    }
                    match index.get(&key) {
                        Some(&slot) => counted[slot].1 += 1,
                        None => {
                            index.insert(key.clone(), counted.len());
                            counted.push((key, 1));
                        }
                    }
                }
            }
        }
    }

    // Stable: equal counts keep first-seen order.
    counted.sort_by(|a, b| b.1.cmp(&a.1));
    let max = counted.first().map(|(_, c)| *c).unwrap_or(0);

    let summary: Vec<SummaryRow> = counted
        .into_iter()
        .map(|(key, count)| SummaryRow {
            symptom: key.symptom,
            disease: key.disease,
            country: key.country,
            count,
            threat_index: count as f64 / max as f64,
        })
        .collect();

    debug!(
        input = records.len(),
        kept,
        triplets = summary.len(),
        "Aggregated triplets"
    );
    Aggregation { summary, trends }
}

#[cfg(test)]
mod tests {
    use super::*;
    use epiwatch_ner::TrieNer;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn extracted(entities: &[&str], countries: &[&str], year: Option<i32>) -> ExtractedRecord {
        ExtractedRecord {
            entities: entities.iter().map(|s| s.to_string()).collect(),
            countries: countries.iter().map(|s| s.to_string()).collect(),
            year,
        }
    }

    fn aggregator() -> TripletAggregator {
        let ner = TrieNer::with_embedded_vocabulary().unwrap();
        TripletAggregator::new(
            EntityExtractor::new(Arc::new(ner)),
            ClinicalWhitelist::default(),
        )
    }

    #[test]
    fn test_india_fever_dengue_scenario() {
        let records = vec![Record::new(
            None,
            Some("Patient in India has fever and dengue".to_string()),
            Some("2021".to_string()),
        )];
        let agg = aggregator().aggregate(&records);

        assert_eq!(
            agg.summary,
            vec![SummaryRow {
                symptom: "dengue".into(),
                disease: "fever".into(),
                country: "india".into(),
                count: 1,
                threat_index: 1.0,
            }]
        );
        assert_eq!(
            agg.trends,
            vec![TrendRow {
                symptom: "dengue".into(),
                disease: "fever".into(),
                country: "india".into(),
                year: 2021,
            }]
        );
    }

    #[test]
    fn test_single_whitelisted_term_yields_nothing() {
        let records = vec![Record::new(
            None,
            Some("Fever reported among patients in Brazil".to_string()),
            None,
        )];
        let result = aggregator().run_pipeline(&records);
        assert_eq!(result, PipelineResult::Empty);
    }

    #[test]
    fn test_empty_input_is_empty_result() {
        assert_eq!(aggregator().run_pipeline(&[]), PipelineResult::Empty);
        assert_eq!(
            aggregate_extracted(&[], &ClinicalWhitelist::default()),
            Aggregation::default()
        );
    }

    #[test]
    fn test_missing_abstract_contributes_nothing() {
        let records = vec![Record::new(Some("t".into()), None, Some("2020".into()))];
        let agg = aggregator();
        assert_eq!(agg.extract(&records[0]).entities, Vec::<String>::new());
        assert_eq!(agg.run_pipeline(&records), PipelineResult::Empty);
    }

    #[test]
    fn test_pairs_are_canonically_ordered() {
        let whitelist = ClinicalWhitelist::default();
        let records = vec![
            extracted(&["rash", "cough", "zika"], &["peru"], None),
            extracted(&["zika", "cough"], &["peru"], None),
        ];
        let agg = aggregate_extracted(&records, &whitelist);

        assert!(agg.summary.iter().all(|r| r.symptom <= r.disease));
        let top = &agg.summary[0];
        assert_eq!((top.symptom.as_str(), top.disease.as_str()), ("cough", "zika"));
        assert_eq!(top.count, 2);
    }

    #[test]
    fn test_count_conservation() {
        let whitelist = ClinicalWhitelist::default();
        // 3 distinct terms x 2 countries = 3 pairs * 2 = 6
        // 2 distinct terms x 1 country = 1
        // duplicates collapse: {fever, rash} x 1 = 1
        let records = vec![
            extracted(&["fever", "rash", "cough", "patient"], &["chad", "mali"], Some(2019)),
            extracted(&["malaria", "fever"], &["mali"], None),
            extracted(&["fever", "Fever", "rash"], &["chad"], Some(2020)),
            extracted(&["fever"], &["chad"], Some(2020)),
        ];
        let agg = aggregate_extracted(&records, &whitelist);

        let total: u64 = agg.summary.iter().map(|r| r.count).sum();
        assert_eq!(total, 8);
        assert_eq!(agg.trends.len(), 7);
    }

    #[test]
    fn test_threat_index_range_and_ordering() {
        let whitelist = ClinicalWhitelist::default();
        let records = vec![
            extracted(&["fever", "rash"], &["chad"], None),
            extracted(&["cough", "pain"], &["togo"], None),
            extracted(&["fever", "rash"], &["chad"], None),
            extracted(&["fever", "rash"], &["chad"], None),
            extracted(&["cough", "pain"], &["togo"], None),
            extracted(&["sepsis", "nausea"], &["niue"], None),
        ];
        let agg = aggregate_extracted(&records, &whitelist);

        assert_eq!(agg.summary[0].threat_index, 1.0);
        assert!(agg
            .summary
            .iter()
            .all(|r| r.threat_index > 0.0 && r.threat_index <= 1.0));
        assert!(agg.summary.windows(2).all(|w| w[0].count >= w[1].count));
        assert!((agg.summary[1].threat_index - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let whitelist = ClinicalWhitelist::default();
        let records = vec![
            extracted(&["zika", "rash"], &["peru"], None),
            extracted(&["cough", "fever"], &["chad"], None),
        ];
        let agg = aggregate_extracted(&records, &whitelist);
        let countries: Vec<&str> = agg.summary.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(countries, vec!["peru", "chad"]);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let records = vec![
            Record::new(None, Some("Cholera and diarrhea in Haiti and Yemen".into()), Some("2018-03-02".into())),
            Record::new(None, Some("Malaria with fever and headache in Kenya".into()), Some("2019".into())),
            Record::new(None, Some("Cholera with vomiting in Yemen".into()), None),
        ];
        let agg = aggregator();
        assert_eq!(agg.aggregate(&records), agg.aggregate(&records));
    }

    #[test]
    fn test_pipeline_result_accessors() {
        assert!(PipelineResult::NotRun.summary().is_empty());
        assert!(!PipelineResult::Empty.is_ready());

        let ready = PipelineResult::from(aggregate_extracted(
            &[extracted(&["fever", "rash"], &["chad"], Some(2022))],
            &ClinicalWhitelist::default(),
        ));
        assert!(ready.is_ready());
        assert_eq!(ready.summary().len(), 1);
        assert_eq!(ready.trends()[0].year, 2022);
    }
}
