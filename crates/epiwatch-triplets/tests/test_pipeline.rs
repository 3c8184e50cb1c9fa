//! End-to-end: CSV text -> records -> triplets -> export.

use std::sync::Arc;

use epiwatch_common::Record;
use epiwatch_ner::{ClinicalWhitelist, EntityExtractor, TrieNer};
use epiwatch_triplets::{
    summary_csv_string, yearly_mentions, PipelineResult, Report, ReportConfig, TripletAggregator,
};
use pretty_assertions::assert_eq;

fn aggregator() -> TripletAggregator {
    let ner = TrieNer::with_embedded_vocabulary().unwrap();
    TripletAggregator::new(
        EntityExtractor::new(Arc::new(ner)),
        ClinicalWhitelist::default(),
    )
}

fn record(text: &str, date: Option<&str>) -> Record {
    Record::new(None, Some(text.to_string()), date.map(String::from))
}

#[test]
fn test_pipeline_over_mixed_batch() {
    let records = vec![
        record("Cholera and diarrhea reported in Haiti.", Some("2019-06-01")),
        record("Diarrhea with cholera among children in Haiti.", Some("2020")),
        record("Dengue and fever in Brazil.", None),
        record("No clinical content here about Brazil.", Some("2021")),
        record("Fever and rash without any place.", Some("2021")),
    ];

    let result = aggregator().run_pipeline(&records);
    let PipelineResult::Ready { summary, trends } = &result else {
        panic!("expected a ready result, got {:?}", result);
    };

    assert_eq!(summary.len(), 2);
    assert_eq!(
        (summary[0].symptom.as_str(), summary[0].disease.as_str(), summary[0].country.as_str()),
        ("cholera", "diarrhea", "haiti")
    );
    assert_eq!(summary[0].count, 2);
    assert_eq!(summary[0].threat_index, 1.0);
    assert_eq!(summary[1].threat_index, 0.5);

    let years: Vec<(i32, u64)> = yearly_mentions(trends)
        .into_iter()
        .map(|y| (y.year, y.mentions))
        .collect();
    assert_eq!(years, vec![(2019, 1), (2020, 1)]);

    let csv = summary_csv_string(summary).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Symptom,Disease,Country,Count,ThreatIndex"));
    assert_eq!(lines.next(), Some("cholera,diarrhea,haiti,2,1.0"));
    assert_eq!(lines.next(), Some("dengue,fever,brazil,1,0.5"));

    let report = Report::from_result(&result, &ReportConfig::default());
    assert_eq!(report.heatmap.get("cholera", "haiti"), Some(2));
}

#[test]
fn test_pipeline_with_no_survivors_is_empty() {
    let records = vec![record("Nothing to see.", None)];
    assert_eq!(aggregator().run_pipeline(&records), PipelineResult::Empty);
}
