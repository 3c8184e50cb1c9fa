//! Presentation shapes derived from an aggregation.
//!
//! Everything here is a pure function of the summary or trend rows; the web
//! dashboard and the CLI only format these.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use epiwatch_common::EpiwatchError;
use serde::{Deserialize, Serialize};

use crate::aggregator::{PipelineResult, SummaryRow, TrendRow};

/// Download name of the exported summary.
pub const CSV_FILE_NAME: &str = "clinical_triplets.csv";

pub const DEFAULT_TABLE_ROWS: usize = 15;
pub const DEFAULT_BAR_ROWS: usize = 10;

/// Row limits for the ranked views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub table_rows: usize,
    pub bar_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            table_rows: DEFAULT_TABLE_ROWS,
            bar_rows: DEFAULT_BAR_ROWS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarRow {
    pub label: String,
    pub count: u64,
}

/// Symptom x country pivot of summed counts. `counts[i][j]` is the total for
/// `symptoms[i]` in `countries[j]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Heatmap {
    pub symptoms: Vec<String>,
    pub countries: Vec<String>,
    pub counts: Vec<Vec<u64>>,
}

impl Heatmap {
    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    pub fn get(&self, symptom: &str, country: &str) -> Option<u64> {
        let i = self.symptoms.iter().position(|s| s == symptom)?;
        let j = self.countries.iter().position(|c| c == country)?;
        Some(self.counts[i][j])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearlyMentions {
    pub year: i32,
    pub mentions: u64,
}

pub fn top_rows(summary: &[SummaryRow], n: usize) -> &[SummaryRow] {
    &summary[..n.min(summary.len())]
}

/// The first `n` rows labelled "Symptom | Disease | Country".
pub fn bar_rows(summary: &[SummaryRow], n: usize) -> Vec<BarRow> {
    top_rows(summary, n)
        .iter()
        .map(|r| BarRow {
            label: format!("{} | {} | {}", r.symptom, r.disease, r.country),
            count: r.count,
        })
        .collect()
}

pub fn symptom_country_matrix(summary: &[SummaryRow]) -> Heatmap {
    let mut cells: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    let mut symptoms = BTreeSet::new();
    let mut countries = BTreeSet::new();

    for row in summary {
        *cells
            .entry((row.symptom.as_str(), row.country.as_str()))
            .or_default() += row.count;
        symptoms.insert(row.symptom.as_str());
        countries.insert(row.country.as_str());
    }

    let counts = symptoms
        .iter()
        .map(|s| {
            countries
                .iter()
                .map(|c| cells.get(&(*s, *c)).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    Heatmap {
        symptoms: symptoms.into_iter().map(String::from).collect(),
        countries: countries.into_iter().map(String::from).collect(),
        counts,
    }
}

/// Trend rows grouped by year, ascending.
pub fn yearly_mentions(trends: &[TrendRow]) -> Vec<YearlyMentions> {
    let mut by_year: BTreeMap<i32, u64> = BTreeMap::new();
    for row in trends {
        *by_year.entry(row.year).or_default() += 1;
    }
    by_year
        .into_iter()
        .map(|(year, mentions)| YearlyMentions { year, mentions })
        .collect()
}

/// Write the summary as `Symptom,Disease,Country,Count,ThreatIndex` CSV.
pub fn write_summary_csv<W: Write>(summary: &[SummaryRow], writer: W) -> Result<(), EpiwatchError> {
    let mut wtr = csv::Writer::from_writer(writer);
    if summary.is_empty() {
        wtr.write_record(["Symptom", "Disease", "Country", "Count", "ThreatIndex"])?;
    }
    for row in summary {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn summary_csv_string(summary: &[SummaryRow]) -> Result<String, EpiwatchError> {
    let mut buf = Vec::new();
    write_summary_csv(summary, &mut buf)?;
    String::from_utf8(buf).map_err(|e| EpiwatchError::InvalidInput(e.to_string()))
}

/// All dashboard shapes for one pipeline result.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub status: &'static str,
    pub total_triplets: usize,
    pub table: Vec<SummaryRow>,
    pub bars: Vec<BarRow>,
    pub heatmap: Heatmap,
    pub yearly: Vec<YearlyMentions>,
}

impl Report {
    pub fn from_result(result: &PipelineResult, config: &ReportConfig) -> Self {
        let status = match result {
            PipelineResult::NotRun => "not_run",
            PipelineResult::Empty => "empty",
            PipelineResult::Ready { .. } => "ready",
        };
        let summary = result.summary();
        Self {
            status,
            total_triplets: summary.len(),
            table: top_rows(summary, config.table_rows).to_vec(),
            bars: bar_rows(summary, config.bar_rows),
            heatmap: symptom_country_matrix(summary),
            yearly: yearly_mentions(result.trends()),
        }
    }
}
