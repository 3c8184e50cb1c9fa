//! Data models for the source adapters.

use chrono::NaiveDate;
use epiwatch_common::{EpiwatchError, Record};
use serde::{Deserialize, Serialize};

/// Default number of results requested from a literature search.
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// Parameters of a literature search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    pub query: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_max_results() -> usize { DEFAULT_MAX_RESULTS }

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            start_date: None,
            end_date: None,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    /// Reject parameters no search backend can serve.
    pub fn validate(&self) -> Result<(), EpiwatchError> {
        if self.query.trim().is_empty() {
            return Err(EpiwatchError::InvalidInput("search query is empty".to_string()));
        }
        if self.max_results == 0 {
            return Err(EpiwatchError::InvalidInput("max_results must be at least 1".to_string()));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(EpiwatchError::InvalidInput(format!(
                    "start date {} is after end date {}",
                    start, end
                )));
            }
        }
        Ok(())
    }
}

/// Records gathered by a search, plus the identifiers that had to be skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Identifiers returned by the search call.
    pub ids_found: usize,
    pub records: Vec<Record>,
    /// One message per identifier whose fetch or parse failed.
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_bad_params() {
        assert!(SearchParams::new("  ").validate().is_err());
        assert!(SearchParams::new("fever").with_max_results(0).validate().is_err());

        let start = NaiveDate::from_ymd_opt(2022, 1, 1);
        let end = NaiveDate::from_ymd_opt(2021, 1, 1);
        assert!(SearchParams::new("fever").with_dates(start, end).validate().is_err());
        assert!(SearchParams::new("fever AND India").validate().is_ok());
    }

    #[test]
    fn test_max_results_defaults_when_absent() {
        let params: SearchParams = serde_json::from_str(r#"{"query": "zika"}"#).unwrap();
        assert_eq!(params.max_results, DEFAULT_MAX_RESULTS);
        assert!(params.start_date.is_none());
    }
}
