//! The literature record shared by every pipeline stage.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One literature entry: title, abstract and an optional raw date.
///
/// Records are produced by the source adapters (CSV upload or PubMed search)
/// and never mutated afterwards. The date is kept as the raw string the
/// source supplied; [`Record::year`] resolves it lazily.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Abstract")]
    pub abstract_text: Option<String>,
    #[serde(rename = "Date")]
    pub date: Option<String>,
}

impl Record {
    pub fn new(
        title: Option<String>,
        abstract_text: Option<String>,
        date: Option<String>,
    ) -> Self {
        Self {
            title: non_blank(title),
            abstract_text: non_blank(abstract_text),
            date: non_blank(date),
        }
    }

    /// Abstract text, or `None` when missing or blank.
    pub fn abstract_str(&self) -> Option<&str> {
        self.abstract_text.as_deref()
    }

    /// Year of the record's date; `None` when absent or unparseable.
    pub fn year(&self) -> Option<i32> {
        self.date.as_deref().and_then(parse_year)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%Y %b %d",
    "%d %b %Y",
];

/// Resolve a free-form date string to its year.
///
/// Accepts a bare year, `YYYY-MM`, the common day-precision layouts and
/// RFC 3339 timestamps. Invalid dates yield `None`, never an error.
pub fn parse_year(raw: &str) -> Option<i32> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse::<i32>().ok().filter(|y| *y > 0);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.year());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.year());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.year());
        }
    }

    // Month precision: YYYY-MM or YYYY/MM
    for sep in ['-', '/'] {
        if let Some((year, month)) = s.split_once(sep) {
            let month_ok = month
                .parse::<u32>()
                .map(|m| (1..=12).contains(&m))
                .unwrap_or(false);
            if year.len() == 4 && month_ok {
                return year.parse::<i32>().ok();
            }
        }
    }

    None
}
