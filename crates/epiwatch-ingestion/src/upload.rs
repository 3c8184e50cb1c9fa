//! CSV upload adapter.
//!
//! The only required column is `Abstract`; `Title` and `Date` are picked up
//! when present. Parsing is strict: a ragged row or invalid UTF-8 fails the
//! whole upload.

use std::io::Read;
use std::path::Path;

use epiwatch_common::{EpiwatchError, Record};
use tracing::{debug, info};

pub const ABSTRACT_COLUMN: &str = "Abstract";
pub const TITLE_COLUMN: &str = "Title";
pub const DATE_COLUMN: &str = "Date";

/// Parse a CSV byte stream into records.
pub fn parse_records_csv<R: Read>(input: R) -> Result<Vec<Record>, EpiwatchError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let col_idx = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
    };

    let abstract_idx = col_idx(ABSTRACT_COLUMN)
        .ok_or_else(|| EpiwatchError::MissingColumn(ABSTRACT_COLUMN.to_string()))?;
    let title_idx = col_idx(TITLE_COLUMN);
    let date_idx = col_idx(DATE_COLUMN);
    debug!(?title_idx, ?date_idx, "CSV upload columns resolved");

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).map(str::to_string);
        records.push(Record::new(
            cell(title_idx),
            cell(Some(abstract_idx)),
            cell(date_idx),
        ));
    }

    info!("Parsed {} records from CSV upload", records.len());
    Ok(records)
}

/// Read records from a CSV file on disk.
pub fn read_records_csv(path: &Path) -> Result<Vec<Record>, EpiwatchError> {
    let file = std::fs::File::open(path)?;
    parse_records_csv(std::io::BufReader::new(file))
}
