//! epiwatch-ingestion: Source adapters producing [`Record`]s:
//! - CSV uploads (`upload`)
//! - PubMed E-utilities search (`sources::pubmed`)
//!
//! [`Record`]: epiwatch_common::Record

pub mod models;
pub mod sources;
pub mod upload;

pub use models::{SearchOutcome, SearchParams};
pub use upload::{parse_records_csv, read_records_csv};
