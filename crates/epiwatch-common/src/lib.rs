//! epiwatch-common: Shared record types, errors and the capped HTTP client
//! used across all Epiwatch crates.

pub mod error;
pub mod records;
pub mod sandbox;

pub use error::{EpiwatchError, Result};
pub use records::{parse_year, Record};
