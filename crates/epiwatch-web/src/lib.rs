//! epiwatch-web: dashboard and JSON API for the triplet pipeline:
//!   - CSV upload and PubMed search forms
//!   - ranked triplet table, bar rows, symptom x country matrix, yearly trend
//!   - CSV export of the latest result

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::{AppState, LatestRun, SharedState};
