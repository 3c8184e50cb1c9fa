//! Literature source clients.

pub mod pubmed;

use async_trait::async_trait;
use epiwatch_common::Record;
use tracing::{info, warn};

use crate::models::{SearchOutcome, SearchParams};

/// Common interface for literature search backends.
#[async_trait]
pub trait LiteratureSource: Send + Sync {
    /// Run the search call and return matching record identifiers.
    async fn search_ids(&self, params: &SearchParams) -> anyhow::Result<Vec<String>>;

    /// Fetch and parse the records behind one identifier.
    async fn fetch_record(&self, id: &str) -> anyhow::Result<Vec<Record>>;

    /// Search, then fetch every identifier one at a time.
    ///
    /// A failed search aborts. A failed fetch is logged, recorded in
    /// [`SearchOutcome::warnings`] and skipped.
    async fn search(&self, params: &SearchParams) -> anyhow::Result<SearchOutcome> {
        params.validate()?;
        let ids = self.search_ids(params).await?;

        let mut outcome = SearchOutcome {
            ids_found: ids.len(),
            ..SearchOutcome::default()
        };

        for id in &ids {
            match self.fetch_record(id).await {
                Ok(records) => outcome.records.extend(records),
                Err(e) => {
                    warn!(id = %id, "Skipping record after fetch failure: {:#}", e);
                    outcome.warnings.push(format!("{}: {:#}", id, e));
                }
            }
        }

        info!(
            "Search '{}' returned {} ids, {} records, {} skipped",
            params.query,
            outcome.ids_found,
            outcome.records.len(),
            outcome.warnings.len()
        );
        Ok(outcome)
    }
}
