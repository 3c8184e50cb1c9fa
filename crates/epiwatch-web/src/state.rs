//! Shared application state for the web server.

use std::sync::Arc;

use epiwatch_common::Record;
use epiwatch_ingestion::sources::LiteratureSource;
use epiwatch_triplets::{PipelineResult, ReportConfig, TripletAggregator};
use tokio::sync::RwLock;
use tracing::info;

/// The most recent pipeline run and where its records came from.
#[derive(Debug, Clone, Default)]
pub struct LatestRun {
    pub result: PipelineResult,
    /// e.g. `upload: abstracts.csv` or `search: dengue`
    pub origin: Option<String>,
    pub records: usize,
    pub warnings: Vec<String>,
}

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub aggregator: TripletAggregator,
    pub source: Arc<dyn LiteratureSource>,
    pub report_config: ReportConfig,
    latest: RwLock<LatestRun>,
}

impl AppState {
    pub fn new(
        aggregator: TripletAggregator,
        source: Arc<dyn LiteratureSource>,
        report_config: ReportConfig,
    ) -> Self {
        Self {
            aggregator,
            source,
            report_config,
            latest: RwLock::new(LatestRun::default()),
        }
    }

    pub async fn latest(&self) -> LatestRun {
        self.latest.read().await.clone()
    }

    /// Run the pipeline over `records` and make it the latest result.
    ///
    /// The result is computed before the write lock is taken.
    pub async fn process(
        &self,
        records: Vec<Record>,
        origin: String,
        warnings: Vec<String>,
    ) -> LatestRun {
        let result = self.aggregator.run_pipeline(&records);
        let run = LatestRun {
            result,
            origin: Some(origin),
            records: records.len(),
            warnings,
        };
        info!(
            origin = run.origin.as_deref().unwrap_or_default(),
            records = run.records,
            triplets = run.result.summary().len(),
            "Published pipeline result"
        );
        *self.latest.write().await = run.clone();
        run
    }
}

pub type SharedState = Arc<AppState>;
