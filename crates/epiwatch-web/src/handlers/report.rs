//! Report JSON and CSV export of the latest result.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use epiwatch_triplets::{summary_csv_string, Report, CSV_FILE_NAME};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub origin: Option<String>,
    pub records: usize,
    pub warnings: Vec<String>,
    pub report: Report,
}

/// GET /api/report
pub async fn api_report(State(state): State<SharedState>) -> Json<ReportResponse> {
    let run = state.latest().await;
    let report = Report::from_result(&run.result, &state.report_config);
    Json(ReportResponse {
        origin: run.origin,
        records: run.records,
        warnings: run.warnings,
        report,
    })
}

/// GET /download/clinical_triplets.csv
pub async fn download_csv(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    let run = state.latest().await;
    if !run.result.is_ready() {
        return Err(ApiError::NotFound("no triplets to export".to_string()));
    }
    let csv = summary_csv_string(run.result.summary())?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", CSV_FILE_NAME),
            ),
        ],
        csv,
    ))
}
