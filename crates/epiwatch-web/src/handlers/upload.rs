//! CSV upload: multipart form and raw-body API.

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
    response::Html,
    Json,
};
use epiwatch_ingestion::parse_records_csv;
use epiwatch_triplets::Report;
use tracing::info;

use crate::error::ApiError;
use crate::handlers::dashboard::{render_page, Banner};
use crate::state::{LatestRun, SharedState};

/// Multipart field carrying the CSV file.
pub const FILE_FIELD: &str = "file";

/// POST /upload - dashboard form upload
pub async fn upload_form(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> (StatusCode, Html<String>) {
    let outcome = match read_file_field(multipart).await {
        Ok((name, bytes)) => process_upload(&state, &name, &bytes).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(run) => {
            let report = Report::from_result(&run.result, &state.report_config);
            let banner = Banner::Info(format!(
                "Processed {} record(s) into {} triplet(s).",
                run.records, report.total_triplets
            ));
            (StatusCode::OK, Html(render_page(&run, &report, Some(banner))))
        }
        Err(e) => {
            let run = state.latest().await;
            let report = Report::from_result(&run.result, &state.report_config);
            (e.status(), Html(render_page(&run, &report, Some(Banner::Error(e.to_string())))))
        }
    }
}

/// POST /api/upload - CSV as the request body
pub async fn api_upload(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<Report>, ApiError> {
    let run = process_upload(&state, "request body", &body).await?;
    Ok(Json(Report::from_result(&run.result, &state.report_config)))
}

async fn process_upload(
    state: &SharedState,
    name: &str,
    bytes: &[u8],
) -> Result<LatestRun, ApiError> {
    let records = parse_records_csv(bytes)?;
    info!("Upload '{}': {} records", name, records.len());
    Ok(state
        .process(records, format!("upload: {}", name), Vec::new())
        .await)
}

async fn read_file_field(mut multipart: Multipart) -> Result<(String, Bytes), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or("upload.csv").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        return Ok((name, bytes));
    }
    Err(ApiError::BadRequest(format!(
        "multipart field '{}' is missing",
        FILE_FIELD
    )))
}
