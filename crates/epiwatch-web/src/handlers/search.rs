//! PubMed search: dashboard form and JSON API.

use axum::{extract::State, http::StatusCode, response::Html, Form, Json};
use chrono::NaiveDate;
use epiwatch_ingestion::models::DEFAULT_MAX_RESULTS;
use epiwatch_ingestion::sources::LiteratureSource;
use epiwatch_ingestion::SearchParams;
use epiwatch_triplets::Report;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::handlers::dashboard::{render_page, Banner};
use crate::state::{LatestRun, SharedState};

/// HTML form fields. Date inputs submit an empty string when left blank.
#[derive(Debug, Deserialize)]
pub struct SearchForm {
    pub query: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub max_results: String,
}

impl SearchForm {
    pub fn into_params(self) -> Result<SearchParams, ApiError> {
        let max_results = match self.max_results.trim() {
            "" => DEFAULT_MAX_RESULTS,
            raw => raw
                .parse()
                .map_err(|_| ApiError::BadRequest(format!("invalid max results '{}'", raw)))?,
        };
        Ok(SearchParams::new(self.query.trim())
            .with_dates(parse_form_date(&self.start_date)?, parse_form_date(&self.end_date)?)
            .with_max_results(max_results))
    }
}

fn parse_form_date(raw: &str) -> Result<Option<NaiveDate>, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ApiError::BadRequest(format!("invalid date '{}', expected YYYY-MM-DD", raw)))
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub ids_found: usize,
    pub records: usize,
    pub warnings: Vec<String>,
    pub report: Report,
}

/// POST /search - dashboard form
pub async fn search_form(
    State(state): State<SharedState>,
    Form(form): Form<SearchForm>,
) -> (StatusCode, Html<String>) {
    let outcome = match form.into_params() {
        Ok(params) => run_search(&state, &params).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok((ids_found, run)) => {
            let report = Report::from_result(&run.result, &state.report_config);
            let banner = Banner::Info(format!(
                "PubMed returned {} id(s); {} abstract(s) processed into {} triplet(s).",
                ids_found, run.records, report.total_triplets
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

/// POST /api/search - JSON search parameters
pub async fn api_search(
    State(state): State<SharedState>,
    Json(params): Json<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let (ids_found, run) = run_search(&state, &params).await?;
    let report = Report::from_result(&run.result, &state.report_config);
    Ok(Json(SearchResponse {
        ids_found,
        records: run.records,
        warnings: run.warnings,
        report,
    }))
}

async fn run_search(
    state: &SharedState,
    params: &SearchParams,
) -> Result<(usize, LatestRun), ApiError> {
    let outcome = state.source.search(params).await?;
    let run = state
        .process(
            outcome.records,
            format!("search: {}", params.query),
            outcome.warnings,
        )
        .await;
    Ok((outcome.ids_found, run))
}
