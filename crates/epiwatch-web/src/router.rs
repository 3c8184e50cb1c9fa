//! Axum router: maps all URL paths to handlers.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::sync::Arc;
use crate::state::{AppState, SharedState};
use crate::handlers::{
    dashboard::dashboard,
    report::{api_report, download_csv},
    search::{api_search, search_form},
    upload::{api_upload, upload_form},
};

/// Largest accepted upload body.
pub const UPLOAD_LIMIT_BYTES: usize = 50 * 1024 * 1024;

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Pages
        .route("/",       get(dashboard))
        .route("/upload", post(upload_form))
        .route("/search", post(search_form))

        // API endpoints
        .route("/api/upload", post(api_upload))
        .route("/api/search", post(api_search))
        .route("/api/report", get(api_report))

        // Export
        .route("/download/clinical_triplets.csv", get(download_csv))

        // Middleware
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
