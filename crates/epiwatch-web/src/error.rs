//! API error type mapped to HTTP status codes and JSON bodies.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use epiwatch_common::EpiwatchError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request data (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Nothing to serve yet (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// The literature service failed (502)
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Pipeline(#[from] EpiwatchError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Pipeline(e) => match e {
                EpiwatchError::InvalidInput(_)
                | EpiwatchError::Csv(_)
                | EpiwatchError::MissingColumn(_) => StatusCode::BAD_REQUEST,
                EpiwatchError::Http(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn code(&self) -> &'static str {
        match self.status() {
            StatusCode::BAD_REQUEST => "bad_request",
            StatusCode::NOT_FOUND => "not_found",
            StatusCode::BAD_GATEWAY => "upstream_error",
            _ => "internal_error",
        }
    }
}

/// Search clients return `anyhow`; recover the typed cause where there is one.
/// Anything else came from the remote service.
impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast::<EpiwatchError>() {
            Ok(typed) => ApiError::Pipeline(typed),
            Err(e) => ApiError::Upstream(format!("{:#}", e)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, "{}", self);
        } else {
            tracing::debug!(status = %status, "{}", self);
        }
        let body = ErrorBody {
            error: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let missing = ApiError::from(EpiwatchError::MissingColumn("Abstract".into()));
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let invalid = ApiError::from(EpiwatchError::InvalidInput("empty".into()));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let io = ApiError::from(EpiwatchError::Io(std::io::Error::other("disk")));
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_anyhow_keeps_typed_cause() {
        let err = anyhow::Error::from(EpiwatchError::InvalidInput("search query is empty".into()));
        let api = ApiError::from(err);
        assert_eq!(api.status(), StatusCode::BAD_REQUEST);

        let api = ApiError::from(anyhow::anyhow!("PubMed esearch error: bad term"));
        assert_eq!(api.status(), StatusCode::BAD_GATEWAY);
    }
}
