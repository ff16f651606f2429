/// Unified error handling module
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Unified error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid input body: {0}")]
    Parse(String),
    #[error("Catalog API error: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("Catalog API error: {0}")]
    Catalog(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<csv::Error> for ApiError {
    fn from(err: csv::Error) -> Self {
        ApiError::Parse(format!("malformed CSV: {}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            // Caller-correctable errors answer with plain text
            ApiError::Validation(msg) => {
                warn!("rejected request: {}", msg);
                return plain_text(StatusCode::BAD_REQUEST, msg.clone());
            }
            ApiError::Parse(_) => {
                warn!("{}", self);
                return plain_text(StatusCode::BAD_REQUEST, self.to_string());
            }
            ApiError::Upstream(e) => {
                let code = match e.status().map(|s| s.as_u16()) {
                    Some(403) => "UPSTREAM_403",
                    Some(404) => "UPSTREAM_404",
                    Some(429) => "UPSTREAM_429",
                    Some(500..=599) => "UPSTREAM_5XX",
                    _ if e.is_timeout() => "UPSTREAM_TIMEOUT",
                    _ => "UPSTREAM_ERROR",
                };
                (StatusCode::BAD_GATEWAY, code)
            }
            ApiError::Catalog(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        error!("{}", self);

        let error_response = ErrorResponse {
            ok: false,
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(error_response)).into_response()
    }
}

fn plain_text(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_bad_request() {
        let resp = ApiError::Validation("nope".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn test_parse_is_bad_request() {
        let resp = ApiError::Parse("ragged row".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_catalog_fault_is_bad_gateway() {
        let resp = ApiError::Catalog("Invalid token".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_internal_is_server_error() {
        let resp = ApiError::Internal("boom".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
