/// HTTP request handlers
use crate::domain::Health;
use crate::errors::{ApiError, ApiResult};
use crate::normalizer::{normalize_identifiers, normalize_summary, Schema};
use crate::parser::{parse_points, Format};
use crate::serializer::{serialize_rows, Rendered};
use crate::services::CatalogService;
use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

const USAGE: &str = "input and output query params with value 'geojson', 'csv' or 'json' required";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog_service: Arc<CatalogService>,
}

/// `?input=..&output=..` on both endpoints
#[derive(Debug, Deserialize)]
pub struct FormatParams {
    pub input: Option<String>,
    pub output: Option<String>,
}

impl FormatParams {
    fn resolve(&self) -> ApiResult<(Format, Format)> {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.parse::<Format>().ok());
        match (parse(&self.input), parse(&self.output)) {
            (Some(input), Some(output)) => Ok((input, output)),
            _ => Err(ApiError::Validation(USAGE.to_string())),
        }
    }
}

/// Health check handler
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        now: Utc::now(),
    })
}

/// Per-point imagery summary
pub async fn summary(
    State(state): State<AppState>,
    Query(params): Query<FormatParams>,
    body: String,
) -> Result<Response, ApiError> {
    let (input, output) = params.resolve()?;
    let points = parse_points(input, &body)?;
    info!("summary: {} points, {} -> {}", points.len(), input, output);

    let results = state.catalog_service.summarize(points).await?;
    let rows = normalize_summary(results);
    Ok(respond(serialize_rows(output, Schema::Summary, &rows)?))
}

/// Image identifiers intersecting each point
pub async fn identifiers(
    State(state): State<AppState>,
    Query(params): Query<FormatParams>,
    body: String,
) -> Result<Response, ApiError> {
    let (input, output) = params.resolve()?;
    let points = parse_points(input, &body)?;
    info!("identifiers: {} points, {} -> {}", points.len(), input, output);

    let results = state.catalog_service.identify(points).await?;
    let rows = normalize_identifiers(results);
    Ok(respond(serialize_rows(output, Schema::Identifiers, &rows)?))
}

fn respond(rendered: Rendered) -> Response {
    ([(header::CONTENT_TYPE, rendered.content_type)], rendered.body).into_response()
}
