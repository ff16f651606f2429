/// Domain models for the application
use crate::errors::{ApiError, ApiResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One input coordinate with its optional date filters
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub longitude: f64,
    pub latitude: f64,
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Catalog query variant selected by the dates present on a point
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryMode<'a> {
    Date(&'a str),
    Range { start: &'a str, end: &'a str },
    Latest,
}

impl Point {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            date: None,
            start_date: None,
            end_date: None,
        }
    }

    /// A single date wins over a range; neither means "latest image"
    pub fn query_mode(&self) -> QueryMode<'_> {
        fn present(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.is_empty())
        }

        if let Some(date) = present(&self.date) {
            return QueryMode::Date(date);
        }
        match (present(&self.start_date), present(&self.end_date)) {
            (Some(start), Some(end)) => QueryMode::Range { start, end },
            _ => QueryMode::Latest,
        }
    }
}

/// Most recent image covering a point
#[derive(Debug, Clone, PartialEq)]
pub struct LatestImage {
    pub url: String,
    pub acquired: Option<String>,
}

/// Catalog-derived part of a summary, one variant per query mode
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryOutcome {
    /// Browse URLs captured on the requested day; empty renders as "no results"
    Images(Vec<String>),
    ImageCount(u64),
    /// `None` when the catalog has nothing covering the point
    Latest(Option<LatestImage>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryResult {
    pub point: Point,
    pub outcome: SummaryOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentifiersResult {
    pub point: Point,
    pub count: usize,
    /// One slot per returned feature; `None` where the feature had no identifier
    pub identifiers: Vec<Option<String>>,
}

/// Catalog query response; only `count` and `features` are consumed
#[derive(Debug, Default, Deserialize)]
pub struct CatalogResponse {
    #[serde(default)]
    pub count: Option<u64>,
    /// Absent on count-only answers and on error replies
    #[serde(default)]
    pub features: Option<Vec<CatalogFeature>>,
    /// Catalogs report failures as HTTP 200 with an `error` member
    #[serde(default)]
    pub error: Option<CatalogFault>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogFault {
    pub code: Option<i64>,
    pub message: Option<String>,
}

impl CatalogResponse {
    /// Features of a non-count query; a reply without them is a catalog failure
    pub fn into_features(self) -> ApiResult<Vec<CatalogFeature>> {
        self.features
            .ok_or_else(|| ApiError::Catalog("response has no features array".to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogFeature {
    #[serde(default)]
    pub attributes: CatalogAttributes,
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogAttributes {
    pub browse_url: Option<String>,
    /// Date string or epoch milliseconds depending on the catalog
    pub collect_time_start: Option<Value>,
    pub image_identifier: Option<String>,
}

/// Health check response
#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub now: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point_with(date: Option<&str>, start: Option<&str>, end: Option<&str>) -> Point {
        Point {
            date: date.map(String::from),
            start_date: start.map(String::from),
            end_date: end.map(String::from),
            ..Point::new(1.0, 2.0)
        }
    }

    #[test]
    fn test_date_takes_priority_over_range() {
        let p = point_with(Some("2020-01-01"), Some("2019-01-01"), Some("2019-12-31"));
        assert_eq!(p.query_mode(), QueryMode::Date("2020-01-01"));
    }

    #[test]
    fn test_range_needs_both_ends() {
        let p = point_with(None, Some("2019-01-01"), None);
        assert_eq!(p.query_mode(), QueryMode::Latest);

        let p = point_with(None, Some("2019-01-01"), Some("2019-12-31"));
        assert_eq!(
            p.query_mode(),
            QueryMode::Range {
                start: "2019-01-01",
                end: "2019-12-31"
            }
        );
    }

    #[test]
    fn test_empty_date_counts_as_absent() {
        let p = point_with(Some(""), None, None);
        assert_eq!(p.query_mode(), QueryMode::Latest);
    }

    #[test]
    fn test_catalog_response_tolerates_missing_fields() {
        let resp: CatalogResponse = serde_json::from_str(r#"{"features":[{}]}"#).unwrap();
        assert_eq!(resp.count, None);
        let features = resp.into_features().unwrap();
        assert_eq!(features.len(), 1);
        assert!(features[0].attributes.browse_url.is_none());

        let resp: CatalogResponse = serde_json::from_str(r#"{"count":12}"#).unwrap();
        assert_eq!(resp.count, Some(12));
    }

    #[test]
    fn test_missing_features_is_catalog_error() {
        let resp: CatalogResponse = serde_json::from_str(r#"{"count":12}"#).unwrap();
        assert!(matches!(resp.into_features(), Err(ApiError::Catalog(_))));
    }

    #[test]
    fn test_error_member_is_read() {
        let resp: CatalogResponse =
            serde_json::from_str(r#"{"error":{"code":498,"message":"Invalid token"}}"#).unwrap();
        let fault = resp.error.unwrap();
        assert_eq!(fault.code, Some(498));
        assert_eq!(fault.message.as_deref(), Some("Invalid token"));
    }
}
