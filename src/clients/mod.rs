/// Imagery catalog client and query form builders
use crate::config::CatalogConfig;
use crate::domain::{CatalogResponse, Point};
use crate::errors::{ApiError, ApiResult};
use crate::utils::{day_bounds, parse_instant, CATALOG_TIME_FORMAT};
use chrono::NaiveDateTime;
use reqwest::Client;
use std::time::Duration;

/// URL-encoded form fields of one catalog query
pub type QueryForm = Vec<(&'static str, String)>;

/// HTTP client wrapper with common configuration
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("point-imagery-service/1.0")
            .build()?;
        Ok(Self { client })
    }

    pub fn get_client(&self) -> &Client {
        &self.client
    }
}

/// Imagery catalog query client
pub struct CatalogClient {
    http_client: HttpClient,
    api_url: String,
    api_key: String,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig) -> ApiResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(Duration::from_secs(config.timeout_seconds))?,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// POST one query; non-2xx answers and `error` replies are errors
    pub async fn query(&self, form: &QueryForm) -> ApiResult<CatalogResponse> {
        let resp = self
            .http_client
            .get_client()
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .form(form)
            .send()
            .await?
            .error_for_status()?;

        let json: CatalogResponse = resp.json().await?;
        if let Some(fault) = &json.error {
            return Err(ApiError::Catalog(format!(
                "{} (code {})",
                fault.message.as_deref().unwrap_or("unknown error"),
                fault.code.map_or_else(|| "none".to_string(), |c| c.to_string())
            )));
        }
        Ok(json)
    }
}

/// Fields shared by every query: a WGS84 point and a "contains" relation
fn spatial_form(point: &Point, out_fields: &str) -> QueryForm {
    let geometry = serde_json::json!({
        "x": point.longitude,
        "y": point.latitude,
        "spatialReference": { "wkid": 4326 }
    });

    vec![
        ("f", "json".to_string()),
        ("returnGeometry", "false".to_string()),
        ("outFields", out_fields.to_string()),
        ("spatialRel", "esriSpatialRelContains".to_string()),
        ("geometryType", "esriGeometryPoint".to_string()),
        ("geometry", geometry.to_string()),
    ]
}

fn where_between(start: NaiveDateTime, end: NaiveDateTime) -> String {
    format!(
        "collect_time_start >= '{}' AND collect_time_start <= '{}'",
        start.format(CATALOG_TIME_FORMAT),
        end.format(CATALOG_TIME_FORMAT)
    )
}

fn instant(s: &str) -> ApiResult<NaiveDateTime> {
    parse_instant(s).ok_or_else(|| ApiError::Parse(format!("unrecognised date '{}'", s)))
}

/// Every image captured on the calendar day of `date`
pub fn date_query_form(point: &Point, date: &str) -> ApiResult<QueryForm> {
    let (start, end) = day_bounds(instant(date)?);
    let mut form = spatial_form(point, "browse_url");
    form.push(("where", where_between(start, end)));
    Ok(form)
}

/// Number of images captured between two instants
pub fn range_query_form(point: &Point, start: &str, end: &str) -> ApiResult<QueryForm> {
    let mut form = spatial_form(point, "browse_url");
    form.push(("returnCountOnly", "true".to_string()));
    form.push(("where", where_between(instant(start)?, instant(end)?)));
    Ok(form)
}

/// The single most recent image
pub fn latest_query_form(point: &Point) -> QueryForm {
    let mut form = spatial_form(point, "browse_url, collect_time_start");
    form.push(("resultRecordCount", "1".to_string()));
    form.push(("orderByFields", "collect_time_start DESC".to_string()));
    form
}

pub fn identifiers_query_form(point: &Point) -> QueryForm {
    spatial_form(point, "image_identifier")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field<'a>(form: &'a QueryForm, key: &str) -> Option<&'a str> {
        form.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_spatial_filter_fields() {
        let form = identifiers_query_form(&Point::new(10.5, -20.0));
        assert_eq!(field(&form, "f"), Some("json"));
        assert_eq!(field(&form, "spatialRel"), Some("esriSpatialRelContains"));
        assert_eq!(field(&form, "geometryType"), Some("esriGeometryPoint"));
        assert_eq!(field(&form, "outFields"), Some("image_identifier"));
        assert_eq!(field(&form, "where"), None);

        let geometry: serde_json::Value =
            serde_json::from_str(field(&form, "geometry").unwrap()).unwrap();
        assert_eq!(geometry["x"], 10.5);
        assert_eq!(geometry["y"], -20.0);
        assert_eq!(geometry["spatialReference"]["wkid"], 4326);
    }

    #[test]
    fn test_date_query_spans_whole_day() {
        let form = date_query_form(&Point::new(1.0, 2.0), "2020-05-06").unwrap();
        assert_eq!(
            field(&form, "where"),
            Some("collect_time_start >= '2020-05-06 00:00:00' AND collect_time_start <= '2020-05-06 23:59:59'")
        );
        assert_eq!(field(&form, "outFields"), Some("browse_url"));
        assert_eq!(field(&form, "returnCountOnly"), None);
    }

    #[test]
    fn test_date_query_with_time_still_spans_day() {
        let form = date_query_form(&Point::new(1.0, 2.0), "2020-05-06 13:45:00").unwrap();
        assert!(field(&form, "where").unwrap().contains("'2020-05-06 00:00:00'"));
        assert!(field(&form, "where").unwrap().contains("'2020-05-06 23:59:59'"));
    }

    #[test]
    fn test_range_query_counts_only() {
        let form = range_query_form(&Point::new(1.0, 2.0), "2019-01-01", "2019-12-31 12:00:00")
            .unwrap();
        assert_eq!(field(&form, "returnCountOnly"), Some("true"));
        assert_eq!(
            field(&form, "where"),
            Some("collect_time_start >= '2019-01-01 00:00:00' AND collect_time_start <= '2019-12-31 12:00:00'")
        );
    }

    #[test]
    fn test_latest_query_orders_by_acquisition() {
        let form = latest_query_form(&Point::new(1.0, 2.0));
        assert_eq!(field(&form, "resultRecordCount"), Some("1"));
        assert_eq!(field(&form, "orderByFields"), Some("collect_time_start DESC"));
        assert_eq!(field(&form, "outFields"), Some("browse_url, collect_time_start"));
    }

    #[test]
    fn test_bad_date_is_parse_error() {
        assert!(matches!(
            date_query_form(&Point::new(1.0, 2.0), "someday"),
            Err(ApiError::Parse(_))
        ));
    }
}
