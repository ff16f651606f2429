/// Inbound body parsing: GeoJSON, CSV or JSON into points
use crate::domain::Point;
use crate::errors::{ApiError, ApiResult};
use crate::utils::{finite_f64, num, s_pick};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Wire formats accepted on input and produced on output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    GeoJson,
    Csv,
    Json,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::GeoJson, Format::Csv, Format::Json];

    pub fn as_str(self) -> &'static str {
        match self {
            Format::GeoJson => "geojson",
            Format::Csv => "csv",
            Format::Json => "json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or(())
    }
}

/// Parse a request body into points, keeping input order
pub fn parse_points(format: Format, body: &str) -> ApiResult<Vec<Point>> {
    match format {
        Format::GeoJson => parse_geojson(body),
        Format::Csv => parse_csv(body),
        Format::Json => parse_json(body),
    }
}

fn parse_geojson(body: &str) -> ApiResult<Vec<Point>> {
    let doc: Value = serde_json::from_str(body)
        .map_err(|e| ApiError::Parse(format!("invalid GeoJSON: {}", e)))?;

    if doc.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return Err(ApiError::Parse("expected a GeoJSON FeatureCollection".into()));
    }
    let features = doc
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::Parse("FeatureCollection has no features array".into()))?;

    features
        .iter()
        .enumerate()
        .map(|(i, feature)| {
            let coords = feature
                .pointer("/geometry/coordinates")
                .and_then(Value::as_array)
                .ok_or_else(|| ApiError::Parse(format!("feature {} has no coordinates", i)))?;
            let (longitude, latitude) = match coords.as_slice() {
                [lon, lat, ..] => (num(lon), num(lat)),
                _ => (None, None),
            };
            let (Some(longitude), Some(latitude)) = (longitude, latitude) else {
                return Err(ApiError::Parse(format!(
                    "feature {} needs numeric [longitude, latitude]",
                    i
                )));
            };

            let empty = Value::Object(Map::new());
            let props = feature.get("properties").unwrap_or(&empty);
            Ok(with_dates(Point::new(longitude, latitude), props))
        })
        .collect()
}

fn parse_json(body: &str) -> ApiResult<Vec<Point>> {
    let doc: Value =
        serde_json::from_str(body).map_err(|e| ApiError::Parse(format!("invalid JSON: {}", e)))?;
    let points = doc
        .get("points")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::Parse("expected an object with a points array".into()))?;

    points
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let coord = |key: &str| {
                raw.get(key).and_then(num).ok_or_else(|| {
                    ApiError::Parse(format!("point {} has no numeric {}", i, key))
                })
            };
            Ok(with_dates(Point::new(coord("longitude")?, coord("latitude")?), raw))
        })
        .collect()
}

/// Header row names the fields; empty cells are left off the record
fn parse_csv(body: &str) -> ApiResult<Vec<Point>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());
    let headers = reader.headers()?.clone();

    let mut points = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row: HashMap<&str, &str> = headers
            .iter()
            .zip(record.iter())
            .filter(|(_, cell)| !cell.is_empty())
            .collect();

        let coord = |key: &str| {
            row.get(key)
                .and_then(|v| finite_f64(v))
                .ok_or_else(|| ApiError::Parse(format!("row {} has no numeric {}", i + 1, key)))
        };
        let text = |key: &str| row.get(key).map(|v| v.to_string());

        points.push(Point {
            date: text("date"),
            start_date: text("startDate"),
            end_date: text("endDate"),
            ..Point::new(coord("longitude")?, coord("latitude")?)
        });
    }

    Ok(points)
}

fn with_dates(point: Point, props: &Value) -> Point {
    Point {
        date: s_pick(props, "date"),
        start_date: s_pick(props, "startDate"),
        end_date: s_pick(props, "endDate"),
        ..point
    }
}
