/// Outbound rendering of normalized rows as GeoJSON, JSON or CSV
use crate::errors::{ApiError, ApiResult};
use crate::normalizer::{Row, Schema};
use crate::parser::Format;
use serde_json::{json, Map, Value};

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Separator for list values flattened into a single CSV cell
const CSV_LIST_SEPARATOR: &str = "\t";

/// Response body plus its content type
#[derive(Debug)]
pub struct Rendered {
    pub content_type: &'static str,
    pub body: String,
}

pub fn serialize_rows(format: Format, schema: Schema, rows: &[Row]) -> ApiResult<Rendered> {
    match format {
        Format::GeoJson => to_json_body(feature_collection(schema, rows)),
        Format::Json => to_json_body(json!({
            "points": rows.iter().map(row_object).collect::<Vec<_>>()
        })),
        Format::Csv => Ok(Rendered {
            content_type: CSV_CONTENT_TYPE,
            body: csv_table(schema, rows),
        }),
    }
}

fn to_json_body(doc: Value) -> ApiResult<Rendered> {
    let body = serde_json::to_string(&doc)
        .map_err(|e| ApiError::Internal(format!("failed to encode response: {}", e)))?;
    Ok(Rendered {
        content_type: JSON_CONTENT_TYPE,
        body,
    })
}

fn row_object(row: &Row) -> Value {
    Value::Object(row.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
}

fn feature_collection(schema: Schema, rows: &[Row]) -> Value {
    let features: Vec<Value> = rows
        .iter()
        .map(|row| {
            let coord = |key| row.get(key).and_then(Value::as_f64);
            let properties: Map<String, Value> = row
                .iter()
                .filter(|(k, _)| *k != "longitude" && *k != "latitude")
                .filter(|(_, v)| schema != Schema::Summary || v.as_str() != Some(""))
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect();

            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [coord("longitude"), coord("latitude")]
                },
                "properties": properties
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features
    })
}

/// Positional, unquoted CSV: separators inside values are not escaped
fn csv_table(schema: Schema, rows: &[Row]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(schema.fields().join(","));
    for row in rows {
        let cells: Vec<String> = row.iter().map(|(_, v)| csv_cell(v)).collect();
        lines.push(cells.join(","));
    }
    lines.join("\n")
}

fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match (n.as_u64(), n.as_i64(), n.as_f64()) {
            (Some(u), _, _) => u.to_string(),
            (_, Some(i), _) => i.to_string(),
            (_, _, Some(f)) => f.to_string(),
            _ => n.to_string(),
        },
        Value::Array(items) => items
            .iter()
            .map(csv_cell)
            .collect::<Vec<_>>()
            .join(CSV_LIST_SEPARATOR),
        other => other.to_string(),
    }
}
