/// Fixed output schemas for summary and identifiers results
use crate::domain::{IdentifiersResult, Point, SummaryOutcome, SummaryResult};
use serde_json::{json, Value};

/// Summary fields in output order; also the CSV header
pub const SUMMARY_FIELDS: [&str; 9] = [
    "latitude",
    "longitude",
    "date",
    "startDate",
    "endDate",
    "images",
    "imageCount",
    "latestImage",
    "latestImageAcquired",
];

pub const IDENTIFIERS_FIELDS: [&str; 4] = ["longitude", "latitude", "count", "identifiers"];

const NO_RESULTS: &str = "no results";
const NO_RESULT: &str = "no result";

/// Which output schema a batch follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    Summary,
    Identifiers,
}

impl Schema {
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Schema::Summary => &SUMMARY_FIELDS,
            Schema::Identifiers => &IDENTIFIERS_FIELDS,
        }
    }
}

/// One output record: every schema field, in schema order, null when unset
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<(&'static str, Value)>,
}

impl Row {
    fn with_schema(schema: Schema) -> Self {
        Self {
            values: schema.fields().iter().map(|f| (*f, Value::Null)).collect(),
        }
    }

    fn set(&mut self, field: &str, value: impl Into<Value>) {
        if let Some(slot) = self.values.iter_mut().find(|(f, _)| *f == field) {
            slot.1 = value.into();
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.iter().find(|(f, _)| *f == field).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.values.iter().map(|(f, v)| (*f, v))
    }

    fn set_point(&mut self, point: &Point) {
        self.set("longitude", point.longitude);
        self.set("latitude", point.latitude);
    }
}

pub fn normalize_summary(results: Vec<SummaryResult>) -> Vec<Row> {
    results
        .into_iter()
        .map(|SummaryResult { point, outcome }| {
            let mut row = Row::with_schema(Schema::Summary);
            row.set_point(&point);
            row.set("date", point.date);
            row.set("startDate", point.start_date);
            row.set("endDate", point.end_date);

            match outcome {
                SummaryOutcome::Images(urls) if urls.is_empty() => row.set("images", NO_RESULTS),
                SummaryOutcome::Images(urls) => row.set("images", urls),
                SummaryOutcome::ImageCount(n) => row.set("imageCount", n),
                SummaryOutcome::Latest(Some(latest)) => {
                    row.set("latestImage", latest.url);
                    row.set("latestImageAcquired", latest.acquired);
                }
                SummaryOutcome::Latest(None) => row.set("latestImage", NO_RESULT),
            }
            row
        })
        .collect()
}

pub fn normalize_identifiers(results: Vec<IdentifiersResult>) -> Vec<Row> {
    results
        .into_iter()
        .map(|result| {
            let mut row = Row::with_schema(Schema::Identifiers);
            row.set_point(&result.point);
            row.set("count", result.count);
            row.set("identifiers", json!(result.identifiers));
            row
        })
        .collect()
}
