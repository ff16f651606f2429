/// Per-point catalog queries and batch fan-out
use crate::clients::{
    date_query_form, identifiers_query_form, latest_query_form, range_query_form, CatalogClient,
};
use crate::domain::{
    CatalogResponse, IdentifiersResult, LatestImage, Point, QueryMode, SummaryOutcome,
    SummaryResult,
};
use crate::errors::ApiResult;
use crate::utils::{collect_time, human_time};
use futures::{stream, StreamExt, TryStreamExt};
use std::future::Future;
use tracing::{debug, info};

/// Catalog query service
pub struct CatalogService {
    client: CatalogClient,
    max_concurrency: usize,
}

impl CatalogService {
    pub fn new(client: CatalogClient, max_concurrency: usize) -> Self {
        Self {
            client,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Summarize every point; one failure fails the batch
    pub async fn summarize(&self, points: Vec<Point>) -> ApiResult<Vec<SummaryResult>> {
        let total = points.len();
        let results = self.fan_out(points, |p| self.summarize_point(p)).await?;
        info!("Summarized {} points", total);
        Ok(results)
    }

    /// Collect image identifiers for every point; one failure fails the batch
    pub async fn identify(&self, points: Vec<Point>) -> ApiResult<Vec<IdentifiersResult>> {
        let total = points.len();
        let results = self.fan_out(points, |p| self.identify_point(p)).await?;
        info!("Collected identifiers for {} points", total);
        Ok(results)
    }

    /// Run at most `max_concurrency` queries at a time, keeping input order
    async fn fan_out<T, F, Fut>(&self, points: Vec<Point>, query: F) -> ApiResult<Vec<T>>
    where
        F: Fn(Point) -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        stream::iter(points)
            .map(query)
            .buffered(self.max_concurrency)
            .try_collect()
            .await
    }

    pub async fn summarize_point(&self, point: Point) -> ApiResult<SummaryResult> {
        let outcome = match point.query_mode() {
            QueryMode::Date(date) => {
                debug!("Images on {} at ({}, {})", date, point.longitude, point.latitude);
                let resp = self.client.query(&date_query_form(&point, date)?).await?;
                images_outcome(resp)?
            }
            QueryMode::Range { start, end } => {
                debug!(
                    "Image count {}..{} at ({}, {})",
                    start, end, point.longitude, point.latitude
                );
                let resp = self
                    .client
                    .query(&range_query_form(&point, start, end)?)
                    .await?;
                SummaryOutcome::ImageCount(resp.count.unwrap_or(0))
            }
            QueryMode::Latest => {
                debug!("Latest image at ({}, {})", point.longitude, point.latitude);
                let resp = self.client.query(&latest_query_form(&point)).await?;
                latest_outcome(resp)?
            }
        };

        Ok(SummaryResult { point, outcome })
    }

    pub async fn identify_point(&self, point: Point) -> ApiResult<IdentifiersResult> {
        debug!("Identifiers at ({}, {})", point.longitude, point.latitude);
        let resp = self.client.query(&identifiers_query_form(&point)).await?;
        identifiers_result(point, resp)
    }
}

fn images_outcome(resp: CatalogResponse) -> ApiResult<SummaryOutcome> {
    Ok(SummaryOutcome::Images(
        resp.into_features()?
            .into_iter()
            .filter_map(|f| f.attributes.browse_url)
            .collect(),
    ))
}

fn latest_outcome(resp: CatalogResponse) -> ApiResult<SummaryOutcome> {
    let latest = resp.into_features()?.into_iter().next().map(|feature| {
        let attrs = feature.attributes;
        LatestImage {
            url: attrs.browse_url.unwrap_or_default(),
            acquired: attrs
                .collect_time_start
                .as_ref()
                .and_then(collect_time)
                .map(human_time),
        }
    });
    Ok(SummaryOutcome::Latest(latest))
}

/// Every returned feature counts and keeps its slot, even without an identifier
fn identifiers_result(point: Point, resp: CatalogResponse) -> ApiResult<IdentifiersResult> {
    let identifiers: Vec<Option<String>> = resp
        .into_features()?
        .into_iter()
        .map(|f| f.attributes.image_identifier)
        .collect();

    Ok(IdentifiersResult {
        point,
        count: identifiers.len(),
        identifiers,
    })
}
