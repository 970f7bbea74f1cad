//! Concurrent POI fetching for clusters and noise sites

use futures::stream::{self, StreamExt};
use sitepoi_core::config::{FetchSettings, RetryPolicy};
use sitepoi_core::error::{Result, SitePoiError};
use sitepoi_core::models::{ClusterBoundingBox, PoiQuery, QueryTarget, RawPoi, Site};
use sitepoi_core::ports::PoiSource;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One query the coordinator will issue
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedQuery {
    pub target: QueryTarget,
    pub query: PoiQuery,
}

/// Merged results of the fetch stage
#[derive(Debug, Clone, Default)]
pub struct FetchResults {
    /// Raw elements per target; failed targets map to an empty list
    pub by_target: BTreeMap<QueryTarget, Vec<RawPoi>>,
    /// Targets whose query ultimately failed
    pub failed: Vec<QueryTarget>,
}

impl FetchResults {
    pub fn total_elements(&self) -> usize {
        self.by_target.values().map(Vec::len).sum()
    }
}

/// One bounding-box query per cluster, then one radius query per noise site
pub fn plan_queries(sites: &[Site], boxes: &[ClusterBoundingBox], radius_m: f64) -> Vec<PlannedQuery> {
    let clusters = boxes.iter().map(|bbox| PlannedQuery {
        target: QueryTarget::Cluster(bbox.cluster_id),
        query: PoiQuery::BoundingBox(*bbox),
    });

    let noise = sites.iter().filter(|s| s.is_noise()).map(|site| PlannedQuery {
        target: QueryTarget::Site(site.site_id.clone()),
        query: PoiQuery::Around { lat: site.lat, lon: site.lon, radius_m },
    });

    clusters.chain(noise).collect()
}

/// Issues planned queries against a `PoiSource` with bounded concurrency
pub struct FetchCoordinator {
    source: Arc<dyn PoiSource>,
    settings: FetchSettings,
}

impl FetchCoordinator {
    pub fn new(source: Arc<dyn PoiSource>, settings: FetchSettings) -> Self {
        Self { source, settings }
    }

    /// Run every query; a failed query contributes an empty result
    pub async fn fetch_all(&self, plan: &[PlannedQuery]) -> FetchResults {
        self.fetch_all_with_progress(plan, |_, _| {}).await
    }

    /// Run every query, reporting `(completed, total)` after each one finishes
    pub async fn fetch_all_with_progress<F>(&self, plan: &[PlannedQuery], mut progress: F) -> FetchResults
    where
        F: FnMut(usize, usize),
    {
        let total = plan.len();
        let concurrency = self.settings.max_concurrent_queries.max(1);

        info!(
            source = self.source.name(),
            queries = total,
            concurrency,
            "Fetching POIs"
        );

        let mut results = FetchResults::default();
        let mut pending = stream::iter(plan.iter().map(|planned| async move {
            let outcome = self.fetch_one(planned).await;
            (planned.target.clone(), outcome)
        }))
        .buffer_unordered(concurrency);

        let mut completed = 0;
        while let Some((target, outcome)) = pending.next().await {
            let elements = match outcome {
                Ok(elements) => elements,
                Err(e) => {
                    warn!(target_key = %target, error = %e, "POI query failed; using empty result");
                    results.failed.push(target.clone());
                    Vec::new()
                }
            };
            results.by_target.insert(target, elements);

            completed += 1;
            progress(completed, total);
        }

        results.failed.sort();
        info!(
            queries = total,
            failed = results.failed.len(),
            elements = results.total_elements(),
            "POI fetch complete"
        );

        results
    }

    async fn fetch_one(&self, planned: &PlannedQuery) -> Result<Vec<RawPoi>> {
        fetch_with_retry(self.source.as_ref(), planned, &self.settings.retry).await
    }
}

/// Call the source, retrying retryable failures with exponential backoff
async fn fetch_with_retry(
    source: &dyn PoiSource,
    planned: &PlannedQuery,
    policy: &RetryPolicy,
) -> Result<Vec<RawPoi>> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match source.fetch(&planned.query).await {
            Ok(elements) => {
                debug!(target_key = %planned.target, attempt, elements = elements.len(), "Query succeeded");
                return Ok(elements);
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let delay = policy.delay_after(attempt);
                debug!(
                    target_key = %planned.target,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retrying POI query"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(retarget(e, &planned.target)),
        }
    }
}

/// Attach the cluster or site the failed query belonged to
fn retarget(error: SitePoiError, target: &QueryTarget) -> SitePoiError {
    match error {
        SitePoiError::QueryFailure { kind, reason, .. } => {
            SitePoiError::query_failure(target.to_string(), kind, reason)
        }
        other => other,
    }
}
