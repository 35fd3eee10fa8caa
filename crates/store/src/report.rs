use logstat_core::Result;
use logstat_core::filter::{CountFilter, REPORTED_METHODS};
use logstat_core::stats::{LogStats, MethodCount, StatsRequest};

use crate::LogStore;

pub async fn collect_stats<S: LogStore>(store: &S, req: &StatsRequest) -> Result<LogStats> {
    let total = store.count(&CountFilter::all()).await?;

    let mut methods = Vec::with_capacity(REPORTED_METHODS.len());
    for method in REPORTED_METHODS {
        let count = store.count(&CountFilter::method(&method)).await?;
        methods.push(MethodCount { method, count });
    }

    let status_checks = store.count(&CountFilter::status_check()).await?;

    let top_ips = match req.top_ips {
        Some(limit) => Some(store.top_values("ip", limit).await?),
        None => None,
    };

    tracing::debug!(ns = store.namespace(), total, status_checks, "collected stats");
    Ok(LogStats {
        total,
        methods,
        status_checks,
        top_ips,
    })
}
