//! Usage and cost aggregation.
//!
//! Concurrent-safe running totals over completed requests, broken down
//! per model, backing the `get_stats` tool. Counters only go up for the
//! process lifetime; failed requests land in a dedicated counter and
//! never inflate the success-oriented totals.
//!
//! This is the caller-visible accounting object. Process-level telemetry
//! (the [`metrics`] facade counters in [`crate::telemetry`]) is emitted
//! separately by the dispatcher.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;
use tracing::warn;

use crate::config::GatewayConfig;
use crate::types::Usage;

#[derive(Default)]
struct Totals {
    total_requests: u64,
    total_tokens: u64,
    total_cost_usd: f64,
    cache_hits: u64,
    cache_misses: u64,
    failed_requests: u64,
    latency_sum_ms: f64,
    requests_by_model: HashMap<String, u64>,
}

/// Read-only copy of the aggregator state, taken under a brief lock.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub total_tokens: u64,
    pub total_cost_usd: f64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub failed_requests: u64,
    /// `cache_hits / total_requests * 100`; 0 when no requests yet.
    pub cache_hit_rate_percent: f64,
    /// Running mean over successful requests; 0 when no requests yet.
    pub average_latency_ms: f64,
    pub requests_by_model: HashMap<String, u64>,
}

/// Concurrent-safe counters over requests, tokens, cost, and latency.
pub struct MetricsAggregator {
    enabled: bool,
    inner: Mutex<Totals>,
}

impl MetricsAggregator {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            enabled: config.metrics_enabled,
            inner: Mutex::new(Totals::default()),
        }
    }

    /// Fold one completed generation (hit or miss) into the totals.
    pub fn record_request(
        &self,
        model: &str,
        usage: Usage,
        cost_usd: f64,
        latency_ms: f64,
        cache_hit: bool,
    ) {
        if !self.enabled {
            return;
        }
        let Some(mut totals) = self.lock() else {
            return;
        };
        totals.total_requests += 1;
        totals.total_tokens += u64::from(usage.total_tokens);
        totals.total_cost_usd += cost_usd;
        totals.latency_sum_ms += latency_ms;
        if cache_hit {
            totals.cache_hits += 1;
        } else {
            totals.cache_misses += 1;
        }
        *totals
            .requests_by_model
            .entry(model.to_string())
            .or_insert(0) += 1;
    }

    /// Count a failed request. Kept apart from the success totals.
    pub fn record_failure(&self) {
        if !self.enabled {
            return;
        }
        if let Some(mut totals) = self.lock() {
            totals.failed_requests += 1;
        }
    }

    /// Take a consistent snapshot. Disabled aggregators report zeros.
    pub fn snapshot(&self) -> MetricsSnapshot {
        if !self.enabled {
            return MetricsSnapshot::default();
        }
        let Some(totals) = self.lock() else {
            return MetricsSnapshot::default();
        };

        let cache_hit_rate_percent = if totals.total_requests > 0 {
            totals.cache_hits as f64 / totals.total_requests as f64 * 100.0
        } else {
            0.0
        };
        let average_latency_ms = if totals.total_requests > 0 {
            totals.latency_sum_ms / totals.total_requests as f64
        } else {
            0.0
        };

        MetricsSnapshot {
            total_requests: totals.total_requests,
            total_tokens: totals.total_tokens,
            total_cost_usd: totals.total_cost_usd,
            cache_hits: totals.cache_hits,
            cache_misses: totals.cache_misses,
            failed_requests: totals.failed_requests,
            cache_hit_rate_percent,
            average_latency_ms,
            requests_by_model: totals.requests_by_model.clone(),
        }
    }

    fn lock(&self) -> Option<std::sync::MutexGuard<'_, Totals>> {
        match self.inner.lock() {
            Ok(guard) => Some(guard),
            Err(_) => {
                warn!("metrics lock poisoned; dropping sample");
                None
            }
        }
    }
}
