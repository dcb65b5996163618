//! Request dispatcher — the single public `generate` path.
//!
//! Orchestrates catalog lookup, validation, the fingerprint cache, the
//! per-family adapters, cost computation, and metrics. Owns all mutable
//! state; construct one per process (or per test) and share it across
//! callers.
//!
//! Flow on `generate`: describe → validate → cache lookup → (hit:
//! return stored) | (miss: encode → invoke → decode → cost → store →
//! record). Validation and catalog errors fail before any external work;
//! provider errors propagate verbatim with their cause. Both record a
//! failure without touching the cache.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::adapter::Adapter;
use crate::cache::{fingerprint, CacheStats, FingerprintCache};
use crate::catalog::{ModelCatalog, ModelDescriptor};
use crate::config::GatewayConfig;
use crate::invoke::InvocationService;
use crate::stats::{MetricsAggregator, MetricsSnapshot};
use crate::telemetry;
use crate::types::{GenerateRequest, GenerateResponse, Usage};
use crate::Result;

/// Combined metrics + cache view backing the `get_stats` tool.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayStats {
    pub metrics: MetricsSnapshot,
    pub cache: CacheStats,
}

/// The dispatch core. One long-lived instance serves all callers.
pub struct Dispatcher {
    catalog: ModelCatalog,
    cache: FingerprintCache,
    metrics: MetricsAggregator,
    invoker: Arc<dyn InvocationService>,
}

impl Dispatcher {
    /// Build a dispatcher from explicit configuration and an invocation
    /// service. No globals; a fresh instance is fully isolated.
    pub fn new(config: &GatewayConfig, invoker: Arc<dyn InvocationService>) -> Self {
        Self {
            catalog: ModelCatalog::new(),
            cache: FingerprintCache::new(config),
            metrics: MetricsAggregator::new(config),
            invoker,
        }
    }

    /// Generate a completion for a canonical request.
    pub async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        let descriptor = match self.catalog.describe(&request.model) {
            Ok(d) => d,
            Err(e) => {
                self.record_failure(&request.model);
                return Err(e);
            }
        };

        if let Err(e) = crate::validate::validate(&request, descriptor) {
            warn!(model = %request.model, error = %e, "request rejected");
            self.record_failure(&request.model);
            return Err(e);
        }

        info!(
            model = %request.model,
            messages = request.messages.len(),
            temperature = request.temperature,
            max_tokens = request.max_tokens,
            "dispatching request"
        );

        let fp = fingerprint(&request);

        let lookup_start = Instant::now();
        if let Some(mut stored) = self.cache.get(&fp) {
            // Hit: identical request, so usage and cost are reused as
            // stored; only the cached flag and lookup latency change.
            stored.cached = true;
            stored.latency_ms = round2(lookup_start.elapsed().as_secs_f64() * 1000.0);

            metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
            self.record_success(descriptor, &stored, true);
            info!(model = %request.model, fingerprint = ?fp, "cache hit");
            return Ok(stored);
        }
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);

        let adapter = Adapter::for_family(descriptor.family);
        let payload = adapter.encode(&request, descriptor);

        // Latency covers the provider call through decode.
        let invoke_start = Instant::now();
        let raw = match self.invoker.invoke(&payload).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(model = %request.model, error = %e, "provider invocation failed");
                self.record_failure(&request.model);
                return Err(e);
            }
        };
        let decoded = match adapter.decode(&raw) {
            Ok(d) => d,
            Err(e) => {
                warn!(model = %request.model, error = %e, "provider response undecodable");
                self.record_failure(&request.model);
                return Err(e);
            }
        };
        let latency_ms = round2(invoke_start.elapsed().as_secs_f64() * 1000.0);

        let response = GenerateResponse {
            content: decoded.content,
            model: descriptor.name.to_string(),
            model_id: descriptor.model_id.to_string(),
            usage: decoded.usage,
            finish_reason: decoded.finish_reason,
            cached: false,
            latency_ms,
            estimated_cost_usd: estimate_cost(descriptor, decoded.usage),
        };

        self.cache.put(fp, response.clone());
        self.record_success(descriptor, &response, false);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
            "model" => descriptor.name,
        )
        .record(latency_ms / 1000.0);

        info!(
            model = %request.model,
            tokens = response.usage.total_tokens,
            cost_usd = response.estimated_cost_usd,
            latency_ms = response.latency_ms,
            "request complete"
        );

        Ok(response)
    }

    /// All catalog descriptors, in registration order.
    pub fn list_models(&self) -> &[ModelDescriptor] {
        self.catalog.list_all()
    }

    /// Snapshot of metrics and cache occupancy.
    pub fn stats(&self) -> GatewayStats {
        GatewayStats {
            metrics: self.metrics.snapshot(),
            cache: self.cache.stats(),
        }
    }

    fn record_success(&self, descriptor: &ModelDescriptor, response: &GenerateResponse, hit: bool) {
        self.metrics.record_request(
            descriptor.name,
            response.usage,
            response.estimated_cost_usd,
            response.latency_ms,
            hit,
        );
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "model" => descriptor.name,
            "status" => "ok",
        )
        .increment(1);
        metrics::counter!(telemetry::TOKENS_TOTAL,
            "model" => descriptor.name,
            "direction" => "input",
        )
        .increment(u64::from(response.usage.input_tokens));
        metrics::counter!(telemetry::TOKENS_TOTAL,
            "model" => descriptor.name,
            "direction" => "output",
        )
        .increment(u64::from(response.usage.output_tokens));
    }

    fn record_failure(&self, model: &str) {
        self.metrics.record_failure();
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "model" => model.to_owned(),
            "status" => "error",
        )
        .increment(1);
    }
}

/// Cost from catalog pricing and actual usage, rounded to microdollars
/// for reproducibility.
fn estimate_cost(descriptor: &ModelDescriptor, usage: Usage) -> f64 {
    let cost = f64::from(usage.input_tokens) / 1000.0 * descriptor.input_cost_per_1k
        + f64::from(usage.output_tokens) / 1000.0 * descriptor.output_cost_per_1k;
    (cost * 1_000_000.0).round() / 1_000_000.0
}

/// Round to two decimal places (reported latencies).
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
