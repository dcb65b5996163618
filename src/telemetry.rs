//! Telemetry metric name constants.
//!
//! Centralised metric names for brokkr operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `brokkr_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `model` — model short name (e.g. "nova-pro")
//! - `status` — outcome: "ok" or "error"
//! - `direction` — token direction: "input" or "output"

/// Total generate requests dispatched.
///
/// Labels: `model`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "brokkr_requests_total";

/// Provider invocation duration in seconds (cache misses only).
///
/// Labels: `model`.
pub const REQUEST_DURATION_SECONDS: &str = "brokkr_request_duration_seconds";

/// Total tokens consumed.
///
/// Labels: `model`, `direction` ("input" | "output").
pub const TOKENS_TOTAL: &str = "brokkr_tokens_total";

/// Total fingerprint cache hits.
pub const CACHE_HITS_TOTAL: &str = "brokkr_cache_hits_total";

/// Total fingerprint cache misses.
pub const CACHE_MISSES_TOTAL: &str = "brokkr_cache_misses_total";
