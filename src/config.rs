//! Gateway configuration.
//!
//! A single immutable value assembled once at startup from environment
//! variables and threaded explicitly into the cache, metrics, and invoker
//! constructors. No component reads the environment on its own.

use std::env;

use crate::{BrokkrError, Result};

/// Recognized environment variables.
const ENV_CACHE_ENABLED: &str = "CACHE_ENABLED";
const ENV_CACHE_TTL: &str = "CACHE_TTL";
const ENV_CACHE_MAX_SIZE: &str = "CACHE_MAX_SIZE";
const ENV_METRICS_ENABLED: &str = "METRICS_ENABLED";
const ENV_AWS_REGION: &str = "AWS_REGION";
const ENV_BEDROCK_API_KEY: &str = "AWS_BEARER_TOKEN_BEDROCK";

/// Immutable gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// When false, cache `get`/`put` are no-ops and every request misses.
    pub cache_enabled: bool,
    /// Entry time-to-live in seconds.
    pub cache_ttl_secs: u64,
    /// Maximum number of cached entries.
    pub cache_max_size: usize,
    /// When false, metrics recording is a no-op and snapshots are zero.
    pub metrics_enabled: bool,
    /// AWS region hosting the Bedrock runtime.
    pub aws_region: String,
    /// Bedrock API key (bearer token) for the concrete invoker.
    pub bedrock_api_key: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_ttl_secs: 3600,
            cache_max_size: 1000,
            metrics_enabled: true,
            aws_region: "us-east-1".to_string(),
            bedrock_api_key: None,
        }
    }
}

impl GatewayConfig {
    /// Assemble configuration from the process environment.
    ///
    /// Unset variables take their defaults; malformed values are
    /// configuration errors rather than silent fallbacks.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            cache_enabled: env_bool(ENV_CACHE_ENABLED, defaults.cache_enabled)?,
            cache_ttl_secs: env_parse(ENV_CACHE_TTL, defaults.cache_ttl_secs)?,
            cache_max_size: env_parse(ENV_CACHE_MAX_SIZE, defaults.cache_max_size)?,
            metrics_enabled: env_bool(ENV_METRICS_ENABLED, defaults.metrics_enabled)?,
            aws_region: env::var(ENV_AWS_REGION).unwrap_or(defaults.aws_region),
            bedrock_api_key: env::var(ENV_BEDROCK_API_KEY).ok(),
        })
    }
}

/// Read a boolean env var; accepts `true/false`, `1/0`, `yes/no` in any case.
fn env_bool(name: &str, default: bool) -> Result<bool> {
    match env::var(name) {
        Ok(raw) => parse_bool(&raw)
            .ok_or_else(|| BrokkrError::Configuration(format!("{name}: invalid boolean '{raw}'"))),
        Err(_) => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Read and parse a numeric env var.
fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            BrokkrError::Configuration(format!("{name}: invalid value '{raw}'"))
        }),
        Err(_) => Ok(default),
    }
}
