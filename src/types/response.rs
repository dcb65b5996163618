//! Canonical response and usage types.

use serde::{Deserialize, Serialize};

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    /// Build usage from input/output counts, deriving the total.
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
        }
    }
}

/// Reason the model stopped generating, normalized across families.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    #[default]
    Stop,
    Length,
    ContentFilter,
    /// The provider reported a stop reason outside any known vocabulary.
    Error,
}

/// A completed generation in the canonical cross-family shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Generated text.
    pub content: String,
    /// Model short name the caller asked for.
    pub model: String,
    /// Full Bedrock model identifier that served the request.
    pub model_id: String,
    pub usage: Usage,
    pub finish_reason: FinishReason,
    /// Whether this response was served from the fingerprint cache.
    pub cached: bool,
    /// Provider invocation latency for misses; cache lookup cost for hits.
    pub latency_ms: f64,
    /// Cost from catalog pricing and actual usage, rounded to microdollars.
    pub estimated_cost_usd: f64,
}
