//! Canonical generation request.

use serde::{Deserialize, Serialize};

use super::Message;

/// A generation request in the canonical cross-family shape.
///
/// `temperature` and `max_tokens` carry the gateway's wire defaults when
/// the caller omits them, so two callers sending the same messages with
/// and without explicit defaults fingerprint identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model short name (e.g. "nova-pro", "claude-3-5-sonnet").
    pub model: String,
    /// Ordered conversation turns.
    pub messages: Vec<Message>,
    /// Sampling temperature, valid range [0.0, 2.0].
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

impl GenerateRequest {
    /// Create a request with default temperature and max_tokens.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = temp;
        self
    }

    pub fn max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = max;
        self
    }

    /// Content of the first system turn, if any.
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == super::Role::System)
            .map(|m| m.content.as_str())
    }
}
