//! Bedrock foundation model catalog.
//!
//! Immutable, process-lifetime table of model descriptors keyed by short
//! name. Seeded once at startup; no operation mutates a descriptor after
//! that. `list_all()` enumerates in registration order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{BrokkrError, Result};

/// A group of models sharing one request/response wire schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFamily {
    /// Amazon Nova (messages + `inferenceConfig`).
    Nova,
    /// Anthropic Claude (anthropic messages schema).
    Claude,
    /// Meta Llama (single formatted prompt string).
    Llama,
    /// Mistral (`[INST]` prompt format).
    Mistral,
}

/// Static metadata for one Bedrock model: identity, limits, and pricing.
///
/// Serializes to the `list_models` wire shape; the family tag is internal
/// routing state and is skipped.
#[derive(Debug, Clone, Serialize)]
pub struct ModelDescriptor {
    /// Short public name (catalog key).
    pub name: &'static str,
    /// Full Bedrock model identifier.
    pub model_id: &'static str,
    pub description: &'static str,
    #[serde(skip)]
    pub family: ModelFamily,
    /// Maximum context window in tokens.
    pub context_window: u32,
    /// USD per 1000 input tokens.
    pub input_cost_per_1k: f64,
    /// USD per 1000 output tokens.
    pub output_cost_per_1k: f64,
    /// Whether the family accepts a dedicated system prompt.
    pub supports_system: bool,
    /// Maximum output tokens a request may ask for.
    pub max_tokens: u32,
}

/// Catalog of available models, keyed by short name.
///
/// Read-only after construction. Lookups are by-reference; descriptors
/// live for the process lifetime.
pub struct ModelCatalog {
    entries: Vec<ModelDescriptor>,
    index: HashMap<&'static str, usize>,
}

impl ModelCatalog {
    /// Build the catalog from the compiled-in model table.
    pub fn new() -> Self {
        let entries = seed_models();
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name, i))
            .collect();
        Self { entries, index }
    }

    /// Look up a model by short name.
    pub fn describe(&self, name: &str) -> Result<&ModelDescriptor> {
        self.index
            .get(name)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| BrokkrError::unknown_model(name, &self.names()))
    }

    /// All descriptors, in registration order.
    pub fn list_all(&self) -> &[ModelDescriptor] {
        &self.entries
    }

    /// Short names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|m| m.name).collect()
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// The Bedrock foundation models this gateway fronts.
fn seed_models() -> Vec<ModelDescriptor> {
    vec![
        // Amazon Nova
        ModelDescriptor {
            name: "nova-pro",
            model_id: "us.amazon.nova-pro-v1:0",
            description: "Advanced multimodal AI model with superior reasoning",
            family: ModelFamily::Nova,
            context_window: 300_000,
            input_cost_per_1k: 0.0008,
            output_cost_per_1k: 0.0032,
            supports_system: true,
            max_tokens: 5000,
        },
        ModelDescriptor {
            name: "nova-lite",
            model_id: "us.amazon.nova-lite-v1:0",
            description: "Fast and cost-effective model for simple tasks",
            family: ModelFamily::Nova,
            context_window: 300_000,
            input_cost_per_1k: 0.00006,
            output_cost_per_1k: 0.00024,
            supports_system: true,
            max_tokens: 5000,
        },
        ModelDescriptor {
            name: "nova-micro",
            model_id: "us.amazon.nova-micro-v1:0",
            description: "Ultra-fast model for basic text processing",
            family: ModelFamily::Nova,
            context_window: 128_000,
            input_cost_per_1k: 0.000035,
            output_cost_per_1k: 0.00014,
            supports_system: true,
            max_tokens: 5000,
        },
        // Anthropic Claude
        ModelDescriptor {
            name: "claude-3-5-sonnet",
            model_id: "us.anthropic.claude-3-5-sonnet-20241022-v2:0",
            description: "Most intelligent Claude model, best for complex tasks",
            family: ModelFamily::Claude,
            context_window: 200_000,
            input_cost_per_1k: 0.003,
            output_cost_per_1k: 0.015,
            supports_system: true,
            max_tokens: 8192,
        },
        ModelDescriptor {
            name: "claude-3-5-haiku",
            model_id: "us.anthropic.claude-3-5-haiku-20241022-v1:0",
            description: "Fastest Claude model, best for speed",
            family: ModelFamily::Claude,
            context_window: 200_000,
            input_cost_per_1k: 0.001,
            output_cost_per_1k: 0.005,
            supports_system: true,
            max_tokens: 8192,
        },
        ModelDescriptor {
            name: "claude-3-opus",
            model_id: "anthropic.claude-3-opus-20240229-v1:0",
            description: "Most powerful Claude 3 model",
            family: ModelFamily::Claude,
            context_window: 200_000,
            input_cost_per_1k: 0.015,
            output_cost_per_1k: 0.075,
            supports_system: true,
            max_tokens: 4096,
        },
        ModelDescriptor {
            name: "claude-3-sonnet",
            model_id: "anthropic.claude-3-sonnet-20240229-v1:0",
            description: "Balanced Claude 3 model",
            family: ModelFamily::Claude,
            context_window: 200_000,
            input_cost_per_1k: 0.003,
            output_cost_per_1k: 0.015,
            supports_system: true,
            max_tokens: 4096,
        },
        ModelDescriptor {
            name: "claude-3-haiku",
            model_id: "anthropic.claude-3-haiku-20240307-v1:0",
            description: "Fast and efficient Claude 3 model",
            family: ModelFamily::Claude,
            context_window: 200_000,
            input_cost_per_1k: 0.00025,
            output_cost_per_1k: 0.00125,
            supports_system: true,
            max_tokens: 4096,
        },
        // Meta Llama
        ModelDescriptor {
            name: "llama-3-3-70b",
            model_id: "us.meta.llama3-3-70b-instruct-v1:0",
            description: "Latest Llama model with 70B parameters",
            family: ModelFamily::Llama,
            context_window: 128_000,
            input_cost_per_1k: 0.00065,
            output_cost_per_1k: 0.00065,
            supports_system: false,
            max_tokens: 4096,
        },
        ModelDescriptor {
            name: "llama-3-2-90b",
            model_id: "us.meta.llama3-2-90b-instruct-v1:0",
            description: "Multimodal Llama model with vision",
            family: ModelFamily::Llama,
            context_window: 128_000,
            input_cost_per_1k: 0.0008,
            output_cost_per_1k: 0.0008,
            supports_system: false,
            max_tokens: 4096,
        },
        ModelDescriptor {
            name: "llama-3-2-11b",
            model_id: "us.meta.llama3-2-11b-instruct-v1:0",
            description: "Small multimodal Llama model",
            family: ModelFamily::Llama,
            context_window: 128_000,
            input_cost_per_1k: 0.00016,
            output_cost_per_1k: 0.00016,
            supports_system: false,
            max_tokens: 4096,
        },
        ModelDescriptor {
            name: "llama-3-1-70b",
            model_id: "meta.llama3-1-70b-instruct-v1:0",
            description: "Llama 3.1 with 70B parameters",
            family: ModelFamily::Llama,
            context_window: 128_000,
            input_cost_per_1k: 0.00099,
            output_cost_per_1k: 0.00099,
            supports_system: false,
            max_tokens: 4096,
        },
        ModelDescriptor {
            name: "llama-3-1-8b",
            model_id: "meta.llama3-1-8b-instruct-v1:0",
            description: "Small and efficient Llama model",
            family: ModelFamily::Llama,
            context_window: 128_000,
            input_cost_per_1k: 0.00022,
            output_cost_per_1k: 0.00022,
            supports_system: false,
            max_tokens: 4096,
        },
        // Mistral
        ModelDescriptor {
            name: "mistral-large-2",
            model_id: "mistral.mistral-large-2407-v1:0",
            description: "Flagship Mistral model with advanced reasoning",
            family: ModelFamily::Mistral,
            context_window: 128_000,
            input_cost_per_1k: 0.003,
            output_cost_per_1k: 0.009,
            supports_system: true,
            max_tokens: 8192,
        },
        ModelDescriptor {
            name: "mistral-small",
            model_id: "mistral.mistral-small-2402-v1:0",
            description: "Fast and affordable Mistral model",
            family: ModelFamily::Mistral,
            context_window: 32_000,
            input_cost_per_1k: 0.001,
            output_cost_per_1k: 0.003,
            supports_system: true,
            max_tokens: 8192,
        },
    ]
}
