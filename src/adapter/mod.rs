//! Per-family payload adapters.
//!
//! One adapter per Bedrock model family, selected by
//! [`ModelFamily`](crate::catalog::ModelFamily). Each adapter encodes a
//! canonical request into that family's native `InvokeModel` body and
//! decodes the family's raw response back into canonical content, usage,
//! and a normalized finish reason.
//!
//! Adding a model is a catalog entry. Adding a family is a catalog entry
//! plus one variant here — the dispatcher never changes.
//!
//! # Family wire differences
//!
//! | family  | system prompt        | token limit field | stop reasons          |
//! |---------|----------------------|-------------------|-----------------------|
//! | nova    | `system[].text`      | `max_new_tokens`  | `end_turn`/`max_tokens` |
//! | claude  | top-level `system`   | `max_tokens`      | `end_turn`/`max_tokens` |
//! | llama   | n/a (unsupported)    | `max_gen_len`     | `stop`/`length`       |
//! | mistral | folded into `[INST]` | `max_tokens`      | `stop`/`length`       |
//!
//! Mistral responses carry no usage in the body; token counts come from
//! the `X-Amzn-Bedrock-*-Token-Count` headers lifted onto
//! [`RawResponse`](crate::invoke::RawResponse).

mod claude;
mod llama;
mod mistral;
mod nova;

use crate::catalog::{ModelDescriptor, ModelFamily};
use crate::invoke::{ProviderPayload, RawResponse};
use crate::types::{FinishReason, GenerateRequest, Usage};
use crate::Result;

/// Decoded provider response, before dispatcher enrichment.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub content: String,
    pub usage: Usage,
    pub finish_reason: FinishReason,
}

/// Closed set of payload adapters, one per model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adapter {
    Nova,
    Claude,
    Llama,
    Mistral,
}

impl Adapter {
    /// Select the adapter for a model family. Pure lookup.
    pub fn for_family(family: ModelFamily) -> Self {
        match family {
            ModelFamily::Nova => Adapter::Nova,
            ModelFamily::Claude => Adapter::Claude,
            ModelFamily::Llama => Adapter::Llama,
            ModelFamily::Mistral => Adapter::Mistral,
        }
    }

    /// Encode a canonical request into the family's `InvokeModel` body.
    pub fn encode(
        &self,
        request: &GenerateRequest,
        descriptor: &ModelDescriptor,
    ) -> ProviderPayload {
        let body = match self {
            Adapter::Nova => nova::encode(request),
            Adapter::Claude => claude::encode(request),
            Adapter::Llama => llama::encode(request),
            Adapter::Mistral => mistral::encode(request),
        };
        ProviderPayload {
            model_id: descriptor.model_id.to_string(),
            body,
        }
    }

    /// Decode the family's raw response into canonical shape.
    pub fn decode(&self, raw: &RawResponse) -> Result<Decoded> {
        match self {
            Adapter::Nova => nova::decode(raw),
            Adapter::Claude => claude::decode(raw),
            Adapter::Llama => llama::decode(raw),
            Adapter::Mistral => mistral::decode(raw),
        }
    }
}

/// Map a family's stop-reason vocabulary onto the canonical enumeration.
///
/// Unrecognized strings normalize to [`FinishReason::Error`] rather than
/// guessing.
pub(crate) fn normalize_stop_reason(raw: &str) -> FinishReason {
    match raw {
        "end_turn" | "stop" | "stop_sequence" => FinishReason::Stop,
        "max_tokens" | "length" => FinishReason::Length,
        "content_filtered" | "content_filter" | "guardrail_intervened" => {
            FinishReason::ContentFilter
        }
        _ => FinishReason::Error,
    }
}
