//! Anthropic Claude wire format (Bedrock messages schema).
//!
//! Request: `anthropic_version` pin, top-level `max_tokens`, string
//! `system` field, plain-string message content. Response: text blocks
//! under `content[]`, usage in the body.

use serde_json::{json, Value};

use crate::invoke::RawResponse;
use crate::types::{GenerateRequest, Role, Usage};
use crate::{BrokkrError, Result};

use super::{normalize_stop_reason, Decoded};

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

pub(super) fn encode(request: &GenerateRequest) -> Value {
    let messages: Vec<Value> = request
        .messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| json!({"role": m.role.as_str(), "content": m.content}))
        .collect();

    let mut body = json!({
        "anthropic_version": ANTHROPIC_VERSION,
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
        "messages": messages,
    });

    if let Some(system) = request.system_prompt() {
        body["system"] = json!(system);
    }

    body
}

pub(super) fn decode(raw: &RawResponse) -> Result<Decoded> {
    let content = raw
        .body
        .pointer("/content/0/text")
        .and_then(Value::as_str)
        .ok_or_else(|| BrokkrError::MalformedResponse("claude: missing content text".into()))?
        .to_string();

    let input = raw
        .body
        .pointer("/usage/input_tokens")
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32;
    let output = raw
        .body
        .pointer("/usage/output_tokens")
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32;

    let finish_reason = raw
        .body
        .get("stop_reason")
        .and_then(Value::as_str)
        .map(normalize_stop_reason)
        .unwrap_or_default();

    Ok(Decoded {
        content,
        usage: Usage::new(input, output),
        finish_reason,
    })
}
