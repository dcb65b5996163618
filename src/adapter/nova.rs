//! Amazon Nova wire format.
//!
//! Request: `messages[].content[].text` with a separate `system[].text`
//! field and `inferenceConfig.max_new_tokens`. Response: text under
//! `output.message.content[0].text`, usage in the body.

use serde_json::{json, Value};

use crate::invoke::RawResponse;
use crate::types::{GenerateRequest, Role, Usage};
use crate::{BrokkrError, Result};

use super::{normalize_stop_reason, Decoded};

pub(super) fn encode(request: &GenerateRequest) -> Value {
    let messages: Vec<Value> = request
        .messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| {
            json!({
                "role": m.role.as_str(),
                "content": [{"text": m.content}],
            })
        })
        .collect();

    let mut body = json!({
        "messages": messages,
        "inferenceConfig": {
            "max_new_tokens": request.max_tokens,
            "temperature": request.temperature,
        },
    });

    if let Some(system) = request.system_prompt() {
        body["system"] = json!([{"text": system}]);
    }

    body
}

pub(super) fn decode(raw: &RawResponse) -> Result<Decoded> {
    let content = raw
        .body
        .pointer("/output/message/content/0/text")
        .and_then(Value::as_str)
        .ok_or_else(|| BrokkrError::MalformedResponse("nova: missing output text".into()))?
        .to_string();

    let input = raw
        .body
        .pointer("/usage/inputTokens")
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32;
    let output = raw
        .body
        .pointer("/usage/outputTokens")
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32;

    let finish_reason = raw
        .body
        .get("stopReason")
        .and_then(Value::as_str)
        .map(normalize_stop_reason)
        .unwrap_or_default();

    Ok(Decoded {
        content,
        usage: Usage::new(input, output),
        finish_reason,
    })
}
