//! Meta Llama wire format.
//!
//! Llama models take a single `prompt` string in the llama3 instruct
//! template rather than structured messages, with `max_gen_len` as the
//! token limit. Token counts come back in the body. System prompts are
//! rejected upstream by validation (`supports_system: false`), so the
//! template only ever sees user and assistant turns.

use serde_json::{json, Value};

use crate::invoke::RawResponse;
use crate::types::{GenerateRequest, Message, Usage};
use crate::{BrokkrError, Result};

use super::{normalize_stop_reason, Decoded};

pub(super) fn encode(request: &GenerateRequest) -> Value {
    json!({
        "prompt": format_prompt(&request.messages),
        "temperature": request.temperature,
        "max_gen_len": request.max_tokens,
    })
}

/// Render conversation turns into the llama3 instruct template, ending
/// with an open assistant header to cue generation.
fn format_prompt(messages: &[Message]) -> String {
    let mut prompt = String::from("<|begin_of_text|>");
    for message in messages {
        prompt.push_str("<|start_header_id|>");
        prompt.push_str(message.role.as_str());
        prompt.push_str("<|end_header_id|>\n\n");
        prompt.push_str(&message.content);
        prompt.push_str("<|eot_id|>");
    }
    prompt.push_str("<|start_header_id|>assistant<|end_header_id|>\n\n");
    prompt
}

pub(super) fn decode(raw: &RawResponse) -> Result<Decoded> {
    let content = raw
        .body
        .get("generation")
        .and_then(Value::as_str)
        .ok_or_else(|| BrokkrError::MalformedResponse("llama: missing generation".into()))?
        .to_string();

    let input = raw
        .body
        .get("prompt_token_count")
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32;
    let output = raw
        .body
        .get("generation_token_count")
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_template_wraps_turns() {
        let prompt = format_prompt(&[Message::user("hello")]);
        assert!(prompt.starts_with("<|begin_of_text|>"));
        assert!(prompt.contains("<|start_header_id|>user<|end_header_id|>\n\nhello<|eot_id|>"));
        assert!(prompt.ends_with("<|start_header_id|>assistant<|end_header_id|>\n\n"));
    }

    #[test]
    fn prompt_template_preserves_turn_order() {
        let prompt = format_prompt(&[
            Message::user("one"),
            Message::assistant("two"),
            Message::user("three"),
        ]);
        let one = prompt.find("one").unwrap();
        let two = prompt.find("two").unwrap();
        let three = prompt.find("three").unwrap();
        assert!(one < two && two < three);
    }
}
