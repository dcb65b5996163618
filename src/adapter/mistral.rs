//! Mistral wire format.
//!
//! Request: `<s>[INST] … [/INST]` prompt string with `max_tokens`. The
//! system prompt has no dedicated field; it is folded into the first
//! instruction block. Response bodies carry `outputs[0].text` and a stop
//! reason but no token counts — usage comes from the Bedrock response
//! headers on [`RawResponse`].

use serde_json::{json, Value};

use crate::invoke::RawResponse;
use crate::types::{GenerateRequest, Message, Role, Usage};
use crate::{BrokkrError, Result};

use super::{normalize_stop_reason, Decoded};

pub(super) fn encode(request: &GenerateRequest) -> Value {
    json!({
        "prompt": format_prompt(&request.messages),
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
    })
}

/// Render turns into the Mistral instruct template.
///
/// User turns open an `[INST]` block, assistant turns close the previous
/// exchange with `</s>`. A system turn becomes the leading paragraph of
/// the first instruction block.
fn format_prompt(messages: &[Message]) -> String {
    let system = messages
        .iter()
        .find(|m| m.role == Role::System)
        .map(|m| m.content.as_str());

    let mut prompt = String::from("<s>");
    let mut first_inst = true;
    for message in messages {
        match message.role {
            Role::System => {}
            Role::User => {
                prompt.push_str("[INST] ");
                if first_inst {
                    if let Some(system) = system {
                        prompt.push_str(system);
                        prompt.push_str("\n\n");
                    }
                    first_inst = false;
                }
                prompt.push_str(&message.content);
                prompt.push_str(" [/INST]");
            }
            Role::Assistant => {
                prompt.push(' ');
                prompt.push_str(&message.content);
                prompt.push_str("</s>");
            }
        }
    }
    prompt
}

pub(super) fn decode(raw: &RawResponse) -> Result<Decoded> {
    let content = raw
        .body
        .pointer("/outputs/0/text")
        .and_then(Value::as_str)
        .ok_or_else(|| BrokkrError::MalformedResponse("mistral: missing output text".into()))?
        .to_string();

    // No usage in the body; fall back to the token-count headers.
    let usage = Usage::new(
        raw.input_tokens.unwrap_or(0),
        raw.output_tokens.unwrap_or(0),
    );

    let finish_reason = raw
        .body
        .pointer("/outputs/0/stop_reason")
        .and_then(Value::as_str)
        .map(normalize_stop_reason)
        .unwrap_or_default();

    Ok(Decoded {
        content,
        usage,
        finish_reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_turn_prompt() {
        let prompt = format_prompt(&[Message::user("hello")]);
        assert_eq!(prompt, "<s>[INST] hello [/INST]");
    }

    #[test]
    fn system_folds_into_first_instruction() {
        let prompt = format_prompt(&[Message::system("be terse"), Message::user("hello")]);
        assert_eq!(prompt, "<s>[INST] be terse\n\nhello [/INST]");
    }

    #[test]
    fn multi_turn_closes_exchanges() {
        let prompt = format_prompt(&[
            Message::user("one"),
            Message::assistant("two"),
            Message::user("three"),
        ]);
        assert_eq!(prompt, "<s>[INST] one [/INST] two</s>[INST] three [/INST]");
    }
}
