//! Request validation.
//!
//! Runs synchronously before any cache lookup or provider call; a request
//! that fails here never reaches the invocation service.

use crate::catalog::ModelDescriptor;
use crate::types::{GenerateRequest, Role};
use crate::{BrokkrError, Result};

/// Temperature range accepted by every Bedrock family.
const TEMPERATURE_RANGE: std::ops::RangeInclusive<f32> = 0.0..=2.0;

/// Check a canonical request against its model descriptor.
///
/// Rejections:
/// - empty message list, or any blank message content
/// - temperature outside [0.0, 2.0]
/// - `max_tokens` of zero or above the descriptor limit
/// - a system turn sent to a model without system-prompt support
pub fn validate(request: &GenerateRequest, descriptor: &ModelDescriptor) -> Result<()> {
    if request.messages.is_empty() {
        return Err(BrokkrError::Validation(
            "messages list cannot be empty".into(),
        ));
    }

    for (i, message) in request.messages.iter().enumerate() {
        if message.content.trim().is_empty() {
            return Err(BrokkrError::Validation(format!(
                "message {i} content cannot be empty"
            )));
        }
    }

    if !TEMPERATURE_RANGE.contains(&request.temperature) {
        return Err(BrokkrError::Validation(format!(
            "temperature must be between 0.0 and 2.0, got {}",
            request.temperature
        )));
    }

    if request.max_tokens == 0 {
        return Err(BrokkrError::Validation(
            "max_tokens must be greater than 0".into(),
        ));
    }
    if request.max_tokens > descriptor.max_tokens {
        return Err(BrokkrError::Validation(format!(
            "max_tokens {} exceeds limit {} for model '{}'",
            request.max_tokens, descriptor.max_tokens, descriptor.name
        )));
    }

    // Reject rather than silently drop the system turn.
    if !descriptor.supports_system
        && request.messages.iter().any(|m| m.role == Role::System)
    {
        return Err(BrokkrError::Validation(format!(
            "model '{}' does not support system prompts",
            descriptor.name
        )));
    }

    Ok(())
}
