//! Invocation service — the seam between the dispatch core and the
//! Bedrock runtime.
//!
//! The core treats invocation as an opaque, non-retrying dependency: one
//! call, one response or one [`ProviderErrorCause`]-tagged failure.
//! Retry/backoff lives outside this crate (roadmap).
//!
//! [`BedrockInvoker`] is the production implementation, speaking the
//! `InvokeModel` REST endpoint with Bedrock API-key auth. Tests inject
//! their own [`InvocationService`].

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::{BrokkrError, ProviderErrorCause, Result};

/// Header carrying the prompt token count on `InvokeModel` responses.
const HDR_INPUT_TOKENS: &str = "x-amzn-bedrock-input-token-count";
/// Header carrying the completion token count.
const HDR_OUTPUT_TOKENS: &str = "x-amzn-bedrock-output-token-count";

/// An encoded request ready for one specific Bedrock model.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderPayload {
    /// Full Bedrock model identifier (URL path segment).
    pub model_id: String,
    /// Family-native `InvokeModel` body.
    pub body: Value,
}

/// Raw provider response: the JSON body plus the token-count response
/// headers, which some families (Mistral) rely on for usage.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub body: Value,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
}

impl RawResponse {
    /// A response with body only, no header-derived token counts.
    pub fn from_body(body: Value) -> Self {
        Self {
            body,
            input_tokens: None,
            output_tokens: None,
        }
    }
}

/// The external collaborator the dispatcher calls on a cache miss.
#[async_trait]
pub trait InvocationService: Send + Sync {
    /// Invoke the model behind `payload.model_id` once.
    ///
    /// May block for the duration of network and model compute. Fails
    /// with [`BrokkrError::Provider`]; never retries internally.
    async fn invoke(&self, payload: &ProviderPayload) -> Result<RawResponse>;
}

/// Bedrock runtime client using API-key (bearer) authentication.
pub struct BedrockInvoker {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl BedrockInvoker {
    /// Create an invoker for the given region, e.g. `us-east-1`.
    pub fn new(region: &str, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("https://bedrock-runtime.{region}.amazonaws.com"),
            api_key: api_key.into(),
        }
    }

    /// Override the endpoint base URL (local stacks, tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn cause_for_status(status: reqwest::StatusCode) -> ProviderErrorCause {
        match status.as_u16() {
            429 => ProviderErrorCause::Throttled,
            401 | 403 => ProviderErrorCause::InvalidCredentials,
            400 | 422 => ProviderErrorCause::MalformedRequest,
            408 | 504 => ProviderErrorCause::Timeout,
            _ => ProviderErrorCause::Unknown,
        }
    }
}

#[async_trait]
impl InvocationService for BedrockInvoker {
    async fn invoke(&self, payload: &ProviderPayload) -> Result<RawResponse> {
        let url = format!("{}/model/{}/invoke", self.endpoint, payload.model_id);
        debug!(model_id = %payload.model_id, "invoking bedrock runtime");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload.body)
            .send()
            .await
            .map_err(|e| {
                let cause = if e.is_timeout() {
                    ProviderErrorCause::Timeout
                } else {
                    ProviderErrorCause::Unknown
                };
                BrokkrError::provider(cause, e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let cause = Self::cause_for_status(status);
            let message = response.text().await.unwrap_or_default();
            return Err(BrokkrError::provider(
                cause,
                format!("{status}: {message}"),
            ));
        }

        let input_tokens = header_count(response.headers(), HDR_INPUT_TOKENS);
        let output_tokens = header_count(response.headers(), HDR_OUTPUT_TOKENS);

        let body: Value = response
            .json()
            .await
            .map_err(|e| BrokkrError::provider(ProviderErrorCause::Unknown, e.to_string()))?;

        Ok(RawResponse {
            body,
            input_tokens,
            output_tokens,
        })
    }
}

/// Parse a numeric token-count header, if present.
fn header_count(headers: &reqwest::header::HeaderMap, name: &str) -> Option<u32> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u32>().ok())
}
