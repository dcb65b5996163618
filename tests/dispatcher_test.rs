//! End-to-end dispatch through a mock invocation service: caching,
//! cost accounting, failure handling, and stats.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use brokkr::{
    BrokkrError, Dispatcher, FinishReason, GatewayConfig, GenerateRequest,
    InvocationService, Message, ProviderErrorCause, ProviderPayload, RawResponse,
    Result,
};
use serde_json::json;

/// Answers every family with a canned body carrying 100 input and 50
/// output tokens, counting upstream calls.
struct MockInvoker {
    calls: AtomicUsize,
}

impl MockInvoker {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InvocationService for MockInvoker {
    async fn invoke(&self, payload: &ProviderPayload) -> Result<RawResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let id = payload.model_id.as_str();
        if id.contains("amazon.nova") {
            Ok(RawResponse::from_body(json!({
                "output": {"message": {"content": [{"text": "nova says hi"}]}},
                "stopReason": "end_turn",
                "usage": {"inputTokens": 100, "outputTokens": 50}
            })))
        } else if id.contains("anthropic") {
            Ok(RawResponse::from_body(json!({
                "content": [{"type": "text", "text": "claude says hi"}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 100, "output_tokens": 50}
            })))
        } else if id.contains("meta") {
            Ok(RawResponse::from_body(json!({
                "generation": "llama says hi",
                "stop_reason": "stop",
                "prompt_token_count": 100,
                "generation_token_count": 50
            })))
        } else {
            Ok(RawResponse {
                body: json!({"outputs": [{"text": "mistral says hi", "stop_reason": "stop"}]}),
                input_tokens: Some(100),
                output_tokens: Some(50),
            })
        }
    }
}

/// Fails every call with a throttling error.
struct ThrottledInvoker;

#[async_trait]
impl InvocationService for ThrottledInvoker {
    async fn invoke(&self, _payload: &ProviderPayload) -> Result<RawResponse> {
        Err(BrokkrError::provider(
            ProviderErrorCause::Throttled,
            "too many requests",
        ))
    }
}

fn dispatcher_with(invoker: Arc<dyn InvocationService>) -> Dispatcher {
    Dispatcher::new(&GatewayConfig::default(), invoker)
}

fn request(content: &str) -> GenerateRequest {
    GenerateRequest::new("nova-pro", vec![Message::user(content)])
}

#[tokio::test]
async fn generate_returns_enriched_response() {
    let mock = Arc::new(MockInvoker::new());
    let dispatcher = dispatcher_with(mock.clone());

    let response = dispatcher.generate(request("hello")).await.unwrap();

    assert_eq!(response.content, "nova says hi");
    assert_eq!(response.model, "nova-pro");
    assert_eq!(response.model_id, "us.amazon.nova-pro-v1:0");
    assert_eq!(response.usage.total_tokens, 150);
    assert_eq!(response.finish_reason, FinishReason::Stop);
    assert!(!response.cached);
    assert_eq!(response.estimated_cost_usd, 0.00024);
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn identical_request_hits_cache_with_one_upstream_call() {
    let mock = Arc::new(MockInvoker::new());
    let dispatcher = dispatcher_with(mock.clone());

    let first = dispatcher.generate(request("hello")).await.unwrap();
    let second = dispatcher.generate(request("hello")).await.unwrap();

    assert_eq!(mock.call_count(), 1, "second call served from cache");
    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(second.content, first.content);
    assert_eq!(second.usage, first.usage);
    assert_eq!(second.estimated_cost_usd, first.estimated_cost_usd);
}

#[tokio::test]
async fn different_content_misses_cache() {
    let mock = Arc::new(MockInvoker::new());
    let dispatcher = dispatcher_with(mock.clone());

    dispatcher.generate(request("hello")).await.unwrap();
    dispatcher.generate(request("goodbye")).await.unwrap();

    assert_eq!(mock.call_count(), 2);
}

#[tokio::test]
async fn unknown_model_fails_without_invoking() {
    let mock = Arc::new(MockInvoker::new());
    let dispatcher = dispatcher_with(mock.clone());

    let req = GenerateRequest::new("gpt-4", vec![Message::user("hello")]);
    let err = dispatcher.generate(req).await.unwrap_err();

    assert!(matches!(err, BrokkrError::UnknownModel { .. }));
    assert_eq!(mock.call_count(), 0);
    assert_eq!(dispatcher.stats().metrics.failed_requests, 1);
}

#[tokio::test]
async fn validation_failure_never_reaches_provider() {
    let mock = Arc::new(MockInvoker::new());
    let dispatcher = dispatcher_with(mock.clone());

    let req = GenerateRequest::new("nova-pro", vec![]);
    let err = dispatcher.generate(req).await.unwrap_err();

    assert!(matches!(err, BrokkrError::Validation(_)));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn provider_error_surfaces_cause_and_records_failure() {
    let dispatcher = dispatcher_with(Arc::new(ThrottledInvoker));

    let err = dispatcher.generate(request("hello")).await.unwrap_err();
    let BrokkrError::Provider { cause, .. } = err else {
        panic!("expected provider error, got {err}");
    };
    assert_eq!(cause, ProviderErrorCause::Throttled);

    let stats = dispatcher.stats();
    assert_eq!(stats.metrics.failed_requests, 1);
    assert_eq!(stats.metrics.total_requests, 0, "failures stay out of totals");
    assert_eq!(stats.cache.current_size, 0, "failures never cached");
}

#[tokio::test]
async fn failed_request_is_retried_on_next_call() {
    // A failure must not poison the cache: retrying the same request
    // goes upstream again.
    struct FlakyInvoker {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl InvocationService for FlakyInvoker {
        async fn invoke(&self, _payload: &ProviderPayload) -> Result<RawResponse> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(BrokkrError::provider(ProviderErrorCause::Timeout, "timed out"))
            } else {
                Ok(RawResponse::from_body(json!({
                    "output": {"message": {"content": [{"text": "recovered"}]}},
                    "stopReason": "end_turn",
                    "usage": {"inputTokens": 1, "outputTokens": 1}
                })))
            }
        }
    }

    let dispatcher = dispatcher_with(Arc::new(FlakyInvoker {
        calls: AtomicUsize::new(0),
    }));

    assert!(dispatcher.generate(request("hello")).await.is_err());
    let response = dispatcher.generate(request("hello")).await.unwrap();
    assert_eq!(response.content, "recovered");
    assert!(!response.cached);
}

#[tokio::test]
async fn disabled_cache_always_goes_upstream() {
    let mock = Arc::new(MockInvoker::new());
    let config = GatewayConfig {
        cache_enabled: false,
        ..GatewayConfig::default()
    };
    let dispatcher = Dispatcher::new(&config, mock.clone());

    dispatcher.generate(request("hello")).await.unwrap();
    let second = dispatcher.generate(request("hello")).await.unwrap();

    assert_eq!(mock.call_count(), 2);
    assert!(!second.cached);
}

#[tokio::test]
async fn every_family_dispatches() {
    let mock = Arc::new(MockInvoker::new());
    let dispatcher = dispatcher_with(mock.clone());

    for (model, expected) in [
        ("nova-lite", "nova says hi"),
        ("claude-3-5-haiku", "claude says hi"),
        ("llama-3-1-8b", "llama says hi"),
        ("mistral-small", "mistral says hi"),
    ] {
        let req = GenerateRequest::new(model, vec![Message::user("hello")]);
        let response = dispatcher.generate(req).await.unwrap();
        assert_eq!(response.content, expected, "{model}");
        assert_eq!(response.usage.total_tokens, 150, "{model}");
    }
    assert_eq!(mock.call_count(), 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_requests_all_counted() {
    let mock = Arc::new(MockInvoker::new());
    let dispatcher = Arc::new(dispatcher_with(mock.clone()));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move {
                dispatcher
                    .generate(request(&format!("prompt {i}")))
                    .await
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let stats = dispatcher.stats();
    assert_eq!(stats.metrics.total_requests, 16);
    assert_eq!(stats.metrics.cache_misses, 16);
    assert_eq!(stats.metrics.requests_by_model["nova-pro"], 16);
    assert_eq!(mock.call_count(), 16);
}

#[tokio::test]
async fn stats_reflect_hits_and_costs() {
    let mock = Arc::new(MockInvoker::new());
    let dispatcher = dispatcher_with(mock.clone());

    dispatcher.generate(request("hello")).await.unwrap();
    dispatcher.generate(request("hello")).await.unwrap();

    let stats = dispatcher.stats();
    assert_eq!(stats.metrics.total_requests, 2);
    assert_eq!(stats.metrics.cache_hits, 1);
    assert_eq!(stats.metrics.cache_hit_rate_percent, 50.0);
    // Hit reuses the stored cost, so both requests price identically.
    assert!((stats.metrics.total_cost_usd - 2.0 * 0.00024).abs() < 1e-9);
    assert_eq!(stats.cache.current_size, 1);
}

#[test]
fn list_models_exposes_catalog() {
    let dispatcher = dispatcher_with(Arc::new(MockInvoker::new()));
    let models = dispatcher.list_models();
    assert_eq!(models.len(), 15);
    assert_eq!(models[0].name, "nova-pro");
}
