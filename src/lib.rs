//! Brokkr - Unified gateway for AWS Bedrock foundation models
//!
//! This crate exposes one canonical "generate a completion" contract and
//! internally dispatches to the distinct wire formats of the Bedrock
//! model families (Nova, Claude, Llama, Mistral). Identical requests are
//! deduplicated through a fingerprinted response cache, and usage, cost,
//! and latency are aggregated per model.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use brokkr::{BedrockInvoker, Dispatcher, GatewayConfig, GenerateRequest, Message};
//!
//! #[tokio::main]
//! async fn main() -> brokkr::Result<()> {
//!     let config = GatewayConfig::from_env()?;
//!     let invoker = Arc::new(BedrockInvoker::new(
//!         &config.aws_region,
//!         config.bedrock_api_key.clone().unwrap_or_default(),
//!     ));
//!     let dispatcher = Dispatcher::new(&config, invoker);
//!
//!     let response = dispatcher
//!         .generate(GenerateRequest::new(
//!             "nova-pro",
//!             vec![
//!                 Message::system("You are a helpful assistant."),
//!                 Message::user("What is the capital of France?"),
//!             ],
//!         ))
//!         .await?;
//!
//!     println!("{}", response.content);
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod invoke;
pub mod stats;
pub mod telemetry;
pub mod types;
pub mod validate;

// Re-export main types at crate root
pub use error::{BrokkrError, ProviderErrorCause, Result};

pub use adapter::{Adapter, Decoded};
pub use cache::{fingerprint, CacheStats, Fingerprint, FingerprintCache};
pub use catalog::{ModelCatalog, ModelDescriptor, ModelFamily};
pub use config::GatewayConfig;
pub use dispatcher::{Dispatcher, GatewayStats};
pub use invoke::{BedrockInvoker, InvocationService, ProviderPayload, RawResponse};
pub use stats::{MetricsAggregator, MetricsSnapshot};
pub use types::{FinishReason, GenerateRequest, GenerateResponse, Message, Role, Usage};
pub use validate::validate;
