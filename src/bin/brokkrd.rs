//! brokkrd — Brokkr daemon.
//!
//! Serves the gateway tools (`generate`, `list_models`, `get_stats`)
//! over line-delimited JSON on stdio: one tool-call envelope per line
//! in, one result-or-error envelope per line out. Request failures are
//! ordinary error envelopes; the process never aborts on one.

use std::sync::Arc;

use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use brokkr::{
    BedrockInvoker, BrokkrError, Dispatcher, GatewayConfig, GenerateRequest, ProviderErrorCause,
};

/// Brokkr daemon — Bedrock model gateway over stdio.
#[derive(Parser)]
#[command(name = "brokkrd")]
#[command(version)]
#[command(about = "Brokkr Bedrock gateway daemon")]
struct Args {
    /// AWS region override (defaults to AWS_REGION or us-east-1).
    #[arg(long)]
    region: Option<String>,
}

/// One inbound tool call.
#[derive(Deserialize)]
struct ToolCall {
    tool: String,
    #[serde(default)]
    arguments: Value,
}

/// One outbound envelope.
#[derive(Serialize)]
#[serde(untagged)]
enum Envelope {
    Ok { result: Value },
    Err { error: ErrorBody },
}

#[derive(Serialize)]
struct ErrorBody {
    kind: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cause: Option<ProviderErrorCause>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = GatewayConfig::from_env()?;
    if let Some(region) = args.region {
        config.aws_region = region;
    }

    let api_key = config.bedrock_api_key.clone().ok_or_else(|| {
        BrokkrError::Configuration("AWS_BEARER_TOKEN_BEDROCK is not set".to_string())
    })?;
    let invoker = Arc::new(BedrockInvoker::new(&config.aws_region, api_key));
    let dispatcher = Arc::new(Dispatcher::new(&config, invoker));

    info!(
        region = %config.aws_region,
        cache_enabled = config.cache_enabled,
        metrics_enabled = config.metrics_enabled,
        "brokkrd starting"
    );

    serve(dispatcher).await
}

/// Read tool calls line by line until stdin closes.
async fn serve(dispatcher: Arc<Dispatcher>) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let envelope = handle_line(&dispatcher, &line).await;
        let mut out = serde_json::to_vec(&envelope)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
    }

    info!("stdin closed, shutting down");
    Ok(())
}

async fn handle_line(dispatcher: &Dispatcher, line: &str) -> Envelope {
    let call: ToolCall = match serde_json::from_str(line) {
        Ok(call) => call,
        Err(e) => {
            return Envelope::Err {
                error: ErrorBody {
                    kind: "bad_request",
                    message: format!("malformed tool call: {e}"),
                    cause: None,
                },
            };
        }
    };

    match call.tool.as_str() {
        "generate" => {
            let request: GenerateRequest = match serde_json::from_value(call.arguments) {
                Ok(r) => r,
                Err(e) => {
                    return error_envelope(BrokkrError::Validation(e.to_string()));
                }
            };
            match dispatcher.generate(request).await {
                Ok(response) => ok_envelope(&response),
                Err(e) => error_envelope(e),
            }
        }
        "list_models" => ok_envelope(&dispatcher.list_models()),
        "get_stats" => ok_envelope(&dispatcher.stats()),
        other => Envelope::Err {
            error: ErrorBody {
                kind: "unknown_tool",
                message: format!("unknown tool '{other}'"),
                cause: None,
            },
        },
    }
}

fn ok_envelope<T: Serialize>(value: &T) -> Envelope {
    match serde_json::to_value(value) {
        Ok(result) => Envelope::Ok { result },
        Err(e) => {
            error!(error = %e, "failed to serialize result");
            Envelope::Err {
                error: ErrorBody {
                    kind: "internal",
                    message: e.to_string(),
                    cause: None,
                },
            }
        }
    }
}

fn error_envelope(e: BrokkrError) -> Envelope {
    let (kind, cause) = match &e {
        BrokkrError::UnknownModel { .. } => ("unknown_model", None),
        BrokkrError::Validation(_) => ("validation", None),
        BrokkrError::Provider { cause, .. } => ("provider", Some(*cause)),
        BrokkrError::MalformedResponse(_) => ("provider", None),
        BrokkrError::Json(_) => ("bad_request", None),
        BrokkrError::Configuration(_) => ("configuration", None),
    };
    Envelope::Err {
        error: ErrorBody {
            kind,
            message: e.to_string(),
            cause,
        },
    }
}
