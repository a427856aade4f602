use dra_provisioner::client::{build_client, build_client_with_region};
use dra_provisioner::{HandlerConfig, HandlerRequest, SdkFsxApi, dispatch};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing_subscriber::EnvFilter;

/// Reads one request document from stdin, runs it to completion or
/// suspension, and writes the progress event to stdout.
#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Structured JSON logging on stderr; stdout carries the response.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = HandlerConfig::from_env();

    let mut input = String::new();
    tokio::io::stdin().read_to_string(&mut input).await?;
    let mut request: HandlerRequest = serde_json::from_str(&input)?;
    if request.client_request_token.is_none() {
        request.client_request_token = Some(uuid::Uuid::new_v4().to_string());
    }

    let client = match config.region.as_deref() {
        Some(region) => build_client_with_region(region).await,
        None => build_client().await,
    };
    let api = SdkFsxApi::new(client);

    tracing::info!(
        type_name = dra_core::TYPE_NAME,
        action = ?request.action,
        "invocation started"
    );

    let event = dispatch(&api, &request, &config.stabilize())
        .await
        .map_err(|e| eyre::eyre!("unhandled service error: {e}"))?;

    let mut out = serde_json::to_vec(&event)?;
    out.push(b'\n');
    let mut stdout = tokio::io::stdout();
    stdout.write_all(&out).await?;
    stdout.flush().await?;
    Ok(())
}
