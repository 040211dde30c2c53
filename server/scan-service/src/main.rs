//! Binary entrypoint for the scan service.

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use scan_service::{AppState, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let config = ServiceConfig::from_env()?;
  if config.github.token.is_none() {
    tracing::warn!("GITHUB_TOKEN not set; GitHub rate limits will be low");
  }

  let state = Arc::new(AppState::from_config(&config)?);
  let app = scan_service::app(state);

  let addr = SocketAddr::new(config.bind_addr, config.port);
  tracing::info!("scan-service listening on http://{}", addr);

  let listener = tokio::net::TcpListener::bind(addr).await?;
  axum::serve(listener, app).await?;

  Ok(())
}
