//! npm Risk Scan Service
//!
//! HTTP service that resolves an npm package to its GitHub repository, fetches
//! recent commits with diffs and returns them scored by the risk engine.
//! Bind to 127.0.0.1 by default (internal only).

pub mod config;
pub mod error;
pub mod github;
pub mod handlers;
pub mod npm;
pub mod state;
pub mod types;

use axum::{routing::get, routing::post, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::{ScanLimits, ServiceConfig};
pub use error::{ConfigError, ScanError};
pub use github::{CommitSource, GithubClient, GithubConfig};
pub use npm::{NpmConfig, NpmResolver, PackageResolver};
pub use state::AppState;
pub use types::{RepoRef, ScanRequest, ScanResponse};

/// Router with all routes and layers.
pub fn app(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/", get(handlers::index))
    .route("/health", get(handlers::health))
    .route("/scan", post(handlers::scan))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
    .with_state(state)
}
