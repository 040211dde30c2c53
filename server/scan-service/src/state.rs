//! Shared application state for the scan service.

use npm_risk_engine::Engine;
use std::sync::Arc;

use crate::config::{ScanLimits, ServiceConfig};
use crate::error::ScanError;
use crate::github::{CommitSource, GithubClient};
use crate::npm::{NpmResolver, PackageResolver};

/// Collaborators are held behind traits so tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
  pub resolver: Arc<dyn PackageResolver>,
  pub commits: Arc<dyn CommitSource>,
  pub engine: Engine,
  pub limits: ScanLimits,
}

impl AppState {
  /// Wire the real npm and GitHub clients from configuration.
  pub fn from_config(config: &ServiceConfig) -> Result<Self, ScanError> {
    Ok(Self {
      resolver: Arc::new(NpmResolver::new(config.npm.clone())?),
      commits: Arc::new(GithubClient::new(config.github.clone())?),
      engine: Engine::with_defaults(),
      limits: config.limits,
    })
  }
}
