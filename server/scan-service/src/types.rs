//! Request/response types for the scan service.

use npm_risk_engine::ScoredCommit;
use serde::{Deserialize, Serialize};
use std::fmt;

/// GitHub repository coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
  pub owner: String,
  pub repo: String,
}

impl RepoRef {
  pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
    Self {
      owner: owner.into(),
      repo: repo.into(),
    }
  }
}

impl fmt::Display for RepoRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.owner, self.repo)
  }
}

/// POST /scan body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
  #[serde(default)]
  pub package: Option<String>,
  #[serde(default)]
  pub num_commits: Option<i64>,
}

/// POST /scan response.
#[derive(Debug, Serialize)]
pub struct ScanResponse {
  pub package: String,
  pub repo: RepoRef,
  pub commits: Vec<ScoredCommit>,
}

/// Error body for any non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
  pub error: String,
}
