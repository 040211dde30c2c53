//! HTTP handlers for the scan service.

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ScanLimits;
use crate::error::ScanError;
use crate::state::AppState;
use crate::types::{ScanRequest, ScanResponse};

pub async fn health() -> &'static str {
  "ok"
}

pub async fn index() -> &'static str {
  "npm risk scanner backend is running"
}

/// Validate the body and apply the default window size.
pub fn validate(req: &ScanRequest, limits: &ScanLimits) -> Result<(String, usize), ScanError> {
  let package = req
    .package
    .as_deref()
    .map(str::trim)
    .filter(|p| !p.is_empty())
    .ok_or_else(|| ScanError::bad_request("Missing 'package' in request body"))?;

  let count = match req.num_commits {
    None => limits.default_commits,
    Some(n) if n >= 1 && n as u64 <= limits.max_commits as u64 => n as usize,
    Some(n) => {
      return Err(ScanError::bad_request(format!(
        "'numCommits' must be between 1 and {}, got {}",
        limits.max_commits, n
      )))
    }
  };

  Ok((package.to_string(), count))
}

pub async fn scan(
  State(state): State<Arc<AppState>>,
  body: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanResponse>, ScanError> {
  let Json(req) =
    body.map_err(|e| ScanError::bad_request(format!("Invalid request body: {}", e.body_text())))?;
  let (package, count) = validate(&req, &state.limits)?;
  let span = tracing::info_span!("scan", scan_id = %Uuid::new_v4(), package = %package);
  run_scan(&state, package, count).instrument(span).await.map(Json)
}

/// Resolve, retrieve, score. Empty windows skip the engine.
async fn run_scan(state: &AppState, package: String, count: usize) -> Result<ScanResponse, ScanError> {
  let repo = state.resolver.resolve(&package).await.map_err(|e| {
    tracing::warn!("resolution failed: {}", e);
    e
  })?;

  let commits = state.commits.recent_commits(&repo, count).await.map_err(|e| {
    tracing::warn!(%repo, "retrieval failed: {}", e);
    e
  })?;

  let scored = if commits.is_empty() {
    Vec::new()
  } else {
    state.engine.score_commits(&commits)
  };

  let flagged = scored.iter().filter(|c| !c.flags.is_empty()).count();
  tracing::info!(%repo, commits = scored.len(), flagged, "scan complete");

  Ok(ScanResponse {
    package,
    repo,
    commits: scored,
  })
}
