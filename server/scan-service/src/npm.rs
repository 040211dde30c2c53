//! npm registry lookup: package name -> GitHub owner/repo.
//!
//! Candidate URLs, in priority order:
//! 1. top-level `repository` (object `url` or shorthand string)
//! 2. `versions[dist-tags.latest].repository`
//! 3. `homepage`, only when it points at github.com
//!
//! The first candidate that parses as a GitHub URL wins.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::config::DEFAULT_USER_AGENT;
use crate::error::ScanError;
use crate::types::RepoRef;

#[async_trait]
pub trait PackageResolver: Send + Sync {
  async fn resolve(&self, package: &str) -> Result<RepoRef, ScanError>;
}

#[derive(Debug, Clone)]
pub struct NpmConfig {
  pub registry_url: String,
  pub user_agent: String,
  pub timeout: Duration,
}

impl Default for NpmConfig {
  fn default() -> Self {
    Self {
      registry_url: "https://registry.npmjs.org".to_string(),
      user_agent: DEFAULT_USER_AGENT.to_string(),
      timeout: Duration::from_secs(10),
    }
  }
}

#[derive(Debug, Clone)]
pub struct NpmResolver {
  config: NpmConfig,
  client: reqwest::Client,
}

impl NpmResolver {
  pub fn new(config: NpmConfig) -> Result<Self, ScanError> {
    let client = reqwest::Client::builder()
      .timeout(config.timeout)
      .user_agent(config.user_agent.clone())
      .build()?;
    Ok(Self { config, client })
  }

  /// Full registry document for a package.
  pub async fn fetch_metadata(&self, package: &str) -> Result<Value, ScanError> {
    let url = format!("{}/{}", self.config.registry_url, registry_path(package));
    let response = self
      .client
      .get(&url)
      .send()
      .await
      .map_err(|e| ScanError::retrieval(format!("npm registry request failed: {}", e)))?;

    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
      return Err(ScanError::resolution(format!(
        "npm package '{}' not found",
        package
      )));
    }
    if !status.is_success() {
      return Err(ScanError::retrieval(format!(
        "npm registry returned {} for package '{}'",
        status, package
      )));
    }

    response
      .json()
      .await
      .map_err(|e| ScanError::retrieval(format!("invalid npm metadata for '{}': {}", package, e)))
  }
}

#[async_trait]
impl PackageResolver for NpmResolver {
  async fn resolve(&self, package: &str) -> Result<RepoRef, ScanError> {
    let meta = self.fetch_metadata(package).await?;
    let repo = resolve_from_metadata(package, &meta)?;
    tracing::debug!(package, %repo, "resolved npm package");
    Ok(repo)
  }
}

/// Registry path for a package name. Scoped names keep `@` and escape the `/`.
pub fn registry_path(package: &str) -> String {
  package.trim().replace('/', "%2F")
}

fn repository_url(field: &Value) -> Option<String> {
  match field {
    Value::String(s) => {
      // npm shorthand: "owner/repo" means GitHub.
      if !s.contains(':') && s.split('/').filter(|p| !p.is_empty()).count() == 2 {
        Some(format!("github:{}", s))
      } else {
        Some(s.clone())
      }
    }
    Value::Object(map) => map.get("url").and_then(Value::as_str).map(str::to_string),
    _ => None,
  }
}

/// Candidate repository URLs in priority order.
pub fn repository_candidates(meta: &Value) -> Vec<String> {
  let mut out = Vec::new();

  if let Some(url) = meta.get("repository").and_then(repository_url) {
    out.push(url);
  }

  let latest = meta
    .get("dist-tags")
    .and_then(|t| t.get("latest"))
    .and_then(Value::as_str);
  if let Some(version) = latest {
    let field = meta
      .get("versions")
      .and_then(|v| v.get(version))
      .and_then(|v| v.get("repository"));
    if let Some(url) = field.and_then(repository_url) {
      out.push(url);
    }
  }

  if let Some(home) = meta.get("homepage").and_then(Value::as_str) {
    if home.to_ascii_lowercase().contains("github.com") {
      out.push(home.to_string());
    }
  }

  out
}

/// Extract owner/repo from the many spellings of a GitHub URL.
///
/// Handles `git+https://github.com/o/r.git`, `git://github.com/o/r`,
/// `git@github.com:o/r.git`, `ssh://git@github.com/o/r`, `github:o/r`
/// and homepage links with `#readme` or `/tree/...` tails.
pub fn parse_github_url(raw: &str) -> Option<RepoRef> {
  let s = raw.trim();
  let s = s.strip_prefix("git+").unwrap_or(s);

  let rest = match s.strip_prefix("github:") {
    Some(r) => r,
    None => github_path(s)?,
  };

  let rest = rest.trim_start_matches([':', '/']);
  let path = rest.split(['#', '?']).next().unwrap_or("");
  let mut parts = path.split('/').filter(|p| !p.is_empty());
  let owner = parts.next()?;
  let repo = parts.next()?;
  let repo = repo.strip_suffix(".git").unwrap_or(repo);

  if owner.is_empty() || repo.is_empty() {
    return None;
  }
  Some(RepoRef::new(owner, repo))
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
  let head = s.get(..prefix.len())?;
  head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

/// Path after a `github.com` host, or `None` when the host is anything else.
fn github_path(url: &str) -> Option<&str> {
  let rest = ["https://", "http://", "git://", "ssh://"]
    .iter()
    .find_map(|scheme| strip_prefix_ignore_case(url, scheme))
    .unwrap_or(url);
  let rest = rest.strip_prefix("git@").unwrap_or(rest);
  let rest = strip_prefix_ignore_case(rest, "www.").unwrap_or(rest);
  let rest = strip_prefix_ignore_case(rest, "github.com")?;
  match rest.chars().next() {
    Some(':') | Some('/') => Some(rest),
    _ => None,
  }
}

/// Pick the GitHub repository out of registry metadata.
pub fn resolve_from_metadata(package: &str, meta: &Value) -> Result<RepoRef, ScanError> {
  repository_candidates(meta)
    .iter()
    .find_map(|url| parse_github_url(url))
    .ok_or_else(|| {
      ScanError::resolution(format!(
        "could not find a GitHub repository URL for npm package '{}'",
        package
      ))
    })
}
