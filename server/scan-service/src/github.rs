//! GitHub REST client: recent commits and their raw diffs.

use async_trait::async_trait;
use npm_risk_engine::CommitRecord;
use serde::Deserialize;
use std::time::Duration;

use crate::config::DEFAULT_USER_AGENT;
use crate::error::ScanError;
use crate::types::RepoRef;

/// GitHub caps `per_page` at 100.
pub const MAX_PER_PAGE: usize = 100;

const ACCEPT_JSON: &str = "application/vnd.github+json";
const ACCEPT_DIFF: &str = "application/vnd.github.v3.diff";

#[async_trait]
pub trait CommitSource: Send + Sync {
  /// Up to `count` most-recent commits, newest first, each with its diff.
  async fn recent_commits(&self, repo: &RepoRef, count: usize) -> Result<Vec<CommitRecord>, ScanError>;
}

#[derive(Debug, Clone)]
pub struct GithubConfig {
  pub api_base: String,
  /// Sent as a bearer token when present (raises rate limits).
  pub token: Option<String>,
  pub user_agent: String,
  pub timeout: Duration,
  /// Diff requests in flight at once.
  pub diff_concurrency: usize,
}

impl Default for GithubConfig {
  fn default() -> Self {
    Self {
      api_base: "https://api.github.com".to_string(),
      token: None,
      user_agent: DEFAULT_USER_AGENT.to_string(),
      timeout: Duration::from_secs(15),
      diff_concurrency: 8,
    }
  }
}

// ---------------------------------------------------------------------------
// Wire types (only what we read)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct GithubCommit {
  pub sha: String,
  pub commit: CommitDetail,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitDetail {
  #[serde(default)]
  pub message: Option<String>,
  #[serde(default)]
  pub author: Option<GitActor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitActor {
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub date: Option<String>,
}

/// Inserted lines in a unified diff, file headers (`+++`) excluded.
pub fn count_added_lines(diff: &str) -> u64 {
  diff
    .lines()
    .filter(|l| l.starts_with('+') && !l.starts_with("+++"))
    .count() as u64
}

/// Combine list metadata with a diff. A missing diff leaves the size unknown.
pub fn to_record(commit: GithubCommit, diff: Option<String>) -> CommitRecord {
  let author = commit.commit.author.unwrap_or_default();
  let added_lines = diff.as_deref().map(count_added_lines);
  CommitRecord {
    sha: commit.sha,
    author_name: author.name,
    author_email: author.email,
    message: commit.commit.message,
    date: author.date,
    added_lines,
    diff: diff.unwrap_or_default(),
  }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GithubClient {
  config: GithubConfig,
  client: reqwest::Client,
}

impl GithubClient {
  pub fn new(config: GithubConfig) -> Result<Self, ScanError> {
    let client = reqwest::Client::builder()
      .timeout(config.timeout)
      .user_agent(config.user_agent.clone())
      .build()?;
    Ok(Self { config, client })
  }

  fn get(&self, path: &str, accept: &str) -> reqwest::RequestBuilder {
    let url = format!("{}{}", self.config.api_base, path);
    let req = self.client.get(url).header(reqwest::header::ACCEPT, accept);
    match &self.config.token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  /// Page through the commit list until `count` commits or the history runs out.
  pub async fn list_commits(&self, repo: &RepoRef, count: usize) -> Result<Vec<GithubCommit>, ScanError> {
    let per_page = count.clamp(1, MAX_PER_PAGE);
    let mut commits: Vec<GithubCommit> = Vec::with_capacity(count);
    let mut page = 1;

    while commits.len() < count {
      let path = format!(
        "/repos/{}/{}/commits?per_page={}&page={}",
        repo.owner, repo.repo, per_page, page
      );
      let response = self
        .get(&path, ACCEPT_JSON)
        .send()
        .await
        .map_err(|e| ScanError::retrieval(format!("GitHub request failed for {}: {}", repo, e)))?;

      let status = response.status();
      if !status.is_success() {
        return Err(ScanError::retrieval(format!(
          "GitHub commits API returned {} for {}",
          status, repo
        )));
      }

      let batch: Vec<GithubCommit> = response
        .json()
        .await
        .map_err(|e| ScanError::retrieval(format!("invalid commit list for {}: {}", repo, e)))?;
      let fetched = batch.len();
      commits.extend(batch);

      if fetched < per_page {
        break;
      }
      page += 1;
    }

    commits.truncate(count);
    tracing::debug!(%repo, pages = page, commits = commits.len(), "listed commits");
    Ok(commits)
  }

  /// Raw unified diff for one commit.
  pub async fn commit_diff(&self, repo: &RepoRef, sha: &str) -> Result<String, ScanError> {
    let path = format!("/repos/{}/{}/commits/{}", repo.owner, repo.repo, sha);
    let response = self
      .get(&path, ACCEPT_DIFF)
      .send()
      .await
      .map_err(|e| ScanError::retrieval(format!("GitHub diff request failed for {}@{}: {}", repo, sha, e)))?;

    let status = response.status();
    if !status.is_success() {
      return Err(ScanError::retrieval(format!(
        "GitHub diff API returned {} for {}@{}",
        status, repo, sha
      )));
    }
    Ok(response.text().await?)
  }

  /// Diffs for many commits in bounded batches, input order preserved.
  /// A failed fetch yields `None` for that slot.
  async fn fetch_diffs(&self, repo: &RepoRef, shas: &[String]) -> Vec<Option<String>> {
    let mut results = Vec::with_capacity(shas.len());
    let batch_size = self.config.diff_concurrency.max(1);

    for batch in shas.chunks(batch_size) {
      let mut set = tokio::task::JoinSet::new();
      for (idx, sha) in batch.iter().enumerate() {
        let this = self.clone();
        let repo = repo.clone();
        let sha = sha.clone();
        set.spawn(async move {
          let diff = match this.commit_diff(&repo, &sha).await {
            Ok(d) => Some(d),
            Err(e) => {
              tracing::warn!(%repo, sha = %sha, "diff unavailable, scoring without it: {}", e);
              None
            }
          };
          (idx, diff)
        });
      }

      let mut slots: Vec<Option<String>> = vec![None; batch.len()];
      while let Some(res) = set.join_next().await {
        match res {
          Ok((idx, diff)) => slots[idx] = diff,
          Err(e) => tracing::warn!("diff task failed: {}", e),
        }
      }
      results.extend(slots);
    }

    results
  }
}

#[async_trait]
impl CommitSource for GithubClient {
  async fn recent_commits(&self, repo: &RepoRef, count: usize) -> Result<Vec<CommitRecord>, ScanError> {
    let commits = self.list_commits(repo, count).await?;
    let shas: Vec<String> = commits.iter().map(|c| c.sha.clone()).collect();
    let diffs = self.fetch_diffs(repo, &shas).await;

    Ok(
      commits
        .into_iter()
        .zip(diffs)
        .map(|(commit, diff)| to_record(commit, diff))
        .collect(),
    )
  }
}
