//! Report builder: history pass over the window, then content + behavioral scoring per commit.

use crate::behavior;
use crate::config::Config;
use crate::history;
use crate::score;
use crate::types::{CommitRecord, ScoredCommit};

/// The risk engine. Stateless between calls; each call builds its own author history.
#[derive(Debug, Clone, Default)]
pub struct Engine {
  config: Config,
}

impl Engine {
  pub fn new(config: Config) -> Self {
    Self { config }
  }

  pub fn with_defaults() -> Self {
    Self::new(Config::default())
  }

  /// Score a commit window. Output has one entry per input commit, same order.
  pub fn score_commits(&self, commits: &[CommitRecord]) -> Vec<ScoredCommit> {
    if commits.is_empty() {
      return Vec::new();
    }
    let histories = history::build(commits);

    commits
      .iter()
      .map(|commit| {
        let content = score::score_diff(&commit.diff);
        let out = behavior::augment(commit, &content, &histories, &self.config);
        ScoredCommit {
          sha: commit.sha.clone(),
          author_name: commit.author_name.clone(),
          author_email: commit.author_email.clone(),
          message: commit.message.clone(),
          risk_score: out.score,
          risk_level: out.level,
          flags: out.flags,
        }
      })
      .collect()
  }
}
