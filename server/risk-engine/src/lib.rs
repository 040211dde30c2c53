//! npm Supply-Chain Risk Engine: rule-based commit scoring; no AI, no DB, no network.
//!
//! Content rules run over each commit's raw diff; behavioral rules compare each
//! commit against its author's pattern within the supplied window. Used by the
//! binary for stdin/stdout and by the scan service as a library.

pub mod behavior;
pub mod config;
pub mod engine;
pub mod history;
pub mod risk;
pub mod score;
pub mod types;

pub use config::Config;
pub use engine::Engine;
pub use score::score_diff;
pub use types::{AuthorKey, CommitRecord, ContentScore, Flag, RiskLevel, ScoredCommit};

/// Score a commit window with the default thresholds (no I/O).
pub fn score_commits(commits: &[CommitRecord]) -> Vec<ScoredCommit> {
  Engine::with_defaults().score_commits(commits)
}
