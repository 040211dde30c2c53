//! Per-author history over one commit window: sorted timestamps and mean change size.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::types::{AuthorKey, CommitRecord};

/// Parse an RFC 3339 timestamp to UTC. Malformed or missing values yield `None`.
pub fn parse_timestamp(s: Option<&str>) -> Option<DateTime<Utc>> {
  let dt = DateTime::parse_from_rfc3339(s?.trim()).ok()?;
  Some(dt.with_timezone(&Utc))
}

/// What the window says about one author.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorHistory {
  /// Parsed commit timestamps, ascending.
  pub timestamps: Vec<DateTime<Utc>>,
  /// Commits attributed to this author, parsed date or not.
  pub commit_count: usize,
  /// Mean `added_lines` over all of the author's commits; unknown sizes count as 0.
  pub mean_added_lines: f64,
}

impl AuthorHistory {
  /// Latest timestamp strictly before `ts`.
  pub fn previous_before(&self, ts: &DateTime<Utc>) -> Option<DateTime<Utc>> {
    let idx = self.timestamps.partition_point(|t| t < ts);
    idx.checked_sub(1).map(|i| self.timestamps[i])
  }
}

pub type HistoryMap = HashMap<AuthorKey, AuthorHistory>;

#[derive(Default)]
struct Accumulator {
  timestamps: Vec<DateTime<Utc>>,
  commit_count: usize,
  added_total: u64,
}

/// Build the author map for a whole window. Input order need not be chronological.
pub fn build(commits: &[CommitRecord]) -> HistoryMap {
  let mut acc: HashMap<AuthorKey, Accumulator> = HashMap::new();

  for commit in commits {
    let entry = acc.entry(commit.author_key()).or_default();
    entry.commit_count += 1;
    if let Some(ts) = parse_timestamp(commit.date.as_deref()) {
      entry.timestamps.push(ts);
    }
    entry.added_total = entry.added_total.saturating_add(commit.added_lines.unwrap_or(0));
  }

  acc
    .into_iter()
    .map(|(key, mut a)| {
      a.timestamps.sort();
      let mean_added_lines = if a.commit_count > 0 {
        a.added_total as f64 / a.commit_count as f64
      } else {
        0.0
      };
      let history = AuthorHistory {
        timestamps: a.timestamps,
        commit_count: a.commit_count,
        mean_added_lines,
      };
      (key, history)
    })
    .collect()
}
