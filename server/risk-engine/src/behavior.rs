//! Behavioral flags: deviations from the author's pattern within the window.

use std::collections::BTreeSet;

use crate::config::Config;
use crate::history::{self, AuthorHistory, HistoryMap};
use crate::score;
use crate::types::{CommitRecord, ContentScore, Flag, RiskLevel};

/// Content result plus behavioral additions, re-clamped and re-levelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Augmented {
  pub score: u8,
  pub level: RiskLevel,
  pub flags: BTreeSet<Flag>,
}

/// Only commit in the window for this author, with a parseable date.
fn is_new_author(history: &AuthorHistory) -> bool {
  history.timestamps.len() == 1 && history.commit_count == 1
}

fn is_hibernating(commit: &CommitRecord, history: &AuthorHistory, config: &Config) -> bool {
  let Some(ts) = history::parse_timestamp(commit.date.as_deref()) else {
    return false;
  };
  if history.timestamps.len() < 2 {
    return false;
  }
  match history.previous_before(&ts) {
    Some(prev) => (ts - prev).num_days() >= config.hibernation_days,
    None => false,
  }
}

fn is_sudden_large_diff(commit: &CommitRecord, history: &AuthorHistory, config: &Config) -> bool {
  let added = commit.added_lines.unwrap_or(0);
  let mean = history.mean_added_lines;
  added >= config.large_diff_min_lines
    && mean > 0.0
    && added as f64 >= config.large_diff_multiplier * mean
}

/// Add behavioral flags and deltas to a content score.
pub fn augment(
  commit: &CommitRecord,
  content: &ContentScore,
  histories: &HistoryMap,
  config: &Config,
) -> Augmented {
  let mut flags = content.flags.clone();
  let mut total = u32::from(content.score);

  if let Some(h) = histories.get(&commit.author_key()) {
    if is_new_author(h) {
      flags.insert(Flag::NewAuthor);
      total = total.saturating_add(config.new_author_delta);
    }
    if is_hibernating(commit, h, config) {
      flags.insert(Flag::HibernatingAuthor);
      total = total.saturating_add(config.hibernating_author_delta);
    }
    if is_sudden_large_diff(commit, h, config) {
      flags.insert(Flag::SuddenLargeDiff);
      total = total.saturating_add(config.sudden_large_diff_delta);
    }
  }

  let score = score::clamp_score(total);
  Augmented {
    score,
    level: RiskLevel::from_score(score),
    flags,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn commit(sha: &str, email: &str, date: &str, added: u64) -> CommitRecord {
    CommitRecord {
      sha: sha.into(),
      author_email: Some(email.into()),
      date: Some(date.into()),
      added_lines: Some(added),
      ..Default::default()
    }
  }

  fn empty_content() -> ContentScore {
    ContentScore {
      score: 0,
      level: RiskLevel::Low,
      flags: BTreeSet::new(),
    }
  }

  #[test]
  fn single_commit_author_is_new() {
    let commits = vec![commit("a", "solo@x", "2025-01-01T00:00:00Z", 5)];
    let map = history::build(&commits);
    let out = augment(&commits[0], &empty_content(), &map, &Config::default());
    assert!(out.flags.contains(&Flag::NewAuthor));
    assert_eq!(out.score, 10);
    assert_eq!(out.level, RiskLevel::Low);
  }

  #[test]
  fn unparseable_date_is_never_new_author() {
    let commits = vec![commit("a", "solo@x", "not a date", 5)];
    let map = history::build(&commits);
    let out = augment(&commits[0], &empty_content(), &map, &Config::default());
    assert!(out.flags.is_empty());
  }

  #[test]
  fn hibernation_boundary() {
    let commits = vec![
      commit("b", "h@x", "2025-04-01T00:00:00Z", 5),
      commit("a", "h@x", "2025-01-01T00:00:00Z", 5),
    ];
    // 2025-01-01 -> 2025-04-01 is exactly 90 days.
    let map = history::build(&commits);
    let late = augment(&commits[0], &empty_content(), &map, &Config::default());
    assert!(late.flags.contains(&Flag::HibernatingAuthor));
    let early = augment(&commits[1], &empty_content(), &map, &Config::default());
    assert!(!early.flags.contains(&Flag::HibernatingAuthor));

    let commits = vec![
      commit("b", "h@x", "2025-03-31T00:00:00Z", 5),
      commit("a", "h@x", "2025-01-01T00:00:00Z", 5),
    ];
    let map = history::build(&commits);
    let out = augment(&commits[0], &empty_content(), &map, &Config::default());
    assert!(!out.flags.contains(&Flag::HibernatingAuthor));
  }

  #[test]
  fn large_diff_needs_floor_and_multiplier() {
    let mut commits: Vec<CommitRecord> = (0..20)
      .map(|i| commit(&format!("s{}", i), "big@x", "2025-01-01T00:00:00Z", 10))
      .collect();
    commits.push(commit("huge", "big@x", "2025-01-02T00:00:00Z", 200));
    let map = history::build(&commits);
    let out = augment(&commits[20], &empty_content(), &map, &Config::default());
    assert!(out.flags.contains(&Flag::SuddenLargeDiff));
    assert_eq!(out.score, 20);

    let small = commit("small", "big@x", "2025-01-02T00:00:00Z", 40);
    let out = augment(&small, &empty_content(), &map, &Config::default());
    assert!(!out.flags.contains(&Flag::SuddenLargeDiff));
  }

  #[test]
  fn unknown_sizes_lower_the_mean() {
    let mut commits: Vec<CommitRecord> = (0..9)
      .map(|i| CommitRecord {
        sha: format!("u{}", i),
        author_email: Some("big@x".into()),
        date: Some(format!("2025-01-{:02}T00:00:00Z", i + 1)),
        ..Default::default()
      })
      .collect();
    commits.push(commit("huge", "big@x", "2025-01-20T00:00:00Z", 200));
    // Mean is 200 / 10 = 20, so 200 clears the 5x bar.
    let map = history::build(&commits);
    let out = augment(&commits[9], &empty_content(), &map, &Config::default());
    assert!(out.flags.contains(&Flag::SuddenLargeDiff));
  }

  #[test]
  fn two_commits_one_parseable_date_is_not_new() {
    let commits = vec![
      commit("a", "pair@x", "2025-01-01T00:00:00Z", 5),
      commit("b", "pair@x", "sometime last week", 5),
    ];
    let map = history::build(&commits);
    for c in &commits {
      let out = augment(c, &empty_content(), &map, &Config::default());
      assert!(!out.flags.contains(&Flag::NewAuthor), "{}", c.sha);
    }
  }

  #[test]
  fn huge_custom_deltas_saturate() {
    let config = Config {
      new_author_delta: u32::MAX,
      ..Config::default()
    };
    let commits = vec![commit("a", "solo@x", "2025-01-01T00:00:00Z", 5)];
    let map = history::build(&commits);
    let content = ContentScore {
      score: 50,
      level: RiskLevel::Medium,
      flags: BTreeSet::new(),
    };
    let out = augment(&commits[0], &content, &map, &config);
    assert_eq!(out.score, 100);
  }

  #[test]
  fn deltas_stack_and_clamp() {
    let commits = vec![commit("a", "solo@x", "2025-01-01T00:00:00Z", 5)];
    let map = history::build(&commits);
    let content = ContentScore {
      score: 95,
      level: RiskLevel::High,
      flags: [Flag::EncodedPayloadEval].into_iter().collect(),
    };
    let out = augment(&commits[0], &content, &map, &Config::default());
    assert_eq!(out.score, 100);
    assert_eq!(out.level, RiskLevel::High);
    assert_eq!(out.flags.len(), 2);
  }

  #[test]
  fn level_is_recomputed_after_deltas() {
    let commits = vec![commit("a", "solo@x", "2025-01-01T00:00:00Z", 5)];
    let map = history::build(&commits);
    let content = ContentScore {
      score: 20,
      level: RiskLevel::Low,
      flags: [Flag::NewDependency].into_iter().collect(),
    };
    let out = augment(&commits[0], &content, &map, &Config::default());
    assert_eq!(out.score, 30);
    assert_eq!(out.level, RiskLevel::Medium);
  }
}
