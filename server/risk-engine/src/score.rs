//! Content score: sum of flag weights, capped at 100, bucketed into a level.

use std::collections::BTreeSet;

use crate::risk;
use crate::types::{ContentScore, Flag, RiskLevel};

/// Sum of weights clamped to 0..=100.
pub fn clamp_score(total: u32) -> u8 {
  total.min(100) as u8
}

/// Total weight of a flag set (content flags only carry weight).
pub fn total_weight(flags: &BTreeSet<Flag>) -> u32 {
  flags.iter().map(|f| risk::content_weight(*f)).sum()
}

/// Score a raw diff. Never fails; an empty diff scores 0 / low.
pub fn score_diff(diff: &str) -> ContentScore {
  let flags = risk::compute_content_flags(diff);
  let score = clamp_score(total_weight(&flags));
  ContentScore {
    score,
    level: RiskLevel::from_score(score),
    flags,
  }
}
