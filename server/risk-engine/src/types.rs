//! Input/output types for the risk engine (JSON contract with the scan service).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// One commit as delivered by the retrieval layer. Unknown fields are ignored;
/// wrong-typed metadata is treated as absent rather than rejecting the window.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRecord {
  pub sha: String,
  #[serde(default, deserialize_with = "lenient_string")]
  pub author_name: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub author_email: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub message: Option<String>,
  /// ISO-8601 / RFC 3339 timestamp. Unparseable values disable timing flags.
  #[serde(default, deserialize_with = "lenient_string")]
  pub date: Option<String>,
  /// Inserted line count; `None` when the diff could not be measured (counts as 0).
  #[serde(default, alias = "added_lines", deserialize_with = "lenient_count")]
  pub added_lines: Option<u64>,
  /// Raw unified diff; empty when retrieval failed.
  #[serde(default, deserialize_with = "string_or_empty")]
  pub diff: String,
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
  Ok(match Value::deserialize(d)? {
    Value::String(s) => Some(s),
    _ => None,
  })
}

fn lenient_count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
  Ok(match Value::deserialize(d)? {
    Value::Number(n) => n.as_u64(),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  })
}

fn string_or_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
  Ok(lenient_string(d)?.unwrap_or_default())
}

fn non_empty(v: &Option<String>) -> Option<&str> {
  v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl CommitRecord {
  /// Identity used to group commits: email, then name, then "unknown".
  pub fn author_key(&self) -> AuthorKey {
    let key = non_empty(&self.author_email)
      .or_else(|| non_empty(&self.author_name))
      .unwrap_or("unknown");
    AuthorKey(key.to_string())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AuthorKey(pub String);

// ---------------------------------------------------------------------------
// Flags and levels
// ---------------------------------------------------------------------------

/// Risk flag tags. Variants are declared in lexicographic order of their
/// serialized names so that `Ord` matches string order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
  ChildProcessNetwork,
  EncodedPayloadEval,
  HibernatingAuthor,
  InfiniteLoopTopLevel,
  NewAuthor,
  NewDependency,
  NewPostinstallScript,
  SecretFsAccess,
  SuddenLargeDiff,
}

impl Flag {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::ChildProcessNetwork => "child_process_network",
      Self::EncodedPayloadEval => "encoded_payload_eval",
      Self::HibernatingAuthor => "hibernating_author",
      Self::InfiniteLoopTopLevel => "infinite_loop_top_level",
      Self::NewAuthor => "new_author",
      Self::NewDependency => "new_dependency",
      Self::NewPostinstallScript => "new_postinstall_script",
      Self::SecretFsAccess => "secret_fs_access",
      Self::SuddenLargeDiff => "sudden_large_diff",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
  Low,
  Medium,
  High,
}

impl RiskLevel {
  /// Bucket a clamped score: >= 70 high, >= 30 medium, else low.
  pub fn from_score(score: u8) -> Self {
    if score >= 70 {
      Self::High
    } else if score >= 30 {
      Self::Medium
    } else {
      Self::Low
    }
  }
}

/// Result of the content-only pass over one diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentScore {
  pub score: u8,
  pub level: RiskLevel,
  pub flags: BTreeSet<Flag>,
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// One scored commit in the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCommit {
  pub sha: String,
  pub author_name: Option<String>,
  pub author_email: Option<String>,
  pub message: Option<String>,
  pub risk_score: u8,
  pub risk_level: RiskLevel,
  pub flags: BTreeSet<Flag>,
}
