//! Content risk flags derived from raw diff text.
//!
//! | Flag | Trigger | Weight |
//! |------|---------|--------|
//! | `encoded_payload_eval` | base64-like run (>= 30) or `0x` hex blob (>= 16), plus `eval(` / `Function(` / `new Function` | 50 |
//! | `new_postinstall_script` | `postinstall` / `preinstall` plus a network fetch indicator | 40 |
//! | `child_process_network` | `child_process` / `exec(` / `spawn(` plus a network fetch indicator | 40 |
//! | `secret_fs_access` | `process.env`, or `.env` / `.ssh` / `id_rsa` | 40 |
//! | `infinite_loop_top_level` | literal `while (true)` or `for (;;)` | 40 |
//! | `new_dependency` | `package.json` + `"dependencies"` + an added `"name": "version"`-ish line | 20 |

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::types::Flag;

static RE_BASE64_RUN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"[A-Za-z0-9+/]{30,}={0,2}").unwrap());

static RE_HEX_BLOB: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"0x[0-9a-fA-F]{16,}").unwrap());

const NETWORK_MARKERS: &[&str] = &["curl ", "wget ", "http://", "https://"];
const INSTALL_HOOKS: &[&str] = &["postinstall", "preinstall"];
const SPAWN_MARKERS: &[&str] = &["child_process", "exec(", "spawn("];
const SECRET_PATHS: &[&str] = &[".env", ".ssh", "id_rsa"];
// Case carries signal here: `Function(` is the constructor, not a word.
const EVAL_MARKERS: &[&str] = &["eval(", "Function(", "new Function"];
const LOOP_MARKERS: &[&str] = &["while (true)", "for (;;)"];

/// Score contribution of a content flag. Behavioral flags contribute nothing here.
pub fn content_weight(flag: Flag) -> u32 {
  match flag {
    Flag::EncodedPayloadEval => 50,
    Flag::NewPostinstallScript
    | Flag::ChildProcessNetwork
    | Flag::SecretFsAccess
    | Flag::InfiniteLoopTopLevel => 40,
    Flag::NewDependency => 20,
    Flag::NewAuthor | Flag::HibernatingAuthor | Flag::SuddenLargeDiff => 0,
  }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
  needles.iter().any(|n| haystack.contains(n))
}

fn has_encoded_blob(diff: &str) -> bool {
  RE_BASE64_RUN.is_match(diff) || RE_HEX_BLOB.is_match(diff)
}

fn has_added_dependency_line(diff: &str) -> bool {
  diff.lines().any(|line| {
    line.trim_start().starts_with('+') && line.contains(':') && line.contains('"')
  })
}

/// Content flags for one diff. Empty diff yields an empty set.
pub fn compute_content_flags(diff: &str) -> BTreeSet<Flag> {
  let mut flags = BTreeSet::new();
  if diff.is_empty() {
    return flags;
  }
  let lower = diff.to_lowercase();
  let fetches = contains_any(&lower, NETWORK_MARKERS);

  if has_encoded_blob(diff) && contains_any(diff, EVAL_MARKERS) {
    flags.insert(Flag::EncodedPayloadEval);
  }
  if contains_any(&lower, INSTALL_HOOKS) && fetches {
    flags.insert(Flag::NewPostinstallScript);
  }
  if contains_any(&lower, SPAWN_MARKERS) && fetches {
    flags.insert(Flag::ChildProcessNetwork);
  }
  if diff.contains("process.env") || contains_any(&lower, SECRET_PATHS) {
    flags.insert(Flag::SecretFsAccess);
  }
  if contains_any(diff, LOOP_MARKERS) {
    flags.insert(Flag::InfiniteLoopTopLevel);
  }
  if diff.contains("package.json")
    && diff.contains("\"dependencies\"")
    && has_added_dependency_line(diff)
  {
    flags.insert(Flag::NewDependency);
  }
  flags
}
