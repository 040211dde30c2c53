//! Binary entrypoint: read a JSON array of commits from stdin, write scored commits to stdout.

use npm_risk_engine::{score_commits, CommitRecord};
use std::io::{self, Read, Write};

fn main() {
  if let Err(e) = run_binary() {
    let _ = writeln!(io::stderr(), "npm-risk-engine error: {}", e);
    std::process::exit(1);
  }
}

fn run_binary() -> Result<(), Box<dyn std::error::Error>> {
  let mut raw = String::new();
  io::stdin().lock().read_to_string(&mut raw)?;
  let commits: Vec<CommitRecord> = serde_json::from_str(&raw)?;

  let out = score_commits(&commits);
  let json = serde_json::to_vec(&out)?;
  io::stdout().write_all(&json)?;
  Ok(())
}
