//! heuristic-eval: score labeled commits and report how well the content rules separate them
//!
//! Usage:
//!   heuristic-eval <dataset.json>                 # threshold 70
//!   heuristic-eval <dataset.json> --threshold 50  # custom cut-off
//!   heuristic-eval <dataset.json> -q              # summary only
//!
//! Dataset: JSON array of {"owner", "repo", "sha", "label": "malicious"|"benign"}.
//! An inline "diff" skips the GitHub fetch. GITHUB_TOKEN is honored.

use npm_risk_engine::score_diff;
use scan_service::{GithubClient, RepoRef, ServiceConfig};
use std::env;
use std::fs;
use std::process;
use tracing_subscriber::EnvFilter;

const DEFAULT_THRESHOLD: u8 = 70;

#[derive(Debug, serde::Deserialize)]
struct LabeledCommit {
  owner: String,
  repo: String,
  sha: String,
  label: String,
  #[serde(default)]
  diff: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
  Malicious,
  Benign,
}

impl Label {
  fn parse(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "malicious" => Some(Self::Malicious),
      "benign" => Some(Self::Benign),
      _ => None,
    }
  }

  fn as_str(self) -> &'static str {
    match self {
      Self::Malicious => "malicious",
      Self::Benign => "benign",
    }
  }
}

#[derive(Debug, PartialEq)]
struct Args {
  dataset: String,
  threshold: u8,
  quiet: bool,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
  let mut dataset = None;
  let mut threshold = DEFAULT_THRESHOLD;
  let mut quiet = false;

  let mut it = args.iter().skip(1);
  while let Some(arg) = it.next() {
    match arg.as_str() {
      "-q" | "--quiet" => quiet = true,
      "-t" | "--threshold" => {
        let v = it.next().ok_or("--threshold needs a value")?;
        threshold = v
          .parse::<u8>()
          .ok()
          .filter(|t| *t <= 100)
          .ok_or_else(|| format!("invalid threshold {:?} (0-100)", v))?;
      }
      a if a.starts_with('-') => return Err(format!("unknown option {}", a)),
      a => {
        if dataset.replace(a.to_string()).is_some() {
          return Err("expected exactly one dataset file".into());
        }
      }
    }
  }

  Ok(Args {
    dataset: dataset.ok_or("missing dataset file")?,
    threshold,
    quiet,
  })
}

#[derive(Debug, Default, PartialEq)]
struct Confusion {
  tp: u32,
  fp: u32,
  tn: u32,
  fn_: u32,
}

impl Confusion {
  fn record(&mut self, actual: Label, predicted: Label) {
    match (actual, predicted) {
      (Label::Malicious, Label::Malicious) => self.tp += 1,
      (Label::Benign, Label::Malicious) => self.fp += 1,
      (Label::Benign, Label::Benign) => self.tn += 1,
      (Label::Malicious, Label::Benign) => self.fn_ += 1,
    }
  }

  fn precision(&self) -> f64 {
    ratio(self.tp, self.tp + self.fp)
  }

  fn recall(&self) -> f64 {
    ratio(self.tp, self.tp + self.fn_)
  }
}

fn ratio(num: u32, den: u32) -> f64 {
  if den == 0 {
    0.0
  } else {
    num as f64 / den as f64
  }
}

fn predict(score: u8, threshold: u8) -> Label {
  if score >= threshold {
    Label::Malicious
  } else {
    Label::Benign
  }
}

fn load_dataset(path: &str) -> Vec<LabeledCommit> {
  let contents = fs::read_to_string(path).unwrap_or_else(|e| {
    eprintln!("heuristic-eval: cannot read {}: {}", path, e);
    process::exit(2);
  });
  serde_json::from_str(&contents).unwrap_or_else(|e| {
    eprintln!("heuristic-eval: invalid JSON in {}: {}", path, e);
    process::exit(2);
  })
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(std::io::stderr)
    .init();

  let argv: Vec<String> = env::args().collect();
  let args = parse_args(&argv).unwrap_or_else(|e| {
    eprintln!("heuristic-eval: {}", e);
    eprintln!("Usage: heuristic-eval <dataset.json> [--threshold N] [-q|--quiet]");
    process::exit(2);
  });

  let dataset = load_dataset(&args.dataset);
  let client = ServiceConfig::from_env()
    .map_err(|e| e.to_string())
    .and_then(|cfg| GithubClient::new(cfg.github).map_err(|e| e.to_string()))
    .unwrap_or_else(|e| {
      eprintln!("heuristic-eval: {}", e);
      process::exit(2);
    });

  let mut matrix = Confusion::default();

  for item in dataset {
    let Some(actual) = Label::parse(&item.label) else {
      tracing::warn!(sha = %item.sha, "unexpected label {:?}, skipping", item.label);
      continue;
    };
    let repo = RepoRef::new(item.owner, item.repo);

    let diff = match item.diff {
      Some(d) => d,
      None => match client.commit_diff(&repo, &item.sha).await {
        Ok(d) => d,
        Err(e) => {
          tracing::error!(%repo, sha = %item.sha, "failed to evaluate commit: {}", e);
          continue;
        }
      },
    };

    let result = score_diff(&diff);
    let predicted = predict(result.score, args.threshold);
    matrix.record(actual, predicted);

    if !args.quiet {
      let flags: Vec<&str> = result.flags.iter().map(|f| f.as_str()).collect();
      println!("{}@{} label={}", repo, item.sha, actual.as_str());
      println!(
        "  score={} level={:?} predicted={} flags={}",
        result.score,
        result.level,
        predicted.as_str(),
        if flags.is_empty() { "none".to_string() } else { flags.join(", ") }
      );
    }
  }

  println!("threshold = {}", args.threshold);
  println!("TP (malicious correctly flagged): {}", matrix.tp);
  println!("FP (benign wrongly flagged):      {}", matrix.fp);
  println!("TN (benign correctly ignored):    {}", matrix.tn);
  println!("FN (malicious missed):            {}", matrix.fn_);
  println!("precision = {:.3}", matrix.precision());
  println!("recall    = {:.3}", matrix.recall());
}
