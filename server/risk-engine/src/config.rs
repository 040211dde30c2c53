//! Engine configuration with sane defaults.

/// Tunable thresholds for the behavioral pass.
#[derive(Debug, Clone)]
pub struct Config {
  /// Whole days since the author's previous commit before a commit counts as "hibernating".
  pub hibernation_days: i64,
  /// Minimum added lines before a diff can be "sudden large".
  pub large_diff_min_lines: u64,
  /// Added lines must reach this multiple of the author's mean.
  pub large_diff_multiplier: f64,
  pub new_author_delta: u32,
  pub hibernating_author_delta: u32,
  pub sudden_large_diff_delta: u32,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      hibernation_days: 90,
      large_diff_min_lines: 50,
      large_diff_multiplier: 5.0,
      new_author_delta: 10,
      hibernating_author_delta: 10,
      sudden_large_diff_delta: 20,
    }
  }
}
