//! Service configuration, read from the environment once at startup.

use std::net::IpAddr;

use crate::error::ConfigError;
use crate::github::GithubConfig;
use crate::npm::NpmConfig;

pub const DEFAULT_USER_AGENT: &str = "npm-risk-scanner";

/// Bounds on the commit window a caller may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanLimits {
  pub default_commits: usize,
  pub max_commits: usize,
}

impl Default for ScanLimits {
  fn default() -> Self {
    Self {
      default_commits: 30,
      max_commits: 300,
    }
  }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
  pub bind_addr: IpAddr,
  pub port: u16,
  pub github: GithubConfig,
  pub npm: NpmConfig,
  pub limits: ScanLimits,
}

impl ServiceConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|name| std::env::var(name).ok())
  }

  /// Build from any key lookup. Unset or empty keys take defaults.
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    let port = match get("PORT") {
      Some(v) => v
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid("PORT", "a valid u16", &v))?,
      None => 5001,
    };
    let bind_addr = match get("BIND_ADDR") {
      Some(v) => v
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid("BIND_ADDR", "an IP address", &v))?,
      None => IpAddr::from([127, 0, 0, 1]),
    };

    let defaults = ScanLimits::default();
    let default_commits = parse_count(get("SCAN_DEFAULT_COMMITS"), "SCAN_DEFAULT_COMMITS")?
      .unwrap_or(defaults.default_commits);
    let max_commits =
      parse_count(get("SCAN_MAX_COMMITS"), "SCAN_MAX_COMMITS")?.unwrap_or(defaults.max_commits);
    if default_commits > max_commits {
      return Err(ConfigError::invalid(
        "SCAN_DEFAULT_COMMITS",
        "<= SCAN_MAX_COMMITS",
        &default_commits.to_string(),
      ));
    }

    let user_agent = get("HTTP_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    let mut github = GithubConfig {
      token: get("GITHUB_TOKEN"),
      user_agent: user_agent.clone(),
      ..GithubConfig::default()
    };
    if let Some(base) = get("GITHUB_API_BASE") {
      github.api_base = base.trim_end_matches('/').to_string();
    }

    let mut npm = NpmConfig {
      user_agent,
      ..NpmConfig::default()
    };
    if let Some(url) = get("NPM_REGISTRY_URL") {
      npm.registry_url = url.trim_end_matches('/').to_string();
    }

    Ok(Self {
      bind_addr,
      port,
      github,
      npm,
      limits: ScanLimits {
        default_commits,
        max_commits,
      },
    })
  }
}

fn parse_count(value: Option<String>, name: &'static str) -> Result<Option<usize>, ConfigError> {
  match value {
    None => Ok(None),
    Some(v) => match v.trim().parse::<usize>() {
      Ok(n) if n > 0 => Ok(Some(n)),
      _ => Err(ConfigError::invalid(name, "a positive integer", &v)),
    },
  }
}
