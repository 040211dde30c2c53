//! Structured error types for the scan service.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use thiserror::Error;

use crate::types::ErrorBody;

#[derive(Debug, Error)]
pub enum ScanError {
  #[error("{0}")]
  BadRequest(String),

  /// Package unknown to the registry, or no GitHub repository derivable.
  #[error("Failed to resolve npm package: {0}")]
  Resolution(String),

  /// Upstream API answered with a non-success status.
  #[error("Failed to fetch from upstream: {0}")]
  Retrieval(String),

  #[error("http: {0}")]
  Http(#[from] reqwest::Error),
}

impl ScanError {
  pub fn bad_request(msg: impl Into<String>) -> Self {
    Self::BadRequest(msg.into())
  }

  pub fn resolution(msg: impl Into<String>) -> Self {
    Self::Resolution(msg.into())
  }

  pub fn retrieval(msg: impl Into<String>) -> Self {
    Self::Retrieval(msg.into())
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Resolution(_) => StatusCode::NOT_FOUND,
      Self::Retrieval(_) | Self::Http(_) => StatusCode::BAD_GATEWAY,
    }
  }
}

impl IntoResponse for ScanError {
  fn into_response(self) -> Response {
    let body = ErrorBody {
      error: self.to_string(),
    };
    (self.status(), Json(body)).into_response()
  }
}

/// Startup configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("config: {name} must be {expected}, got {value:?}")]
  Invalid {
    name: &'static str,
    expected: &'static str,
    value: String,
  },
}

impl ConfigError {
  pub fn invalid(name: &'static str, expected: &'static str, value: &str) -> Self {
    Self::Invalid {
      name,
      expected,
      value: value.to_string(),
    }
  }
}
