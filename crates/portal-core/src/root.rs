//! Root view: backend liveness and the greeting message.
//!
//! Two independent best-effort fetches. Each writes only its own slot and
//! degrades to a fixed placeholder on failure.

use serde::Deserialize;

use crate::error::Result;

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Health {
  #[serde(default)]
  pub status: Option<String>,
}

/// Body of `GET /api/hello`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Hello {
  pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootView {
  /// Backend health as displayed.
  pub health:   String,
  /// Greeting as displayed.
  pub greeting: String,
}

impl Default for RootView {
  fn default() -> Self {
    Self::new()
  }
}

impl RootView {
  pub fn new() -> Self {
    Self {
      health:   "checking...".to_string(),
      greeting: "Loading...".to_string(),
    }
  }

  pub fn apply_health(&mut self, outcome: Result<Health>) {
    self.health = match outcome {
      Ok(health) => health.status.unwrap_or_else(|| "unknown".to_string()),
      Err(_) => "unreachable".to_string(),
    };
  }

  pub fn apply_greeting(&mut self, outcome: Result<Hello>) {
    self.greeting = match outcome {
      Ok(hello) => hello.message,
      Err(e) => format!("Request failed: {e}"),
    };
  }
}
