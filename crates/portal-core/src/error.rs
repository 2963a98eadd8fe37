//! Error types for `portal-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The request never produced a response (connection refused, DNS, TLS…).
  #[error("{0}")]
  Transport(String),

  /// The server answered with a non-success status other than 401.
  #[error("server responded with status {0}")]
  Status(u16),

  #[error("malformed response body: {0}")]
  Malformed(#[from] serde_json::Error),

  #[error("authenticated response carries no user record")]
  MissingUser,

  /// The fetch task ended without reporting an outcome.
  #[error("request was abandoned before it completed")]
  Abandoned,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
