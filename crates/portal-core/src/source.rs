//! The `IdentitySource` trait and the session credential it is handed.
//!
//! The trait is implemented by the HTTP client in `portal-cli`. The state
//! machine in [`crate::session`] depends on this abstraction only, which keeps
//! it testable against scripted sources.

use std::{fmt, future::Future};

use crate::{Result, identity::Identity};

// ─── Credential ──────────────────────────────────────────────────────────────

/// Opaque handle to an existing login session (the sealed session cookie).
///
/// The value is never printed; `Debug` redacts it.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential(String);

impl SessionCredential {
  pub fn new(value: impl Into<String>) -> Self {
    Self(value.into())
  }

  /// The raw token, for the transport layer to attach to a request.
  pub fn expose(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for SessionCredential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("SessionCredential(<redacted>)")
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Anything that can answer "who does this session belong to?".
///
/// One call is one attempt: implementations must not retry.
pub trait IdentitySource: Send + Sync {
  fn fetch_identity<'a>(
    &'a self,
    credential: Option<&'a SessionCredential>,
  ) -> impl Future<Output = Result<Identity>> + Send + 'a;
}
