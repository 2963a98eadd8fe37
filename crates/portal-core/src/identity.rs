//! Identity — the authenticated/unauthenticated union served by `GET /api/me`.
//!
//! On the wire the union is tagged by a boolean:
//!
//! ```json
//! { "authenticated": false }
//! { "authenticated": true, "user": { "id": "user_01", "email": "a@b.com" } }
//! ```
//!
//! The user record only exists inside [`Identity::Authenticated`], so there is
//! no way to read user fields off a signed-out result.

use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};

/// Status code the backend uses to say "no session".
pub const UNAUTHORIZED: u16 = 401;

// ─── Identity ────────────────────────────────────────────────────────────────

/// Result of asking the backend who the current session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "WireIdentity")]
pub enum Identity {
  Unauthenticated,
  Authenticated(User),
}

impl Identity {
  /// Interpret a raw `/api/me` response.
  ///
  /// A 401 is a normal outcome and maps to [`Identity::Unauthenticated`]
  /// without looking at the body. Any other non-success status is an error;
  /// success bodies must parse as the tagged union.
  pub fn from_response(status: u16, body: &[u8]) -> Result<Self> {
    if status == UNAUTHORIZED {
      return Ok(Identity::Unauthenticated);
    }
    if !(200..300).contains(&status) {
      return Err(Error::Status(status));
    }
    Ok(serde_json::from_slice(body)?)
  }

  pub fn user(&self) -> Option<&User> {
    match self {
      Identity::Authenticated(user) => Some(user),
      Identity::Unauthenticated => None,
    }
  }
}

/// `user` stays untyped until the tag says it may be read.
#[derive(Deserialize)]
struct WireIdentity {
  authenticated: bool,
  #[serde(default)]
  user:          Option<serde_json::Value>,
}

impl TryFrom<WireIdentity> for Identity {
  type Error = Error;

  fn try_from(wire: WireIdentity) -> Result<Self> {
    match (wire.authenticated, wire.user) {
      (false, _) => Ok(Identity::Unauthenticated),
      (true, Some(user)) => Ok(Identity::Authenticated(serde_json::from_value(user)?)),
      (true, None) => Err(Error::MissingUser),
    }
  }
}

// ─── User ────────────────────────────────────────────────────────────────────

/// Profile of the signed-in user. Every field is nullable upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct User {
  #[serde(default)]
  pub id:                Option<String>,
  #[serde(default)]
  pub email:             Option<String>,
  #[serde(default)]
  pub first_name:        Option<String>,
  #[serde(default)]
  pub last_name:         Option<String>,
  #[serde(default, deserialize_with = "present")]
  pub email_verified:    EmailVerification,
  #[serde(default)]
  pub profile_photo_url: Option<String>,
}

impl User {
  /// First and last name joined by a space, skipping empty parts.
  /// Falls back to the email address when neither name is set.
  pub fn display_name(&self) -> String {
    let name = [self.first_name.as_deref(), self.last_name.as_deref()]
      .into_iter()
      .flatten()
      .map(str::trim)
      .filter(|part| !part.is_empty())
      .collect::<Vec<_>>()
      .join(" ");

    if name.is_empty() {
      self.email.clone().unwrap_or_default()
    } else {
      name
    }
  }

  /// Profile photo URL, ignoring empty strings.
  pub fn photo_url(&self) -> Option<&str> {
    self
      .profile_photo_url
      .as_deref()
      .filter(|url| !url.trim().is_empty())
  }
}

// ─── Email verification ──────────────────────────────────────────────────────

/// `email_verified` distinguishes a missing key from an explicit `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmailVerification {
  /// The key was not sent at all.
  #[default]
  Absent,
  /// The key was sent; `None` means it was `null`.
  Present(Option<bool>),
}

impl EmailVerification {
  /// `None` when absent, otherwise whether the address counts as verified.
  /// An explicit `null` counts as not verified.
  pub fn verified(self) -> Option<bool> {
    match self {
      EmailVerification::Absent => None,
      EmailVerification::Present(value) => Some(value.unwrap_or(false)),
    }
  }
}

/// Only runs when the key exists, so a missing key keeps the `Absent` default.
fn present<'de, D>(deserializer: D) -> Result<EmailVerification, D::Error>
where
  D: Deserializer<'de>,
{
  Option::<bool>::deserialize(deserializer).map(EmailVerification::Present)
}
