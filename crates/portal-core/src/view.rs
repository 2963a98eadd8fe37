//! Presentation model for the identity view.
//!
//! Both the terminal UI and the plain-text output render from
//! [`IdentityPresentation::lines`], so what the user sees is a pure function
//! of the current [`crate::session::IdentityState`].

use crate::identity::{Identity, User};

pub const PLACEHOLDER: &str = "Refresh to see User Info";
pub const NOT_LOGGED_IN: &str = "You are not logged in";
pub const EMAIL_VERIFIED: &str = "Email verified";
pub const EMAIL_NOT_VERIFIED: &str = "Email not verified";
pub const REFRESH_CONTROL: &str = "[r] Refresh";

/// Visual treatment of a line. Front-ends map tones to concrete styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
  Neutral,
  /// Display name.
  Emphasis,
  /// Secondary text such as the raw email.
  Muted,
  Error,
  Verified,
  Unverified,
  /// An interactive control hint.
  Control,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewLine {
  pub text: String,
  pub tone: Tone,
}

impl ViewLine {
  fn new(text: impl Into<String>, tone: Tone) -> Self {
    Self { text: text.into(), tone }
  }
}

// ─── Presentation ────────────────────────────────────────────────────────────

/// The signed-in user, reduced to what gets shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
  pub photo_url: Option<String>,
  pub name:      String,
  pub email:     String,
  /// `None` hides the verification indicator.
  pub verified:  Option<bool>,
}

impl From<&User> for Profile {
  fn from(user: &User) -> Self {
    Self {
      photo_url: user.photo_url().map(str::to_owned),
      name:      user.display_name(),
      email:     user.email.clone().unwrap_or_default(),
      verified:  user.email_verified.verified(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityPresentation {
  Loading,
  Error(String),
  Profile(Profile),
  SignedOut,
}

impl From<&Identity> for IdentityPresentation {
  fn from(identity: &Identity) -> Self {
    match identity {
      Identity::Authenticated(user) => IdentityPresentation::Profile(user.into()),
      Identity::Unauthenticated => IdentityPresentation::SignedOut,
    }
  }
}

impl IdentityPresentation {
  /// Lines to draw, top to bottom. The refresh control is always last.
  pub fn lines(&self) -> Vec<ViewLine> {
    let mut lines = Vec::new();

    match self {
      IdentityPresentation::Loading => lines.push(ViewLine::new(PLACEHOLDER, Tone::Neutral)),
      IdentityPresentation::Error(message) => {
        lines.push(ViewLine::new(message.as_str(), Tone::Error));
      }
      IdentityPresentation::Profile(profile) => {
        if let Some(url) = &profile.photo_url {
          lines.push(ViewLine::new(format!("◉ {url}"), Tone::Muted));
        }
        lines.push(ViewLine::new(profile.name.as_str(), Tone::Emphasis));
        lines.push(ViewLine::new(profile.email.as_str(), Tone::Muted));
        match profile.verified {
          Some(true) => lines.push(ViewLine::new(EMAIL_VERIFIED, Tone::Verified)),
          Some(false) => lines.push(ViewLine::new(EMAIL_NOT_VERIFIED, Tone::Unverified)),
          None => {}
        }
      }
      IdentityPresentation::SignedOut => lines.push(ViewLine::new(NOT_LOGGED_IN, Tone::Neutral)),
    }

    lines.push(ViewLine::new(REFRESH_CONTROL, Tone::Control));
    lines
  }
}
