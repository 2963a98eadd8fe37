//! The identity fetch state machine.
//!
//! ```text
//!            trigger()                resolve(ticket, Ok(identity))
//!   ┌──────────────────────► Loading ─────────────────────────────► Resolved
//!   │                           │
//!   │                           └────────────────────────────────► Errored
//!   └──────── any state         resolve(ticket, Err(e))
//! ```
//!
//! Every trigger hands out a [`Ticket`]. Only the most recently issued ticket
//! may resolve the view; outcomes for older tickets are reported as
//! [`Resolution::Stale`] and leave the state untouched. A ticket resolves at
//! most once.

use crate::{
  error::{Error, Result},
  identity::Identity,
  source::{IdentitySource, SessionCredential},
  view::IdentityPresentation,
};

/// Shown when a failure carries no description of its own.
pub const FETCH_FALLBACK_MESSAGE: &str = "Failed to fetch user";

/// Sequence number tying an outcome to the trigger that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
  pub fn seq(self) -> u64 {
    self.0
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityState {
  Loading,
  Resolved(Identity),
  Errored(String),
}

/// What [`IdentityView::resolve`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Resolution {
  Applied,
  /// A newer trigger is in flight, or this ticket already resolved.
  Stale,
}

// ─── IdentityView ────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct IdentityView {
  state:   IdentityState,
  issued:  u64,
  pending: Option<u64>,
}

impl Default for IdentityView {
  fn default() -> Self {
    Self::new()
  }
}

impl IdentityView {
  /// A view that has not fetched anything yet. It starts out loading.
  pub fn new() -> Self {
    Self {
      state:   IdentityState::Loading,
      issued:  0,
      pending: None,
    }
  }

  pub fn state(&self) -> &IdentityState {
    &self.state
  }

  pub fn is_loading(&self) -> bool {
    self.state == IdentityState::Loading
  }

  /// The most recently issued ticket, if any.
  pub fn latest(&self) -> Option<Ticket> {
    (self.issued > 0).then_some(Ticket(self.issued))
  }

  /// Enter `Loading`, dropping any previous error, and issue a ticket for the
  /// request about to be made.
  pub fn trigger(&mut self) -> Ticket {
    self.issued += 1;
    self.pending = Some(self.issued);
    self.state = IdentityState::Loading;
    Ticket(self.issued)
  }

  /// Leave `Loading` with the outcome of the request behind `ticket`.
  pub fn resolve(&mut self, ticket: Ticket, outcome: Result<Identity>) -> Resolution {
    if self.pending != Some(ticket.0) {
      return Resolution::Stale;
    }
    self.pending = None;
    self.state = match outcome {
      Ok(identity) => IdentityState::Resolved(identity),
      Err(e) => IdentityState::Errored(error_message(&e)),
    };
    Resolution::Applied
  }

  pub fn presentation(&self) -> IdentityPresentation {
    match &self.state {
      IdentityState::Loading => IdentityPresentation::Loading,
      IdentityState::Resolved(identity) => identity.into(),
      IdentityState::Errored(message) => IdentityPresentation::Error(message.clone()),
    }
  }
}

/// Run one full cycle in place: trigger, fetch once, resolve.
pub async fn refresh<S>(
  view: &mut IdentityView,
  source: &S,
  credential: Option<&SessionCredential>,
) -> Resolution
where
  S: IdentitySource,
{
  let ticket = view.trigger();
  let outcome = source.fetch_identity(credential).await;
  view.resolve(ticket, outcome)
}

fn error_message(error: &Error) -> String {
  let message = error.to_string();
  if message.trim().is_empty() {
    FETCH_FALLBACK_MESSAGE.to_string()
  } else {
    message
  }
}

#[cfg(test)]
mod tests {
  use std::{
    future::Future,
    sync::{
      Mutex,
      atomic::{AtomicUsize, Ordering},
    },
  };

  use super::*;
  use crate::{
    identity::{EmailVerification, User},
    view::{EMAIL_NOT_VERIFIED, NOT_LOGGED_IN, Tone},
  };

  /// Replays canned `(status, body)` responses, or a transport error.
  struct Scripted {
    responses: Mutex<Vec<Result<(u16, &'static str), String>>>,
    calls:     AtomicUsize,
    seen:      Mutex<Vec<Option<String>>>,
  }

  impl Scripted {
    fn new(mut responses: Vec<Result<(u16, &'static str), String>>) -> Self {
      responses.reverse();
      Self {
        responses: Mutex::new(responses),
        calls:     AtomicUsize::new(0),
        seen:      Mutex::new(Vec::new()),
      }
    }

    fn always(status: u16, body: &'static str) -> Self {
      Self::new(vec![Ok((status, body)); 8])
    }
  }

  impl IdentitySource for Scripted {
    fn fetch_identity<'a>(
      &'a self,
      credential: Option<&'a SessionCredential>,
    ) -> impl Future<Output = Result<Identity>> + Send + 'a {
      self.calls.fetch_add(1, Ordering::SeqCst);
      self
        .seen
        .lock()
        .unwrap()
        .push(credential.map(|c| c.expose().to_string()));
      let next = self.responses.lock().unwrap().pop().expect("script exhausted");
      async move {
        match next {
          Ok((status, body)) => Identity::from_response(status, body.as_bytes()),
          Err(message) => Err(Error::Transport(message)),
        }
      }
    }
  }

  const ANN: &str = r#"{"authenticated":true,"user":{"id":"1","email":"a@b.com","first_name":"Ann","last_name":null}}"#;

  fn texts(view: &IdentityView) -> Vec<String> {
    view.presentation().lines().into_iter().map(|l| l.text).collect()
  }

  // ── Transitions ──────────────────────────────────────────────────────────

  #[test]
  fn starts_loading() {
    let view = IdentityView::new();
    assert!(view.is_loading());
    assert_eq!(view.latest(), None);
  }

  #[test]
  fn trigger_clears_previous_error() {
    let mut view = IdentityView::new();
    let t = view.trigger();
    let _ = view.resolve(t, Err(Error::Transport("down".into())));
    assert_eq!(view.state(), &IdentityState::Errored("down".into()));

    view.trigger();
    assert!(view.is_loading());
  }

  #[test]
  fn every_exit_path_clears_loading() {
    let outcomes: Vec<Result<Identity>> = vec![
      Ok(Identity::Unauthenticated),
      Ok(Identity::Authenticated(User::default())),
      Err(Error::Transport("connection refused".into())),
    ];
    for outcome in outcomes {
      let mut view = IdentityView::new();
      let t = view.trigger();
      assert!(view.is_loading());
      assert_eq!(view.resolve(t, outcome), Resolution::Applied);
      assert!(!view.is_loading());
    }
  }

  #[test]
  fn stale_ticket_is_discarded() {
    let mut view = IdentityView::new();
    let first = view.trigger();
    let second = view.trigger();

    assert_eq!(view.resolve(first, Ok(Identity::Unauthenticated)), Resolution::Stale);
    assert!(view.is_loading());

    assert_eq!(view.resolve(second, Err(Error::Transport("x".into()))), Resolution::Applied);
    assert_eq!(view.resolve(first, Ok(Identity::Unauthenticated)), Resolution::Stale);
    assert_eq!(view.state(), &IdentityState::Errored("x".into()));
  }

  #[test]
  fn ticket_resolves_once() {
    let mut view = IdentityView::new();
    let t = view.trigger();
    assert_eq!(view.resolve(t, Ok(Identity::Unauthenticated)), Resolution::Applied);
    assert_eq!(view.resolve(t, Err(Error::Abandoned)), Resolution::Stale);
    assert_eq!(view.state(), &IdentityState::Resolved(Identity::Unauthenticated));
  }

  #[test]
  fn empty_error_description_uses_fallback() {
    let mut view = IdentityView::new();
    let t = view.trigger();
    let _ = view.resolve(t, Err(Error::Transport(String::new())));
    assert_eq!(view.state(), &IdentityState::Errored(FETCH_FALLBACK_MESSAGE.into()));
  }

  // ── Full cycles ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn scenario_unauthorized_shows_not_logged_in() {
    let source = Scripted::always(401, "");
    let mut view = IdentityView::new();
    assert_eq!(refresh(&mut view, &source, None).await, Resolution::Applied);
    assert_eq!(texts(&view)[0], NOT_LOGGED_IN);
  }

  #[tokio::test]
  async fn scenario_first_name_only() {
    let source = Scripted::always(200, ANN);
    let mut view = IdentityView::new();
    let _ = refresh(&mut view, &source, None).await;
    assert_eq!(texts(&view), vec!["Ann", "a@b.com", "[r] Refresh"]);
  }

  #[tokio::test]
  async fn scenario_unverified_email_without_names() {
    let source = Scripted::always(
      200,
      r#"{"authenticated":true,"user":{"id":"1","email":"a@b.com","email_verified":false}}"#,
    );
    let mut view = IdentityView::new();
    let _ = refresh(&mut view, &source, None).await;

    let lines = view.presentation().lines();
    assert_eq!(lines[0].text, "a@b.com");
    assert_eq!(lines[1].text, "a@b.com");
    assert_eq!(lines[2].text, EMAIL_NOT_VERIFIED);
    assert_eq!(lines[2].tone, Tone::Unverified);
  }

  #[tokio::test]
  async fn scenario_network_error() {
    let source = Scripted::new(vec![Err("error sending request: connection refused".into())]);
    let mut view = IdentityView::new();
    let _ = refresh(&mut view, &source, None).await;

    assert!(!view.is_loading());
    let lines = view.presentation().lines();
    assert_eq!(lines[0].text, "error sending request: connection refused");
    assert_eq!(lines[0].tone, Tone::Error);
  }

  #[tokio::test]
  async fn refresh_is_idempotent() {
    let source = Scripted::always(200, ANN);
    let mut view = IdentityView::new();
    let _ = refresh(&mut view, &source, None).await;
    let first = view.presentation();
    let _ = refresh(&mut view, &source, None).await;
    assert_eq!(view.presentation(), first);
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn credential_is_passed_through() {
    let source = Scripted::always(401, "");
    let credential = SessionCredential::new("sealed");
    let mut view = IdentityView::new();
    let _ = refresh(&mut view, &source, Some(&credential)).await;
    let _ = refresh(&mut view, &source, None).await;
    assert_eq!(
      *source.seen.lock().unwrap(),
      vec![Some("sealed".to_string()), None],
    );
  }

  #[tokio::test]
  async fn refresh_after_error_recovers() {
    let source = Scripted::new(vec![Err("offline".into()), Ok((200, ANN))]);
    let mut view = IdentityView::new();
    let _ = refresh(&mut view, &source, None).await;
    assert_eq!(view.state(), &IdentityState::Errored("offline".into()));

    let _ = refresh(&mut view, &source, None).await;
    match view.state() {
      IdentityState::Resolved(Identity::Authenticated(user)) => {
        assert_eq!(user.email_verified, EmailVerification::Absent);
      }
      other => panic!("unexpected state {other:?}"),
    }
  }
}
