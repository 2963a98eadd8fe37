//! Application state and event dispatcher.
//!
//! Fetches run as spawned tasks and report back over a channel; only the
//! event loop touches view state.

use std::sync::Arc;

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use portal_core::{
  Error, Result,
  identity::Identity,
  root::{Health, Hello, RootView},
  session::{IdentityView, Resolution, Ticket},
  source::SessionCredential,
};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::client::ApiClient;

/// A finished fetch, on its way back to the event loop.
#[derive(Debug)]
pub enum Outcome {
  Identity(Ticket, Result<Identity>),
  Health(Result<Health>),
  Greeting(Result<Hello>),
}

// ─── Reporter ────────────────────────────────────────────────────────────────

/// Sends the outcome for one identity ticket. If it is dropped before
/// [`Reporter::send`] runs (the task panicked or was aborted) it reports
/// [`Error::Abandoned`] so the view never stays loading.
pub(crate) struct Reporter {
  ticket: Ticket,
  tx:     Option<UnboundedSender<Outcome>>,
}

impl Reporter {
  pub(crate) fn new(ticket: Ticket, tx: UnboundedSender<Outcome>) -> Self {
    Self { ticket, tx: Some(tx) }
  }

  pub(crate) fn send(mut self, outcome: Result<Identity>) {
    if let Some(tx) = self.tx.take() {
      tx.send(Outcome::Identity(self.ticket, outcome)).ok();
    }
  }
}

impl Drop for Reporter {
  fn drop(&mut self) {
    if let Some(tx) = self.tx.take() {
      tx.send(Outcome::Identity(self.ticket, Err(Error::Abandoned))).ok();
    }
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Health and greeting slots.
  pub root: RootView,

  /// Session-aware identity view.
  pub identity: IdentityView,

  /// When the identity view last left `Loading`.
  pub refreshed_at: Option<DateTime<Local>>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Shared HTTP client.
  pub client: Arc<ApiClient>,

  credential: Option<SessionCredential>,
  tx:         UnboundedSender<Outcome>,
  rx:         UnboundedReceiver<Outcome>,
}

impl App {
  pub fn new(client: ApiClient, credential: Option<SessionCredential>) -> Self {
    let (tx, rx) = unbounded_channel();
    Self {
      root: RootView::new(),
      identity: IdentityView::new(),
      refreshed_at: None,
      status_msg: String::new(),
      client: Arc::new(client),
      credential,
      tx,
      rx,
    }
  }

  pub fn has_session(&self) -> bool {
    self.credential.is_some()
  }

  // ── Triggers ──────────────────────────────────────────────────────────────

  /// Re-enter the identity cycle and spawn its single request.
  pub fn refresh_identity(&mut self) -> Ticket {
    let ticket = self.identity.trigger();
    self.status_msg.clear();
    tracing::info!(ticket = ticket.seq(), "refreshing identity");

    let reporter = Reporter::new(ticket, self.tx.clone());
    let client = Arc::clone(&self.client);
    let credential = self.credential.clone();
    tokio::spawn(async move {
      let outcome = client.fetch_me(credential.as_ref()).await;
      reporter.send(outcome);
    });
    ticket
  }

  /// Re-issue the health probe and the greeting, independently.
  pub fn refresh_root(&mut self) {
    let client = Arc::clone(&self.client);
    let tx = self.tx.clone();
    tokio::spawn(async move {
      tx.send(Outcome::Health(client.health().await)).ok();
    });

    let client = Arc::clone(&self.client);
    let tx = self.tx.clone();
    tokio::spawn(async move {
      tx.send(Outcome::Greeting(client.hello().await)).ok();
    });
  }

  // ── Outcomes ──────────────────────────────────────────────────────────────

  pub fn apply(&mut self, outcome: Outcome) {
    match outcome {
      Outcome::Identity(ticket, result) => {
        if let Err(e) = &result {
          tracing::warn!(ticket = ticket.seq(), error = %e, "identity fetch failed");
        }
        match self.identity.resolve(ticket, result) {
          Resolution::Applied => self.refreshed_at = Some(Local::now()),
          Resolution::Stale => {
            tracing::debug!(ticket = ticket.seq(), "dropping stale identity outcome");
          }
        }
      }
      Outcome::Health(result) => self.root.apply_health(result),
      Outcome::Greeting(result) => self.root.apply_greeting(result),
    }
  }

  /// Apply every outcome that has already arrived without waiting.
  pub fn drain(&mut self) {
    while let Ok(outcome) = self.rx.try_recv() {
      self.apply(outcome);
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => return false,
      KeyCode::Char('r') => {
        self.refresh_identity();
      }
      KeyCode::Char('h') => {
        self.root = RootView::new();
        self.refresh_root();
      }
      KeyCode::Char('i') => self.navigate(self.client.login_url()),
      KeyCode::Char('o') => self.navigate(self.client.logout_url()),
      _ => {}
    }
    true
  }

  /// Hand a backend navigation target to the platform browser.
  fn navigate(&mut self, url: String) {
    match open::that_detached(&url) {
      Ok(()) => {
        tracing::info!(%url, "opened in browser");
        self.status_msg = format!("Opened {url}, press r when done");
      }
      Err(e) => {
        tracing::warn!(%url, error = %e, "could not open browser");
        self.status_msg = format!("Could not open {url}: {e}");
      }
    }
  }
}
