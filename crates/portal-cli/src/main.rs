//! `portal` — terminal front-end for the session demo backend.
//!
//! Shows backend health, the greeting, and who the current session belongs
//! to.
//!
//! # Usage
//!
//! ```
//! portal --url http://127.0.0.1:5000 --session <sealed wos_session value>
//! portal --config ~/.config/portal/config.toml
//! portal --once
//! ```

mod app;
mod client;
mod ui;

use std::{
  fs::File,
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use portal_core::{
  root::RootView,
  session::{self, IdentityView},
  source::SessionCredential,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_COOKIE_NAME: &str = "wos_session";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "portal", version, about = "Terminal front-end for the session demo backend")]
struct Args {
  /// Path to a TOML config file (url, session, cookie_name, log_file).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the backend (default: http://127.0.0.1:5000).
  #[arg(long, env = "PORTAL_URL")]
  url: Option<String>,

  /// Sealed session cookie value of an existing login.
  #[arg(long, env = "PORTAL_SESSION", hide_env_values = true)]
  session: Option<String>,

  /// Name of the session cookie (default: wos_session).
  #[arg(long, env = "PORTAL_COOKIE_NAME")]
  cookie_name: Option<String>,

  /// Write logs to this file. In TUI mode logs are discarded otherwise.
  #[arg(long, env = "PORTAL_LOG_FILE", value_name = "FILE")]
  log_file: Option<PathBuf>,

  /// Fetch once, print the result as plain text and exit.
  #[arg(long)]
  once: bool,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:         String,
  #[serde(default)]
  session:     String,
  #[serde(default)]
  cookie_name: String,
  #[serde(default)]
  log_file:    Option<PathBuf>,
}

/// Fully resolved settings.
#[derive(Debug)]
struct Settings {
  api:        ApiConfig,
  credential: Option<SessionCredential>,
  log_file:   Option<PathBuf>,
}

impl Settings {
  /// CLI flags override the config file, which overrides defaults.
  fn resolve(args: &Args, file: ConfigFile) -> Self {
    fn pick(flag: Option<&String>, file: String) -> Option<String> {
      flag
        .cloned()
        .or_else(|| (!file.is_empty()).then_some(file))
    }

    let session = pick(args.session.as_ref(), file.session);
    Self {
      api:        ApiConfig {
        base_url:    pick(args.url.as_ref(), file.url).unwrap_or_else(|| DEFAULT_URL.to_string()),
        cookie_name: pick(args.cookie_name.as_ref(), file.cookie_name)
          .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string()),
      },
      credential: session
        .filter(|s| !s.trim().is_empty())
        .map(SessionCredential::new),
      log_file:   args.log_file.clone().or(file.log_file),
    }
  }
}

fn load_config_file(path: Option<&Path>) -> Result<ConfigFile> {
  let Some(path) = path else {
    return Ok(ConfigFile::default());
  };
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading config file {}", path.display()))?;
  toml::from_str(&raw).context("parsing config file")
}

// ─── Logging ──────────────────────────────────────────────────────────────────

fn init_tracing(log_file: Option<&Path>, once: bool) -> Result<()> {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy();

  match (log_file, once) {
    (Some(path), _) => {
      let file = File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    }
    (None, true) => {
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    }
    // The terminal owns stdout and stderr; without a file there is nowhere
    // to log to.
    (None, false) => {}
  }
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let file_cfg = load_config_file(args.config.as_deref())?;
  let settings = Settings::resolve(&args, file_cfg);

  init_tracing(settings.log_file.as_deref(), args.once)?;
  tracing::info!(
    url = %settings.api.base_url,
    session = settings.credential.is_some(),
    "starting portal"
  );

  let client = ApiClient::new(settings.api)?;

  if args.once {
    return run_once(&client, settings.credential.as_ref()).await;
  }

  let mut app = App::new(client, settings.credential);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  app.refresh_root();
  app.refresh_identity();

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── One-shot ─────────────────────────────────────────────────────────────────

/// Run the root fetches and one identity cycle concurrently, then print.
async fn run_once(client: &ApiClient, credential: Option<&SessionCredential>) -> Result<()> {
  let mut root = RootView::new();
  let mut identity = IdentityView::new();

  let (health, hello, _) = tokio::join!(
    client.health(),
    client.hello(),
    session::refresh(&mut identity, client, credential),
  );
  root.apply_health(health);
  root.apply_greeting(hello);

  print!(
    "{}",
    ui::plain(
      &root,
      &identity.presentation(),
      &client.login_url(),
      &client.logout_url(),
    )
  );
  Ok(())
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    app.drain();
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && key.kind == KeyEventKind::Press
      && !app.handle_key(key)
    {
      break;
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn args(argv: &[&str]) -> Args {
    Args::try_parse_from(std::iter::once("portal").chain(argv.iter().copied())).unwrap()
  }

  #[test]
  fn defaults_apply_without_flags_or_file() {
    let settings = Settings::resolve(&args(&[]), ConfigFile::default());
    assert_eq!(settings.api.base_url, DEFAULT_URL);
    assert_eq!(settings.api.cookie_name, DEFAULT_COOKIE_NAME);
    assert!(settings.credential.is_none());
  }

  #[test]
  fn flags_override_file() {
    let file: ConfigFile = toml::from_str(
      r#"
        url = "http://file:1"
        session = "from-file"
        cookie_name = "sid"
      "#,
    )
    .unwrap();
    let settings = Settings::resolve(&args(&["--url", "http://flag:2"]), file);
    assert_eq!(settings.api.base_url, "http://flag:2");
    assert_eq!(settings.api.cookie_name, "sid");
    assert_eq!(settings.credential, Some(SessionCredential::new("from-file")));
  }

  #[test]
  fn blank_session_means_no_credential() {
    let settings = Settings::resolve(&args(&["--session", "  "]), ConfigFile::default());
    assert!(settings.credential.is_none());
  }
}
