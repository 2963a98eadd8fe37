//! TUI rendering — orchestrates all panes.

pub mod identity;
pub mod root;

use chrono::Local;
use portal_core::{
  root::RootView,
  view::{IdentityPresentation, Tone},
};
use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::App;

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: header, root pane, identity pane, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Length(6), // root pane
      Constraint::Min(0),    // identity pane
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  root::draw(f, rows[1], app);
  identity::draw(f, rows[2], app);
  draw_status(f, rows[3], app);
}

/// Style for a presentation tone.
pub fn tone_style(tone: Tone) -> Style {
  match tone {
    Tone::Neutral => Style::default(),
    Tone::Emphasis => Style::default().add_modifier(Modifier::BOLD),
    Tone::Muted => Style::default().fg(Color::DarkGray),
    Tone::Error => Style::default().fg(Color::Red),
    Tone::Verified => Style::default().fg(Color::Green),
    Tone::Unverified => Style::default().fg(Color::Yellow),
    Tone::Control => Style::default()
      .fg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

/// Backend the client talks to on the left; whether a session credential is
/// configured and today's date on the right.
fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  f.render_widget(
    Block::default().style(Style::default().bg(Color::DarkGray)),
    area,
  );

  let target = Line::from(vec![
    Span::styled(
      " portal ",
      Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(
      format!("→ {}", app.client.base_url()),
      Style::default().fg(Color::White),
    ),
  ]);

  let session = if app.has_session() {
    Span::styled("session cookie set", Style::default().fg(Color::Green))
  } else {
    Span::styled("no session", Style::default().fg(Color::Yellow))
  };
  let date = Local::now().format("%Y-%m-%d");
  let context = Line::from(vec![session, Span::raw(format!("  {date} "))]);

  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Min(0), Constraint::Length(context.width() as u16)])
    .split(area);

  f.render_widget(Paragraph::new(target), cols[0]);
  f.render_widget(Paragraph::new(context).alignment(Alignment::Right), cols[1]);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let mode_label = if app.identity.is_loading() {
    "LOADING"
  } else {
    "READY"
  };

  let status = if !app.status_msg.is_empty() {
    app.status_msg.clone()
  } else if let Some(at) = app.refreshed_at {
    format!("refreshed {}  r refresh  h health  i sign in  o sign out  q quit", at.format("%H:%M:%S"))
  } else {
    "r refresh  h health  i sign in  o sign out  q quit".to_string()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::DarkGray),
  );

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, hint_span]))
      .style(Style::default().bg(Color::Black)),
    area,
  );
}

// ─── Plain text ───────────────────────────────────────────────────────────────

/// Render the same content as the TUI as plain text, without controls.
pub fn plain(root: &RootView, identity: &IdentityPresentation, login: &str, logout: &str) -> String {
  let mut out = String::new();
  out.push_str(&format!("Backend health: {}\n", root.health));
  out.push_str(&format!("API says: {}\n", root.greeting));
  out.push_str(&format!("Sign in: {login}\n"));
  out.push_str(&format!("Sign out: {logout}\n"));
  out.push('\n');
  for line in identity.lines() {
    if line.tone != Tone::Control {
      out.push_str(&line.text);
      out.push('\n');
    }
  }
  out
}
