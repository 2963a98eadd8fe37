//! Root pane — backend health, greeting and sign-in/out targets.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(" Backend ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let inner = block.inner(area);
  f.render_widget(block, area);

  let label = Style::default()
    .fg(Color::Cyan)
    .add_modifier(Modifier::BOLD);
  let link = Style::default().fg(Color::Blue);

  let lines = vec![
    Line::from(vec![
      Span::styled(format!("{:<16}", "Backend health:"), label),
      Span::raw(app.root.health.clone()),
    ]),
    Line::from(vec![
      Span::styled(format!("{:<16}", "API says:"), label),
      Span::raw(app.root.greeting.clone()),
    ]),
    Line::from(vec![
      Span::styled(format!("{:<16}", "[i] Sign in"), label),
      Span::styled(app.client.login_url(), link),
    ]),
    Line::from(vec![
      Span::styled(format!("{:<16}", "[o] Sign out"), label),
      Span::styled(app.client.logout_url(), link),
    ]),
  ];

  f.render_widget(Paragraph::new(lines), inner);
}
