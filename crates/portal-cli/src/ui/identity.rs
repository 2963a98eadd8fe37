//! Identity pane — who the session belongs to.

use ratatui::{
  Frame,
  layout::{Alignment, Rect},
  style::{Color, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use super::tone_style;
use crate::app::App;

/// Render the identity pane into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(" Welcome ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let inner = block.inner(area);
  f.render_widget(block, area);

  let mut lines: Vec<Line> = vec![Line::from("")];
  for view_line in app.identity.presentation().lines() {
    lines.push(Line::from(Span::styled(
      view_line.text,
      tone_style(view_line.tone),
    )));
  }

  let para = Paragraph::new(lines)
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: false });
  f.render_widget(para, inner);
}
