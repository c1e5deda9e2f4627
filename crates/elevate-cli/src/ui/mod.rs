//! TUI rendering. Orchestrates all panes.

pub mod company_table;
pub mod member_table;
pub mod referral_table;
pub mod topic_table;

use chrono::Local;
use elevate_core::{Page, SortDirection, SortParams};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Tabs},
};

use crate::app::{App, Input, LearningView, Tab};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);
  match app.tab {
    Tab::Referrals => referral_table::draw(f, rows[1], app),
    Tab::Companies => company_table::draw(f, rows[1], app),
    Tab::Learning => match app.learning_view {
      LearningView::Members => member_table::draw(f, rows[1], app),
      LearningView::Topics => topic_table::draw(f, rows[1], app),
    },
  }
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let date = Local::now().format("%Y-%m-%d ").to_string();
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([
      Constraint::Length(10),
      Constraint::Min(0),
      Constraint::Length(date.len() as u16),
    ])
    .split(inner);

  f.render_widget(
    Paragraph::new(Span::styled(
      " elevate",
      Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )),
    cols[0],
  );

  let selected = Tab::ALL.iter().position(|t| *t == app.tab).unwrap_or(0);
  let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
    .select(selected)
    .style(Style::default().fg(Color::Gray))
    .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
  f.render_widget(tabs, cols[1]);

  f.render_widget(
    Paragraph::new(Span::styled(date, Style::default().fg(Color::Gray))),
    cols[2],
  );
}

// ─── Shared pane helpers ──────────────────────────────────────────────────────

/// Bordered block titled with the pane name and a summary.
pub(crate) fn pane_block<'a>(title: String, footer: String) -> Block<'a> {
  Block::default()
    .title(title)
    .title_bottom(Line::from(footer).right_aligned())
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray))
}

/// `page 2/5 · 93 rows · date ↓`
pub(crate) fn page_footer<T>(page: &Page<T>, sort: &SortParams) -> String {
  let arrow = match sort.direction {
    SortDirection::Ascending => '↑',
    SortDirection::Descending => '↓',
  };
  format!(
    " page {}/{} · {} rows · {} {arrow} ",
    page.page, page.total_pages, page.total_items, sort.field
  )
}

pub(crate) fn header_style() -> Style {
  Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

pub(crate) fn highlight_style() -> Style {
  Style::default()
    .bg(Color::Blue)
    .fg(Color::White)
    .add_modifier(Modifier::BOLD)
}

/// Placeholder for an absent value.
pub(crate) fn or_dash(value: Option<&str>) -> String {
  match value {
    Some(v) if !v.is_empty() => v.to_owned(),
    _ => "—".to_owned(),
  }
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, text) = match app.input {
    Some(input) => {
      let label = if input == Input::Note { "NOTE" } else { "FILTER" };
      (label, format!("{}{}_", input.prompt(), app.input_buffer))
    }
    None => {
      let hints = match app.tab {
        Tab::Referrals => {
          "jk move  np page  / search  m member  c company  d dates  s status  o/O sort  N note  1-4 set  r refresh  q quit"
        }
        Tab::Companies => {
          "jk move  np page  / search  s filter  o/O sort  Esc clear  r refresh  Tab next  q quit"
        }
        Tab::Learning => {
          "jk move  np page  / search  s category  v members/topics  o/O sort  Esc clear  r refresh  q quit"
        }
      };
      let mode = if app.loading() { "LOADING" } else { "NORMAL" };
      let mut text = if app.status_msg.is_empty() {
        hints.to_owned()
      } else {
        app.status_msg.clone()
      };
      if let (Tab::Referrals, Some(note)) = (app.tab, &app.review_note) {
        text.push_str(&format!("  [note: {note}]"));
      }
      (mode, text)
    }
  };

  let mode_bg = if app.session_expired { Color::Red } else { Color::Cyan };
  let line = Line::from(vec![
    Span::styled(
      format!(" {mode_label} "),
      Style::default()
        .fg(Color::Black)
        .bg(mode_bg)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(format!("  {text}"), Style::default().fg(Color::Gray)),
  ]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
