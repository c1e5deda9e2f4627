//! Learning pane, per-member view.

use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  widgets::{Cell, Row, Table, TableState},
};

use super::{header_style, highlight_style, or_dash, page_footer, pane_block};
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let view = app.members.view();
  let page = view.visible_page();

  let title = format!(
    " Learning  {} members · {} topics ",
    view.records().len(),
    app.topics.records().len()
  );
  let block = pane_block(title, page_footer(&page, view.sort_params()));

  let rows: Vec<Row> = page
    .items
    .iter()
    .map(|m| {
      Row::new(vec![
        Cell::from(or_dash(m.full_name.as_deref())),
        Cell::from(or_dash(m.email.as_deref())),
        Cell::from(m.completed_topics.len().to_string()),
        Cell::from(m.bookmarked_topics.len().to_string()),
      ])
    })
    .collect();

  let header =
    Row::new(["Member", "Email", "Completed", "Bookmarked"]).style(header_style());
  let table = Table::new(rows, [
    Constraint::Percentage(30),
    Constraint::Min(20),
    Constraint::Length(10),
    Constraint::Length(10),
  ])
  .header(header)
  .block(block)
  .row_highlight_style(highlight_style());

  let mut state = TableState::default()
    .with_selected((!page.items.is_empty()).then_some(app.cursor));
  f.render_stateful_widget(table, area, &mut state);
}
