//! Learning analytics pane: one row per topic across all members.

use elevate_core::learning::categories;
use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  widgets::{Cell, Row, Table, TableState},
};

use super::{header_style, highlight_style, page_footer, pane_block};
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let view = &app.topics;
  let page = view.visible_page();

  let title = format!(
    " Learning  {} topics · {} categories ",
    view.records().len(),
    categories(view.records().as_slice()).len()
  );
  let block = pane_block(title, page_footer(&page, view.sort_params()));

  let rows: Vec<Row> = page
    .items
    .iter()
    .map(|t| {
      Row::new(vec![
        Cell::from(t.name.clone()),
        Cell::from(t.category.clone()),
        Cell::from(t.completed.len().to_string()),
        Cell::from(t.bookmarked.len().to_string()),
      ])
    })
    .collect();

  let header =
    Row::new(["Topic", "Category", "Completed", "Bookmarked"]).style(header_style());
  let table = Table::new(rows, [
    Constraint::Min(20),
    Constraint::Percentage(25),
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
