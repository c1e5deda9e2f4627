//! Companies pane.

use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Style},
  widgets::{Cell, Row, Table, TableState},
};

use super::{header_style, highlight_style, or_dash, page_footer, pane_block};
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let view = app.companies.view();
  let counts = view.count_by("can_refer");
  let page = view.visible_page();

  let title = format!(
    " Companies  {} total · {} accepting referrals ",
    view.records().len(),
    counts.get("yes").copied().unwrap_or(0)
  );
  let block = pane_block(title, page_footer(&page, view.sort_params()));

  let rows: Vec<Row> = page
    .items
    .iter()
    .map(|c| {
      let materials = c.referral_materials.map(|m| {
        [(m.resume, "resume"), (m.essay, "essay"), (m.phone_number, "phone")]
          .iter()
          .filter(|(required, _)| *required)
          .map(|(_, name)| *name)
          .collect::<Vec<_>>()
          .join(", ")
      });
      let (refer, color) = if c.can_refer {
        ("yes", Color::Green)
      } else {
        ("no", Color::DarkGray)
      };
      Row::new(vec![
        Cell::from(c.name.clone()),
        Cell::from(or_dash(Some(c.domain.as_str()))),
        Cell::from(refer).style(Style::default().fg(color)),
        Cell::from(or_dash(materials.as_deref())),
      ])
    })
    .collect();

  let header = Row::new(["Name", "Domain", "Refers", "Requires"]).style(header_style());
  let table = Table::new(rows, [
    Constraint::Percentage(30),
    Constraint::Percentage(30),
    Constraint::Length(7),
    Constraint::Min(10),
  ])
  .header(header)
  .block(block)
  .row_highlight_style(highlight_style());

  let mut state = TableState::default()
    .with_selected((!page.items.is_empty()).then_some(app.cursor));
  f.render_stateful_widget(table, area, &mut state);
}
