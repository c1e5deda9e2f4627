//! Referrals pane.

use elevate_core::referral::{ReferralStats, ReferralStatus};
use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Style},
  widgets::{Cell, Row, Table, TableState},
};

use super::{header_style, highlight_style, or_dash, page_footer, pane_block};
use crate::app::App;

fn status_color(status: ReferralStatus) -> Color {
  match status {
    ReferralStatus::Pending => Color::Yellow,
    ReferralStatus::Completed => Color::Green,
    ReferralStatus::Declined => Color::Red,
    ReferralStatus::Cancelled | ReferralStatus::Unknown => Color::DarkGray,
  }
}

/// Render the referral table into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let view = app.referrals.view();
  let stats = ReferralStats::of(view.records().iter());
  let page = view.visible_page();

  let title = format!(
    " Referrals  {} total · {} pending · {} completed · {} declined · {} cancelled ",
    stats.total, stats.pending, stats.completed, stats.declined, stats.cancelled
  );
  let block = pane_block(title, page_footer(&page, view.sort_params()));

  let rows: Vec<Row> = page
    .items
    .iter()
    .map(|r| {
      // Dates arrive as ISO timestamps; the day is enough here.
      let date = r.date.as_deref().map(|d| d.get(..10).unwrap_or(d));
      Row::new(vec![
        Cell::from(or_dash(date)),
        Cell::from(or_dash(r.user_name.as_deref())),
        Cell::from(or_dash(r.company_name())),
        Cell::from(r.job_title.clone()),
        Cell::from(r.status.to_string())
          .style(Style::default().fg(status_color(r.status))),
      ])
    })
    .collect();

  let header = Row::new(["Date", "Member", "Company", "Job", "Status"]).style(header_style());
  let table = Table::new(rows, [
    Constraint::Length(11),
    Constraint::Percentage(25),
    Constraint::Percentage(20),
    Constraint::Min(10),
    Constraint::Length(10),
  ])
  .header(header)
  .block(block)
  .row_highlight_style(highlight_style());

  let mut state = TableState::default()
    .with_selected((!page.items.is_empty()).then_some(app.cursor));
  f.render_stateful_widget(table, area, &mut state);
}
