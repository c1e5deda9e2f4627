//! Application state machine and event dispatcher.
//!
//! Key handling is synchronous: anything that talks to the API is spawned
//! onto the runtime and reports back through [`SyncEvent`]s, which the event
//! loop feeds into [`App::handle_sync`].

use std::sync::Arc;

use clap::ValueEnum;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use elevate_client::ApiClient;
use elevate_core::{
  DateRange, FetchOutcome, FetchTicket, FilterParams, Pagination, Record, SortParams,
  SyncError, SyncedView, ViewState,
  company::Company,
  learning::{MemberProgress, TopicSummary, categories, summarize_topics},
  referral::{Referral, ReferralPatch, ReferralStatus},
};
use serde::Deserialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::settings::{AppConfig, Role};

// ─── Tab ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
  #[default]
  Referrals,
  Companies,
  Learning,
}

impl Tab {
  pub const ALL: [Tab; 3] = [Tab::Referrals, Tab::Companies, Tab::Learning];

  pub fn next(self) -> Self {
    match self {
      Self::Referrals => Self::Companies,
      Self::Companies => Self::Learning,
      Self::Learning => Self::Referrals,
    }
  }

  pub fn title(self) -> &'static str {
    match self {
      Self::Referrals => "Referrals",
      Self::Companies => "Companies",
      Self::Learning => "Learning",
    }
  }
}

/// What the learning tab lists: one row per member, or one per topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LearningView {
  #[default]
  Members,
  Topics,
}

impl LearningView {
  pub fn toggled(self) -> Self {
    match self {
      Self::Members => Self::Topics,
      Self::Topics => Self::Members,
    }
  }
}

// ─── Input ────────────────────────────────────────────────────────────────────

/// Which filter the input line is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
  Search,
  Member,
  Company,
  /// `start..end`, either side optional.
  Dates,
  /// Review note sent with the next status change.
  Note,
}

impl Input {
  pub fn prompt(self) -> &'static str {
    match self {
      Self::Search => "/",
      Self::Member => "member: ",
      Self::Company => "company: ",
      Self::Dates => "dates (from..to): ",
      Self::Note => "review note: ",
    }
  }

  /// Whether every keystroke re-applies the input, or only Enter does.
  fn live(self) -> bool { !matches!(self, Self::Dates | Self::Note) }

  /// The `field_contains` key this input edits, if any.
  fn field(self) -> Option<&'static str> {
    match self {
      Self::Member => Some("member"),
      Self::Company => Some("company"),
      Self::Search | Self::Dates | Self::Note => None,
    }
  }
}

// ─── Sync events ──────────────────────────────────────────────────────────────

/// Results of spawned API calls, delivered to the event loop.
#[derive(Debug)]
pub enum SyncEvent {
  Referrals(FetchTicket, Result<Vec<Referral>, SyncError>),
  Companies(FetchTicket, Result<Vec<Company>, SyncError>),
  Progress(FetchTicket, Result<Vec<MemberProgress>, SyncError>),
  ReferralUpdated(Result<Referral, SyncError>),
}

// ─── Table ────────────────────────────────────────────────────────────────────

/// The operations the key handler needs from a tab, whatever its record type.
trait Table {
  fn edit_filter(&mut self, edit: &mut dyn FnMut(&mut FilterParams));
  fn filter_params(&self) -> &FilterParams;
  fn sort_params(&self) -> &SortParams;
  fn set_sort(&mut self, sort: SortParams);
  fn next_page(&mut self);
  fn prev_page(&mut self);
  fn page_len(&self) -> usize;
}

impl<R: Record> Table for ViewState<R> {
  fn edit_filter(&mut self, edit: &mut dyn FnMut(&mut FilterParams)) {
    self.update_filter(|f| edit(f));
  }

  fn filter_params(&self) -> &FilterParams { ViewState::filter_params(self) }

  fn sort_params(&self) -> &SortParams { ViewState::sort_params(self) }

  fn set_sort(&mut self, sort: SortParams) { ViewState::set_sort(self, sort); }

  fn next_page(&mut self) { ViewState::next_page(self); }

  fn prev_page(&mut self) { ViewState::prev_page(self); }

  fn page_len(&self) -> usize { self.visible_page().items.len() }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Tab with keyboard focus.
  pub tab: Tab,

  pub referrals: SyncedView<Referral>,
  pub companies: SyncedView<Company>,
  pub members:   SyncedView<MemberProgress>,
  /// Derived from `members` on every applied fetch.
  pub topics:    ViewState<TopicSummary>,

  pub learning_view: LearningView,

  /// The filter being typed, if the input line is open.
  pub input:        Option<Input>,
  pub input_buffer: String,

  /// Row within the current page.
  pub cursor: usize,

  /// Sent with the next status change, then cleared.
  pub review_note: Option<String>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Set once the server rejects the token; further calls are not made.
  pub session_expired: bool,

  pub role: Role,

  client: Arc<ApiClient>,
  events: UnboundedSender<SyncEvent>,
}

impl App {
  pub fn new(
    config: &AppConfig,
    client: ApiClient,
    events: UnboundedSender<SyncEvent>,
  ) -> anyhow::Result<Self> {
    let pagination = Pagination::per_page(config.page_size);

    let mut filter = FilterParams::default();
    if let Some(status) = config.initial_status()? {
      filter = filter.with_status(status.to_string());
    }
    let referrals = ViewState::new(config.initial_sort()?)
      .with_filter(filter)
      .with_pagination(pagination);
    let companies =
      ViewState::new(SortParams::ascending("name")).with_pagination(pagination);
    let members =
      ViewState::new(SortParams::descending("completed")).with_pagination(pagination);
    let topics =
      ViewState::new(SortParams::descending("completed")).with_pagination(pagination);

    Ok(Self {
      tab: config.default_tab,
      referrals: SyncedView::new(referrals),
      companies: SyncedView::new(companies),
      members: SyncedView::new(members),
      topics,
      learning_view: LearningView::default(),
      input: None,
      input_buffer: String::new(),
      cursor: 0,
      review_note: None,
      status_msg: String::new(),
      session_expired: false,
      role: config.role,
      client: Arc::new(client),
      events,
    })
  }

  fn table(&self) -> &dyn Table {
    match (self.tab, self.learning_view) {
      (Tab::Referrals, _) => self.referrals.view(),
      (Tab::Companies, _) => self.companies.view(),
      (Tab::Learning, LearningView::Members) => self.members.view(),
      (Tab::Learning, LearningView::Topics) => &self.topics,
    }
  }

  fn table_mut(&mut self) -> &mut dyn Table {
    match (self.tab, self.learning_view) {
      (Tab::Referrals, _) => self.referrals.view_mut(),
      (Tab::Companies, _) => self.companies.view_mut(),
      (Tab::Learning, LearningView::Members) => self.members.view_mut(),
      (Tab::Learning, LearningView::Topics) => &mut self.topics,
    }
  }

  /// Fields `o` cycles through, in order.
  pub fn sort_fields(&self) -> &'static [&'static str] {
    match (self.tab, self.learning_view) {
      (Tab::Referrals, _) => &["date", "company", "member", "status"],
      (Tab::Companies, _) => &["name", "domain", "can_refer"],
      (Tab::Learning, LearningView::Members) => {
        &["completed", "bookmarked", "full_name", "email"]
      }
      (Tab::Learning, LearningView::Topics) => &["completed", "bookmarked", "name", "category"],
    }
  }

  pub fn filter_params(&self) -> &FilterParams { self.table().filter_params() }

  pub fn sort_params(&self) -> &SortParams { self.table().sort_params() }

  /// The referral under the cursor, when the referrals tab is focused.
  pub fn selected_referral(&self) -> Option<&Referral> {
    if self.tab != Tab::Referrals {
      return None;
    }
    self.referrals.view().visible_page().items.get(self.cursor).copied()
  }

  pub fn loading(&self) -> bool {
    match self.tab {
      Tab::Referrals => self.referrals.loading(),
      Tab::Companies => self.companies.loading(),
      Tab::Learning => self.members.loading(),
    }
  }

  fn clamp_cursor(&mut self) {
    let len = self.table().page_len();
    self.cursor = self.cursor.min(len.saturating_sub(1));
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Start a fetch for every tab.
  pub fn refresh_all(&mut self) {
    for tab in Tab::ALL {
      self.refresh(tab);
    }
  }

  /// Start a fetch for `tab`. A fetch already in flight for the same tab is
  /// superseded; its result will be dropped.
  pub fn refresh(&mut self, tab: Tab) {
    if self.session_expired {
      return;
    }
    let client = Arc::clone(&self.client);
    let events = self.events.clone();
    match tab {
      Tab::Referrals => {
        let ticket = self.referrals.begin_fetch();
        tokio::spawn(async move {
          let result = client.list_referrals().await;
          let _ = events.send(SyncEvent::Referrals(ticket, result));
        });
      }
      Tab::Companies => {
        let ticket = self.companies.begin_fetch();
        tokio::spawn(async move {
          let result = client.list_companies().await;
          let _ = events.send(SyncEvent::Companies(ticket, result));
        });
      }
      Tab::Learning => {
        let ticket = self.members.begin_fetch();
        tokio::spawn(async move {
          let result = client.list_member_progress().await;
          let _ = events.send(SyncEvent::Progress(ticket, result));
        });
      }
    }
    self.status_msg = format!("Loading {}…", tab.title().to_lowercase());
  }

  /// Apply the result of a spawned call.
  pub fn handle_sync(&mut self, event: SyncEvent) {
    match event {
      SyncEvent::Referrals(ticket, result) => {
        let outcome = self.referrals.complete_fetch(ticket, result);
        self.report(outcome, "referrals");
      }
      SyncEvent::Companies(ticket, result) => {
        let outcome = self.companies.complete_fetch(ticket, result);
        self.report(outcome, "companies");
      }
      SyncEvent::Progress(ticket, result) => {
        let outcome = self.members.complete_fetch(ticket, result);
        if matches!(outcome, FetchOutcome::Applied(_)) {
          let topics = summarize_topics(self.members.view().records().as_slice());
          self.topics.set_records(topics);
        }
        self.report(outcome, "members");
      }
      SyncEvent::ReferralUpdated(Ok(referral)) => {
        let msg = format!("Referral marked {}", referral.status);
        info!(id = %referral.id, status = %referral.status, "referral updated");
        self.referrals.complete_update(Ok(referral));
        // A listing requested before the update may not include it.
        if self.referrals.loading() {
          self.refresh(Tab::Referrals);
        }
        self.status_msg = msg;
      }
      SyncEvent::ReferralUpdated(Err(e)) => {
        self.referrals.complete_update(Err(e.clone()));
        self.fail(&e);
      }
    }
    self.clamp_cursor();
  }

  fn report(&mut self, outcome: FetchOutcome, what: &str) {
    match outcome {
      FetchOutcome::Applied(n) => {
        info!(count = n, "loaded {what}");
        self.status_msg = format!("Loaded {n} {what}");
      }
      FetchOutcome::Stale => {}
      FetchOutcome::Failed(e) => self.fail(&e),
    }
  }

  fn fail(&mut self, e: &SyncError) {
    warn!(error = %e, "api call failed");
    if e.is_auth() {
      self.session_expired = true;
      self.status_msg = format!("Session ended ({e}). Restart with a valid token.");
    } else {
      self.status_msg = format!("Error: {e}");
    }
  }

  /// Ask the server to move the selected referral to `status`.
  fn set_status(&mut self, status: ReferralStatus) {
    if self.role.is_referrer() && !status.settable_by_referrer() {
      self.status_msg = format!("Referrers cannot mark a referral {status}");
      return;
    }
    if self.session_expired {
      return;
    }
    let Some(id) = self.selected_referral().map(|r| r.id.clone()) else {
      return;
    };
    let patch = ReferralPatch { status, review_note: self.review_note.take() };
    let client = Arc::clone(&self.client);
    let events = self.events.clone();
    tokio::spawn(async move {
      let result = client.update_referral(&id, &patch).await;
      let _ = events.send(SyncEvent::ReferralUpdated(result));
    });
    self.status_msg = format!("Marking referral {status}…");
  }

  // ── Filters ───────────────────────────────────────────────────────────────

  /// Values `s` cycles the status filter through on the current tab.
  pub fn status_options(&self) -> Vec<String> {
    match self.tab {
      Tab::Referrals => ReferralStatus::selectable().map(|s| s.to_string()).collect(),
      Tab::Companies => vec!["yes".to_owned(), "no".to_owned()],
      Tab::Learning => match self.learning_view {
        LearningView::Members => Vec::new(),
        LearningView::Topics => categories(self.topics.records().as_slice())
          .into_iter()
          .map(str::to_owned)
          .collect(),
      },
    }
  }

  /// Step the status filter to the next option; past the last, clear it.
  fn cycle_status(&mut self) {
    let options = self.status_options();
    let next = match &self.filter_params().status_equals {
      None => options.first().cloned(),
      Some(current) => options
        .iter()
        .position(|o| o == current)
        .and_then(|i| options.get(i + 1))
        .cloned(),
    };
    self.table_mut().edit_filter(&mut |f| f.status_equals = next.clone());
    self.cursor = 0;
  }

  fn cycle_sort(&mut self) {
    let fields = self.sort_fields();
    let current = self.sort_params().clone();
    let i = fields.iter().position(|f| *f == current.field);
    let next = fields[i.map_or(0, |i| (i + 1) % fields.len())];
    self
      .table_mut()
      .set_sort(SortParams { field: next.to_owned(), direction: current.direction });
    self.cursor = 0;
  }

  fn flip_sort(&mut self) {
    let flipped = self.sort_params().flipped();
    self.table_mut().set_sort(flipped);
    self.cursor = 0;
  }

  fn open_input(&mut self, input: Input) {
    if input == Input::Company && self.role.is_referrer() {
      self.status_msg = "Referrers only see their own company".into();
      return;
    }
    self.input_buffer = match input {
      Input::Search => self.filter_params().search.clone(),
      Input::Dates => String::new(),
      Input::Note => self.review_note.clone().unwrap_or_default(),
      Input::Member | Input::Company => input
        .field()
        .and_then(|k| self.filter_params().field_contains.get(k).cloned())
        .unwrap_or_default(),
    };
    self.input = Some(input);
  }

  /// Push the input buffer into the filter. Dates apply only on Enter.
  fn apply_input(&mut self, input: Input) {
    let text = self.input_buffer.clone();
    match input {
      Input::Search => self.table_mut().edit_filter(&mut |f| f.search = text.clone()),
      Input::Member | Input::Company => {
        let Some(key) = input.field() else { return };
        self.table_mut().edit_filter(&mut |f| {
          if text.is_empty() {
            f.field_contains.remove(key);
          } else {
            f.field_contains.insert(key.to_owned(), text.clone());
          }
        });
      }
      Input::Dates => {
        let (start, end) = text.split_once("..").unwrap_or((text.as_str(), ""));
        match DateRange::parse(start.trim(), end.trim()) {
          Ok(range) => {
            let range = (!range.is_unbounded()).then_some(range);
            self.table_mut().edit_filter(&mut |f| f.date_range = range);
          }
          Err(e) => self.status_msg = format!("Error: {e}"),
        }
      }
      Input::Note => {
        let note = text.trim();
        self.review_note = (!note.is_empty()).then(|| note.to_owned());
        self.status_msg = match self.review_note {
          Some(_) => "Note will be sent with the next status change (1-4)".into(),
          None => "Review note cleared".into(),
        };
        return;
      }
    }
    self.cursor = 0;
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    if let Some(input) = self.input {
      self.handle_input_key(input, key);
      return true;
    }

    self.handle_table_key(key)
  }

  fn handle_input_key(&mut self, input: Input, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.input_buffer.clear();
        if input.live() {
          self.apply_input(input);
        }
        self.input = None;
      }
      KeyCode::Enter => {
        self.apply_input(input);
        self.input = None;
      }
      KeyCode::Backspace => {
        self.input_buffer.pop();
        if input.live() {
          self.apply_input(input);
        }
      }
      KeyCode::Char(c) => {
        self.input_buffer.push(c);
        if input.live() {
          self.apply_input(input);
        }
      }
      _ => {}
    }
  }

  fn handle_table_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Tab => {
        self.tab = self.tab.next();
        self.cursor = 0;
      }

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => {
        if self.cursor + 1 < self.table().page_len() {
          self.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.cursor = self.cursor.saturating_sub(1);
      }
      KeyCode::Char('n') | KeyCode::PageDown => {
        self.table_mut().next_page();
        self.cursor = 0;
      }
      KeyCode::Char('p') | KeyCode::PageUp => {
        self.table_mut().prev_page();
        self.cursor = 0;
      }

      // Filters
      KeyCode::Char('/') => self.open_input(Input::Search),
      KeyCode::Char('m') if self.tab == Tab::Referrals => self.open_input(Input::Member),
      KeyCode::Char('c') if self.tab == Tab::Referrals => self.open_input(Input::Company),
      KeyCode::Char('d') if self.tab == Tab::Referrals => self.open_input(Input::Dates),
      KeyCode::Char('N') if self.tab == Tab::Referrals => self.open_input(Input::Note),
      KeyCode::Char('s') => self.cycle_status(),
      KeyCode::Esc => {
        self.table_mut().edit_filter(&mut |f| f.clear());
        self.cursor = 0;
      }

      // Sort
      KeyCode::Char('o') => self.cycle_sort(),
      KeyCode::Char('O') => self.flip_sort(),

      KeyCode::Char('r') => self.refresh(self.tab),

      KeyCode::Char('v') if self.tab == Tab::Learning => {
        self.learning_view = self.learning_view.toggled();
        self.cursor = 0;
      }

      KeyCode::Char(c @ '1'..='4') if self.tab == Tab::Referrals => {
        let n = c as usize - '1' as usize;
        if let Some(status) = ReferralStatus::selectable().nth(n) {
          self.set_status(status);
        }
      }

      _ => {}
    }
    true
  }
}
