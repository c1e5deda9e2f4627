//! Tests for the key and sync-event handling in `App`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use elevate_client::{ApiClient, ApiConfig};
use std::net::SocketAddr;

use axum::{Json, Router, extract::Path, routing::patch};
use elevate_core::{
  SortDirection, SyncError,
  learning::MemberProgress,
  referral::{Referral, ReferralStatus},
};
use serde_json::{Value, json};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::{
  app::{App, Input, LearningView, SyncEvent, Tab},
  settings::{AppConfig, Role},
};

// ─── Fixtures ─────────────────────────────────────────────────────────────────

fn key(c: char) -> KeyEvent { KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE) }

fn code(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

fn type_text(app: &mut App, text: &str) {
  for c in text.chars() {
    app.handle_key(key(c));
  }
}

fn referral(id: &str, date: &str, name: &str, company: &str) -> Referral {
  serde_json::from_value(json!({
    "id": id,
    "job_title": "Intern",
    "date": date,
    "status": "Pending",
    "company": { "name": company },
    "user_name": name,
    "user_email": format!("{}@example.com", name.to_lowercase()),
  }))
  .unwrap()
}

fn three_referrals() -> Vec<Referral> {
  vec![
    referral("r1", "2024-01-10T09:00:00", "Ada", "Acme"),
    referral("r2", "2024-02-10T09:00:00", "Grace", "Globex"),
    referral("r3", "2024-03-10T09:00:00", "Linus", "Acme"),
  ]
}

fn app_with(config: AppConfig) -> (App, UnboundedReceiver<SyncEvent>) {
  // Nothing listens on the discard port; tests that spawn calls bind their own.
  let client = ApiClient::new(ApiConfig {
    base_url: "http://127.0.0.1:9/v1".into(),
    ..ApiConfig::default()
  })
  .unwrap();
  let (tx, rx) = mpsc::unbounded_channel();
  (App::new(&config, client, tx).unwrap(), rx)
}

fn loaded_app(config: AppConfig) -> App {
  let (mut app, _rx) = app_with(config);
  let ticket = app.referrals.begin_fetch();
  app.handle_sync(SyncEvent::Referrals(ticket, Ok(three_referrals())));
  app
}

fn member(
  id: &str,
  name: &str,
  completed: &[(&str, &str)],
  bookmarked: usize,
) -> MemberProgress {
  let topic =
    |(name, category): &(&str, &str)| json!({ "topic_name": name, "category": category });
  serde_json::from_value(json!({
    "user_id": id,
    "full_name": name,
    "email": format!("{}@example.com", name.to_lowercase()),
    "completed_topics": completed.iter().map(topic).collect::<Vec<_>>(),
    "bookmarked_topics": (0..bookmarked)
      .map(|i| json!({ "topic_name": format!("Saved {i}"), "category": "DSA" }))
      .collect::<Vec<_>>(),
  }))
  .unwrap()
}

fn learning_app() -> (App, UnboundedReceiver<SyncEvent>) {
  let (mut app, rx) =
    app_with(AppConfig { default_tab: Tab::Learning, ..Default::default() });
  let members = vec![
    member("u1", "Ada", &[("Arrays", "DSA")], 2),
    member("u2", "Grace", &[
      ("Arrays", "DSA"),
      ("Resumes", "Career"),
      ("Graphs", "DSA"),
    ], 0),
    member("u3", "Linus", &[("Resumes", "Career"), ("Graphs", "DSA")], 1),
  ];
  let ticket = app.members.begin_fetch();
  app.handle_sync(SyncEvent::Progress(ticket, Ok(members)));
  (app, rx)
}

fn member_names(app: &App) -> Vec<String> {
  app
    .members
    .view()
    .visible_records()
    .iter()
    .map(|m| m.full_name.clone().unwrap_or_default())
    .collect()
}

/// Serves `PATCH /v1/referrals/{id}`, echoing the body back as the record.
async fn echo_server() -> SocketAddr {
  async fn echo(Path(id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
      "referral": {
        "id": id,
        "job_title": "Intern",
        "date": "2024-03-10T09:00:00",
        "status": body["status"],
        "review_note": body["review_note"],
        "company": { "name": "Acme" },
        "user_name": "Linus",
        "user_email": "linus@example.com",
      }
    }))
  }

  let router = Router::new().route("/v1/referrals/{id}", patch(echo));
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, router).await.unwrap();
  });
  addr
}

fn ids(app: &App) -> Vec<String> {
  app
    .referrals
    .view()
    .visible_records()
    .iter()
    .map(|r| r.id.clone())
    .collect()
}

// ─── Construction ─────────────────────────────────────────────────────────────

#[test]
fn starts_on_pending_referrals_newest_first() {
  let (app, _rx) = app_with(AppConfig::default());
  assert_eq!(app.tab, Tab::Referrals);
  assert_eq!(app.filter_params().status_equals.as_deref(), Some("Pending"));
  assert_eq!(app.sort_params().field, "date");
  assert_eq!(app.sort_params().direction, SortDirection::Descending);
}

#[test]
fn rejects_a_bad_default_sort() {
  let config = AppConfig { default_sort: "date_sideways".into(), ..Default::default() };
  let client = ApiClient::new(ApiConfig::default()).unwrap();
  let (tx, _rx) = mpsc::unbounded_channel();
  assert!(App::new(&config, client, tx).is_err());
}

#[test]
fn empty_default_status_means_no_filter() {
  let (app, _rx) =
    app_with(AppConfig { default_status: String::new(), ..Default::default() });
  assert!(app.filter_params().status_equals.is_none());
}

// ─── Sync events ──────────────────────────────────────────────────────────────

#[test]
fn superseded_fetch_is_dropped() {
  let (mut app, _rx) = app_with(AppConfig::default());
  let first = app.referrals.begin_fetch();
  let second = app.referrals.begin_fetch();

  app.handle_sync(SyncEvent::Referrals(first, Ok(three_referrals())));
  assert!(app.referrals.view().records().is_empty());
  assert!(app.loading());

  app.handle_sync(SyncEvent::Referrals(second, Ok(three_referrals()[..1].to_vec())));
  assert_eq!(app.referrals.view().records().len(), 1);
  assert!(!app.loading());
  assert_eq!(app.status_msg, "Loaded 1 referrals");
}

#[test]
fn auth_failure_ends_the_session() {
  let (mut app, _rx) = app_with(AppConfig::default());
  let ticket = app.referrals.begin_fetch();
  app.handle_sync(SyncEvent::Referrals(ticket, Err(SyncError::Auth("expired".into()))));

  assert!(app.session_expired);
  // No new fetch is issued once the session is over.
  app.handle_key(key('r'));
  assert!(!app.referrals.loading());
}

#[test]
fn applied_update_replaces_the_row() {
  let mut app = loaded_app(AppConfig::default());
  let mut done = referral("r2", "2024-02-10T09:00:00", "Grace", "Globex");
  done.status = elevate_core::referral::ReferralStatus::Completed;

  app.handle_sync(SyncEvent::ReferralUpdated(Ok(done)));
  assert_eq!(app.status_msg, "Referral marked Completed");
  // The Pending filter now hides it.
  assert_eq!(ids(&app), ["r3", "r1"]);
}

#[test]
fn failed_update_keeps_the_list() {
  let mut app = loaded_app(AppConfig::default());
  app.handle_sync(SyncEvent::ReferralUpdated(Err(SyncError::Validation(
    "Referral not found".into(),
  ))));
  assert_eq!(ids(&app), ["r3", "r2", "r1"]);
  assert_eq!(app.status_msg, "Error: rejected by server: Referral not found");
}

// ─── Filters ──────────────────────────────────────────────────────────────────

#[test]
fn status_filter_cycles_then_clears() {
  let (mut app, _rx) = app_with(AppConfig::default());
  let mut seen = Vec::new();
  for _ in 0..5 {
    app.handle_key(key('s'));
    seen.push(app.filter_params().status_equals.clone());
  }
  assert_eq!(seen, [
    Some("Completed".to_owned()),
    Some("Declined".to_owned()),
    Some("Cancelled".to_owned()),
    None,
    Some("Pending".to_owned()),
  ]);
}

#[test]
fn search_applies_while_typing_and_esc_clears_it() {
  let mut app = loaded_app(AppConfig::default());
  app.handle_key(key('/'));
  assert_eq!(app.input, Some(Input::Search));

  type_text(&mut app, "glob");
  assert_eq!(ids(&app), ["r2"]);

  app.handle_key(code(KeyCode::Esc));
  assert_eq!(app.input, None);
  assert_eq!(ids(&app).len(), 3);
}

#[test]
fn member_filter_matches_name_or_email() {
  let mut app = loaded_app(AppConfig::default());
  app.handle_key(key('m'));
  type_text(&mut app, "LINUS@");
  app.handle_key(code(KeyCode::Enter));

  let member = app.filter_params().field_contains.get("member");
  assert_eq!(member.map(String::as_str), Some("LINUS@"));
  assert_eq!(ids(&app), ["r3"]);
}

#[test]
fn date_range_applies_on_enter() {
  let mut app = loaded_app(AppConfig::default());
  app.handle_key(key('d'));
  type_text(&mut app, "2024-02-01..2024-02-29");
  assert_eq!(ids(&app).len(), 3);

  app.handle_key(code(KeyCode::Enter));
  assert_eq!(ids(&app), ["r2"]);

  app.handle_key(key('d'));
  type_text(&mut app, "..2024-01-31");
  app.handle_key(code(KeyCode::Enter));
  assert_eq!(ids(&app), ["r1"]);
}

#[test]
fn bad_date_reports_and_keeps_the_range() {
  let mut app = loaded_app(AppConfig::default());
  app.handle_key(key('d'));
  type_text(&mut app, "someday");
  app.handle_key(code(KeyCode::Enter));

  assert!(app.status_msg.starts_with("Error: invalid date"), "{}", app.status_msg);
  assert!(app.filter_params().date_range.is_none());
}

#[test]
fn esc_clears_every_filter() {
  let mut app = loaded_app(AppConfig::default());
  app.handle_key(key('m'));
  type_text(&mut app, "ada");
  app.handle_key(code(KeyCode::Enter));

  app.handle_key(code(KeyCode::Esc));
  assert!(!app.filter_params().is_active());
}

#[test]
fn referrers_get_no_company_filter_or_cancel() {
  let mut app = loaded_app(AppConfig { role: Role::Referrer, ..Default::default() });

  app.handle_key(key('c'));
  assert_eq!(app.input, None);

  app.handle_key(key('4'));
  assert_eq!(app.status_msg, "Referrers cannot mark a referral Cancelled");
}

#[test]
fn company_filter_for_admins() {
  let mut app = loaded_app(AppConfig::default());
  app.handle_key(key('c'));
  type_text(&mut app, "acme");
  app.handle_key(code(KeyCode::Enter));
  assert_eq!(ids(&app), ["r3", "r1"]);
}

// ─── Sort & pages ─────────────────────────────────────────────────────────────

#[test]
fn sort_key_cycles_and_flips() {
  let mut app = loaded_app(AppConfig::default());

  app.handle_key(key('o'));
  assert_eq!(app.sort_params().field, "company");
  assert_eq!(app.sort_params().direction, SortDirection::Descending);
  assert_eq!(ids(&app), ["r2", "r1", "r3"]);

  app.handle_key(key('O'));
  assert_eq!(app.sort_params().direction, SortDirection::Ascending);
  assert_eq!(ids(&app), ["r1", "r3", "r2"]);
}

#[test]
fn cursor_and_pages() {
  let mut app = loaded_app(AppConfig { page_size: 2, ..Default::default() });
  assert_eq!(app.selected_referral().map(|r| r.id.as_str()), Some("r3"));

  app.handle_key(key('j'));
  app.handle_key(key('j'));
  assert_eq!(app.cursor, 1);

  app.handle_key(key('n'));
  assert_eq!(app.referrals.view().visible_page().page, 2);
  assert_eq!(app.selected_referral().map(|r| r.id.as_str()), Some("r1"));

  // Already on the last page.
  app.handle_key(key('n'));
  assert_eq!(app.referrals.view().visible_page().page, 2);

  app.handle_key(key('p'));
  assert_eq!(app.referrals.view().visible_page().page, 1);
}

// ─── Tabs ─────────────────────────────────────────────────────────────────────

#[test]
fn tab_cycles_views_with_their_own_filters() {
  let (mut app, _rx) = app_with(AppConfig::default());
  app.handle_key(code(KeyCode::Tab));
  assert_eq!(app.tab, Tab::Companies);
  assert_eq!(app.status_options(), ["yes", "no"]);
  assert!(app.filter_params().status_equals.is_none());
  assert!(app.selected_referral().is_none());

  app.handle_key(code(KeyCode::Tab));
  assert_eq!(app.tab, Tab::Learning);
  app.handle_key(code(KeyCode::Tab));
  assert_eq!(app.tab, Tab::Referrals);
}

#[test]
fn topic_categories_drive_the_learning_filter() {
  let (mut app, _rx) = learning_app();
  app.handle_key(key('v'));
  assert_eq!(app.learning_view, LearningView::Topics);

  assert_eq!(app.status_options(), ["DSA", "Career"]);
  app.handle_key(key('s'));
  let visible: Vec<_> =
    app.topics.visible_records().iter().map(|t| t.name.clone()).collect();
  assert_eq!(visible, ["Arrays", "Graphs", "Saved 0", "Saved 1"]);
}

// ─── Learning members ─────────────────────────────────────────────────────────

#[test]
fn learning_opens_on_members_by_completion_count() {
  let (app, _rx) = learning_app();
  assert_eq!(app.learning_view, LearningView::Members);
  assert_eq!(app.status_msg, "Loaded 3 members");
  assert_eq!(member_names(&app), ["Grace", "Linus", "Ada"]);
  assert_eq!(app.topics.records().len(), 5);
}

#[test]
fn member_search_matches_name_or_email() {
  let (mut app, _rx) = learning_app();
  app.handle_key(key('/'));
  type_text(&mut app, "LIN");
  assert_eq!(member_names(&app), ["Linus"]);

  app.handle_key(code(KeyCode::Esc));
  app.handle_key(key('/'));
  type_text(&mut app, "grace@");
  assert_eq!(member_names(&app), ["Grace"]);

  // Search applies to the member list only.
  app.handle_key(code(KeyCode::Enter));
  app.handle_key(key('v'));
  assert_eq!(app.filter_params().search, "");
  assert_eq!(app.topics.visible_records().len(), 5);
}

#[test]
fn member_sort_cycles_to_bookmark_count() {
  let (mut app, _rx) = learning_app();
  assert!(app.status_options().is_empty());

  app.handle_key(key('o'));
  assert_eq!(app.sort_params().field, "bookmarked");
  assert_eq!(member_names(&app), ["Ada", "Linus", "Grace"]);

  app.handle_key(key('O'));
  assert_eq!(app.sort_params().direction, SortDirection::Ascending);
  assert_eq!(member_names(&app), ["Grace", "Linus", "Ada"]);

  app.handle_key(key('o'));
  assert_eq!(app.sort_params().field, "full_name");
  assert_eq!(member_names(&app), ["Ada", "Grace", "Linus"]);
}

#[test]
fn q_and_ctrl_c_quit() {
  let (mut app, _rx) = app_with(AppConfig::default());
  assert!(!app.handle_key(key('q')));
  assert!(!app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));

  // While typing, `q` is just a letter.
  app.handle_key(key('/'));
  assert!(app.handle_key(key('q')));
}

// ─── Spawned calls ────────────────────────────────────────────────────────────

#[tokio::test]
async fn status_key_spawns_an_update_and_reports_back() {
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  drop(listener);

  let client = ApiClient::new(ApiConfig {
    base_url: format!("http://{addr}/v1"),
    ..ApiConfig::default()
  })
  .unwrap();
  let (tx, mut rx) = mpsc::unbounded_channel();
  let mut app = App::new(&AppConfig::default(), client, tx).unwrap();
  let ticket = app.referrals.begin_fetch();
  app.handle_sync(SyncEvent::Referrals(ticket, Ok(three_referrals())));

  app.handle_key(key('2'));
  assert_eq!(app.status_msg, "Marking referral Completed…");

  let event = rx.recv().await.unwrap();
  assert!(
    matches!(event, SyncEvent::ReferralUpdated(Err(SyncError::Network(_)))),
    "{event:?}"
  );
  app.handle_sync(event);
  assert!(app.status_msg.starts_with("Error: network error"));
  assert_eq!(ids(&app), ["r3", "r2", "r1"]);
}

#[tokio::test]
async fn review_note_rides_along_with_the_next_status_change() {
  let addr = echo_server().await;
  let client = ApiClient::new(ApiConfig {
    base_url: format!("http://{addr}/v1"),
    ..ApiConfig::default()
  })
  .unwrap();
  let (tx, mut rx) = mpsc::unbounded_channel();
  let mut app = App::new(&AppConfig::default(), client, tx).unwrap();
  let ticket = app.referrals.begin_fetch();
  app.handle_sync(SyncEvent::Referrals(ticket, Ok(three_referrals())));

  app.handle_key(key('N'));
  assert_eq!(app.input, Some(Input::Note));
  type_text(&mut app, "Strong resume ");
  app.handle_key(code(KeyCode::Enter));
  assert_eq!(app.review_note.as_deref(), Some("Strong resume"));

  app.handle_key(key('2'));
  assert!(app.review_note.is_none());

  let event = rx.recv().await.unwrap();
  let SyncEvent::ReferralUpdated(Ok(updated)) = &event else {
    panic!("{event:?}");
  };
  assert_eq!(updated.id, "r3");
  assert_eq!(updated.status, ReferralStatus::Completed);
  assert_eq!(updated.review_note.as_deref(), Some("Strong resume"));

  // The next change goes out without a note.
  app.handle_sync(event);
  app.handle_key(key('3'));
  let event = rx.recv().await.unwrap();
  let SyncEvent::ReferralUpdated(Ok(updated)) = &event else {
    panic!("{event:?}");
  };
  assert_eq!(updated.review_note, None);
}

#[test]
fn note_input_waits_for_enter_and_esc_keeps_the_old_note() {
  let mut app = loaded_app(AppConfig::default());
  app.handle_key(key('N'));
  type_text(&mut app, "first");
  assert!(app.review_note.is_none());
  app.handle_key(code(KeyCode::Enter));
  assert_eq!(app.review_note.as_deref(), Some("first"));

  app.handle_key(key('N'));
  assert_eq!(app.input_buffer, "first");
  type_text(&mut app, " draft");
  app.handle_key(code(KeyCode::Esc));
  assert_eq!(app.review_note.as_deref(), Some("first"));

  // An empty note clears it.
  app.handle_key(key('N'));
  for _ in 0.."first".len() {
    app.handle_key(code(KeyCode::Backspace));
  }
  app.handle_key(code(KeyCode::Enter));
  assert!(app.review_note.is_none());
}

#[tokio::test]
async fn update_during_a_fetch_supersedes_the_older_listing() {
  let mut app = loaded_app(AppConfig::default());
  let older = app.referrals.begin_fetch();

  let mut completed = three_referrals().remove(2);
  completed.status = ReferralStatus::Completed;
  app.handle_sync(SyncEvent::ReferralUpdated(Ok(completed)));
  assert!(app.referrals.loading());

  // The listing requested before the update arrives with the old status.
  app.handle_sync(SyncEvent::Referrals(older, Ok(three_referrals())));
  let r3 = app.referrals.view().records().iter().find(|r| r.id == "r3").cloned();
  assert_eq!(r3.map(|r| r.status), Some(ReferralStatus::Completed));
  assert_eq!(ids(&app), ["r2", "r1"]);
}
