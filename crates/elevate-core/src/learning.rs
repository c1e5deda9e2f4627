//! Learning progress (`GET /learning/admin/all-progress`) and the per-topic
//! summary derived from it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::record::{FieldValue, Record};

/// Category assigned to topics that arrive without one.
pub const UNCATEGORIZED: &str = "Uncategorized";

// ─── Member progress ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicProgress {
  pub topic_name:   String,
  #[serde(default)]
  pub category:     Option<String>,
  /// Times completed; the API omits it for a single completion.
  #[serde(default)]
  pub count:        Option<u32>,
  #[serde(default)]
  pub completed_at: Option<String>,
}

/// One member's completed and bookmarked topics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberProgress {
  pub user_id:           String,
  #[serde(default)]
  pub full_name:         Option<String>,
  #[serde(default)]
  pub email:             Option<String>,
  #[serde(default)]
  pub completed_topics:  Vec<TopicProgress>,
  #[serde(default)]
  pub bookmarked_topics: Vec<TopicProgress>,
}

impl Record for MemberProgress {
  const SEARCH_FIELDS: &'static [&'static str] = &["full_name", "email"];

  fn id(&self) -> &str { &self.user_id }

  fn field(&self, name: &str) -> FieldValue<'_> {
    match name {
      "user_id" => FieldValue::Text(&self.user_id),
      "full_name" | "name" => self.full_name.as_deref().into(),
      "email" => self.email.as_deref().into(),
      "completed" => FieldValue::Number(self.completed_topics.len() as f64),
      "bookmarked" => FieldValue::Number(self.bookmarked_topics.len() as f64),
      _ => FieldValue::Missing,
    }
  }
}

// ─── Topic summary ───────────────────────────────────────────────────────────

/// A member's entry in a topic's completed or bookmarked list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicMember {
  pub user_id:      String,
  pub name:         Option<String>,
  pub email:        Option<String>,
  pub count:        u32,
  pub completed_at: Option<String>,
}

/// Progress across all members for one topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicSummary {
  pub name:       String,
  pub category:   String,
  pub completed:  Vec<TopicMember>,
  pub bookmarked: Vec<TopicMember>,
}

impl Record for TopicSummary {
  const SEARCH_FIELDS: &'static [&'static str] = &["name"];
  const STATUS_FIELD: &'static str = "category";

  fn id(&self) -> &str { &self.name }

  fn field(&self, name: &str) -> FieldValue<'_> {
    match name {
      "name" => FieldValue::Text(&self.name),
      "category" => FieldValue::Text(&self.category),
      "completed" => FieldValue::Number(self.completed.len() as f64),
      "bookmarked" => FieldValue::Number(self.bookmarked.len() as f64),
      _ => FieldValue::Missing,
    }
  }
}

/// Group every member's progress by topic name, in first-seen order.
///
/// A member is listed at most once per topic; a repeated completion replaces
/// the earlier entry's count and date.
pub fn summarize_topics(members: &[MemberProgress]) -> Vec<TopicSummary> {
  let mut topics: Vec<TopicSummary> = Vec::new();
  let mut index: HashMap<String, usize> = HashMap::new();

  let mut slot = |topic: &TopicProgress, topics: &mut Vec<TopicSummary>| -> usize {
    *index.entry(topic.topic_name.clone()).or_insert_with(|| {
      topics.push(TopicSummary {
        name:       topic.topic_name.clone(),
        category:   topic
          .category
          .clone()
          .filter(|c| !c.is_empty())
          .unwrap_or_else(|| UNCATEGORIZED.to_owned()),
        completed:  Vec::new(),
        bookmarked: Vec::new(),
      });
      topics.len() - 1
    })
  };

  for member in members {
    let entry = |topic: &TopicProgress| TopicMember {
      user_id:      member.user_id.clone(),
      name:         member.full_name.clone(),
      email:        member.email.clone(),
      count:        topic.count.unwrap_or(1),
      completed_at: topic.completed_at.clone(),
    };

    for topic in &member.completed_topics {
      let i = slot(topic, &mut topics);
      let list = &mut topics[i].completed;
      match list.iter_mut().find(|m| m.user_id == member.user_id) {
        Some(existing) => {
          existing.count = topic.count.unwrap_or(1);
          existing.completed_at = topic.completed_at.clone();
        }
        None => list.push(entry(topic)),
      }
    }

    for topic in &member.bookmarked_topics {
      let i = slot(topic, &mut topics);
      topics[i].bookmarked.push(TopicMember { completed_at: None, ..entry(topic) });
    }
  }

  topics
}

/// Distinct topic categories in first-seen order.
pub fn categories(topics: &[TopicSummary]) -> Vec<&str> {
  let mut seen: Vec<&str> = Vec::new();
  for t in topics {
    if !seen.contains(&t.category.as_str()) {
      seen.push(&t.category);
    }
  }
  seen
}
