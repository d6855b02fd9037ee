//! Forum nodes, topics and replies.
//!
//! Every department owns one forum node; a single reserved node, `GLOBAL`,
//! holds site-wide discussions. Topics reference their department by id, so
//! a node cannot point at a department that does not exist.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DepartmentId, ReplyId, TopicId};

/// Wire key of the site-wide forum node.
pub const GLOBAL_NODE: &str = "GLOBAL";

/// A discussion space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ForumNode {
  Global,
  Department(DepartmentId),
}

impl ForumNode {
  /// The department id stored in `forum_topics.department_id`.
  pub fn department_id(self) -> Option<DepartmentId> {
    match self {
      Self::Global => None,
      Self::Department(id) => Some(id),
    }
  }
}

impl From<Option<DepartmentId>> for ForumNode {
  fn from(id: Option<DepartmentId>) -> Self {
    id.map_or(Self::Global, Self::Department)
  }
}

impl fmt::Display for ForumNode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Global => f.write_str(GLOBAL_NODE),
      Self::Department(id) => write!(f, "department #{id}"),
    }
  }
}

// ─── Topics ──────────────────────────────────────────────────────────────────

/// A stored forum topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumTopic {
  pub id:            TopicId,
  /// `None` for the global node.
  pub department_id: Option<DepartmentId>,
  /// Wire key of the node: `GLOBAL` or the department's current name.
  pub dept_name:     String,
  pub author_name:   String,
  pub title:         String,
  pub content:       String,
  pub created_at:    DateTime<Utc>,
}

impl ForumTopic {
  pub fn node(&self) -> ForumNode { ForumNode::from(self.department_id) }
}

/// JSON body of `POST /forum/topics`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewForumTopic {
  /// Node key: `GLOBAL` or a department name.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub dept_name:   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub author_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub content:     Option<String>,
}

// ─── Replies ─────────────────────────────────────────────────────────────────

/// A stored reply to a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumReply {
  pub id:          ReplyId,
  pub topic_id:    TopicId,
  pub author_name: String,
  pub content:     String,
  pub created_at:  DateTime<Utc>,
}

/// JSON body of `POST /forum/replies`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewForumReply {
  #[serde(
    default,
    deserialize_with = "crate::id::optional",
    skip_serializing_if = "Option::is_none"
  )]
  pub topic_id:    Option<TopicId>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub author_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub content:     Option<String>,
}
