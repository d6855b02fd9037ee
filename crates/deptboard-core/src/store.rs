//! The `BoardStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `deptboard-store-sqlite`). The HTTP layer (`deptboard-api`) depends on
//! this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  DepartmentId, TopicId,
  activity::{ActivityEntry, NewActivityEntry},
  department::{Department, DepartmentInput},
  forum::{ForumNode, ForumReply, ForumTopic, NewForumReply, NewForumTopic},
};

/// Abstraction over a dashboard store backend.
///
/// Writes are passthrough: inputs are not validated beyond what the backing
/// schema enforces, so a missing required field surfaces as a backend error.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait BoardStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Departments ───────────────────────────────────────────────────────

  /// All departments, ascending by id.
  fn list_departments(
    &self,
  ) -> impl Future<Output = Result<Vec<Department>, Self::Error>> + Send + '_;

  /// Retrieve a department by id. Returns `None` if not found.
  fn get_department(
    &self,
    id: DepartmentId,
  ) -> impl Future<Output = Result<Option<Department>, Self::Error>> + Send + '_;

  /// Insert a department; absent fields take the fixed defaults.
  fn insert_department(
    &self,
    input: DepartmentInput,
  ) -> impl Future<Output = Result<Department, Self::Error>> + Send + '_;

  /// Update a department; absent fields keep their stored values and
  /// `last_updated` is bumped. Returns `None` if the id does not exist.
  fn update_department(
    &self,
    id: DepartmentId,
    input: DepartmentInput,
  ) -> impl Future<Output = Result<Option<Department>, Self::Error>> + Send + '_;

  // ── Activity feed ─────────────────────────────────────────────────────

  /// Entries of one department, newest first.
  fn list_activity(
    &self,
    department_id: DepartmentId,
  ) -> impl Future<Output = Result<Vec<ActivityEntry>, Self::Error>> + Send + '_;

  /// Record an entry; `created_at` is set by the store.
  fn record_activity(
    &self,
    input: NewActivityEntry,
  ) -> impl Future<Output = Result<ActivityEntry, Self::Error>> + Send + '_;

  // ── Forum ─────────────────────────────────────────────────────────────

  /// Resolve a wire node key (`GLOBAL` or a department name). Returns
  /// `None` when no such department exists.
  fn resolve_node(
    &self,
    key: String,
  ) -> impl Future<Output = Result<Option<ForumNode>, Self::Error>> + Send + '_;

  /// Topics of one node, newest first.
  fn list_topics(
    &self,
    node: ForumNode,
  ) -> impl Future<Output = Result<Vec<ForumTopic>, Self::Error>> + Send + '_;

  /// Create a topic under `node`.
  fn create_topic(
    &self,
    node: ForumNode,
    input: NewForumTopic,
  ) -> impl Future<Output = Result<ForumTopic, Self::Error>> + Send + '_;

  /// Replies of one topic, oldest first.
  fn list_replies(
    &self,
    topic_id: TopicId,
  ) -> impl Future<Output = Result<Vec<ForumReply>, Self::Error>> + Send + '_;

  /// Append a reply to the topic named in `input`.
  fn add_reply(
    &self,
    input: NewForumReply,
  ) -> impl Future<Output = Result<ForumReply, Self::Error>> + Send + '_;
}
