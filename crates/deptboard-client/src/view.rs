//! View models rebuilt from API rows on every refresh.
//!
//! Everything here is plain data: the [`crate::board::Board`] controller is the
//! only producer, presentation code only reads.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use deptboard_core::{
  DepartmentId, EntryId, ReplyId, TopicId,
  activity::{ActivityEntry, SignalKind},
  department::{DEFAULT_STATUS, Department},
  forum::{ForumNode, ForumReply, ForumTopic, GLOBAL_NODE},
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub const DEFAULT_HOD: &str = "Department Head";
pub const PLACEHOLDER_AVATAR: &str = "https://i.pravatar.cc/150?u=generic";
pub const GLOBAL_DESCRIPTION: &str = "System-wide discussions";

// ─── Session ──────────────────────────────────────────────────────────────────

/// Display language. Content is localised when rows are fetched.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Lang {
  #[default]
  En,
  Cn,
}

impl Lang {
  /// Pick the variant for this language, falling back to the other one when
  /// the preferred text is missing or empty.
  pub fn pick(self, en: &str, cn: Option<&str>) -> String {
    let cn = cn.unwrap_or_default();
    let (preferred, other) = match self {
      Lang::En => (en, cn),
      Lang::Cn => (cn, en),
    };
    let text = if preferred.is_empty() { other } else { preferred };
    text.to_owned()
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Role {
  SuperAdmin,
  Admin,
  User,
}

impl Role {
  /// Admin-or-above: may open the control centre and edit departments.
  pub fn is_admin(self) -> bool {
    matches!(self, Role::SuperAdmin | Role::Admin)
  }
}

/// The identity writes are attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
  pub id:   i64,
  pub name: String,
  pub role: Role,
}

impl Default for User {
  fn default() -> Self {
    Self { id: 1, name: "System Designer".into(), role: Role::SuperAdmin }
  }
}

// ─── Departments ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentView {
  pub id:           DepartmentId,
  pub name:         String,
  pub hod:          String,
  pub avatar:       String,
  pub version:      String,
  pub description:  String,
  pub color_theme:  String,
  pub percent:      i64,
  pub visible:      bool,
  pub last_updated: Option<DateTime<Utc>>,
}

impl DepartmentView {
  pub fn from_department(dept: Department, lang: Lang) -> Self {
    let description = lang.pick(&dept.description_en, dept.description_cn.as_deref());
    Self {
      id:           dept.id,
      hod:          non_empty(dept.hod_name).unwrap_or_else(|| DEFAULT_HOD.into()),
      avatar:       PLACEHOLDER_AVATAR.into(),
      version:      non_empty(Some(dept.status_update))
        .unwrap_or_else(|| DEFAULT_STATUS.into()),
      name:         dept.name,
      description,
      color_theme:  dept.color_theme,
      percent:      dept.percent_complete,
      visible:      dept.is_visible,
      last_updated: Some(dept.last_updated),
    }
  }

  /// Stand-in for a name with no loaded department.
  pub fn placeholder(name: &str) -> Self {
    Self {
      id:           0,
      name:         name.to_owned(),
      hod:          DEFAULT_HOD.into(),
      avatar:       PLACEHOLDER_AVATAR.into(),
      version:      DEFAULT_STATUS.into(),
      description:  String::new(),
      color_theme:  deptboard_core::department::DEFAULT_COLOR_THEME.into(),
      percent:      0,
      visible:      true,
      last_updated: None,
    }
  }

  pub fn last_update_label(&self) -> String {
    match self.last_updated {
      Some(at) => at.format("%Y-%m-%d %H:%M").to_string(),
      None => "N/A".into(),
    }
  }
}

fn non_empty(s: Option<String>) -> Option<String> {
  s.filter(|s| !s.trim().is_empty())
}

// ─── Activity ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivitySignal {
  pub id:         EntryId,
  /// Name of the owning department.
  pub department: String,
  pub kind:       SignalKind,
  pub pinned:     bool,
  pub content:    String,
  pub author:     Option<String>,
  pub timestamp:  DateTime<Utc>,
}

impl ActivitySignal {
  pub fn from_entry(entry: ActivityEntry, department: &str, lang: Lang) -> Self {
    Self {
      id:         entry.id,
      department: department.to_owned(),
      kind:       entry.kind,
      pinned:     entry.is_pinned,
      content:    lang.pick(&entry.content_en, entry.content_cn.as_deref()),
      author:     entry.author_name,
      timestamp:  entry.created_at,
    }
  }
}

// ─── Forum ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyView {
  pub id:         ReplyId,
  pub author:     String,
  pub content:    String,
  pub created_at: DateTime<Utc>,
}

impl From<ForumReply> for ReplyView {
  fn from(r: ForumReply) -> Self {
    Self { id: r.id, author: r.author_name, content: r.content, created_at: r.created_at }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicView {
  pub id:         TopicId,
  pub author:     String,
  pub title:      String,
  pub content:    String,
  pub created_at: DateTime<Utc>,
  /// Oldest first.
  pub replies:    Vec<ReplyView>,
}

impl TopicView {
  pub fn new(topic: ForumTopic, replies: Vec<ForumReply>) -> Self {
    Self {
      id:         topic.id,
      author:     topic.author_name,
      title:      topic.title,
      content:    topic.content,
      created_at: topic.created_at,
      replies:    replies.into_iter().map(ReplyView::from).collect(),
    }
  }
}

/// A discussion space: the global node or one department's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForumNodeView {
  pub node:        ForumNode,
  /// Wire key, also used as the title.
  pub key:         String,
  pub description: String,
  pub topics:      BTreeMap<TopicId, TopicView>,
}

impl ForumNodeView {
  pub fn global() -> Self {
    Self {
      node:        ForumNode::Global,
      key:         GLOBAL_NODE.into(),
      description: GLOBAL_DESCRIPTION.into(),
      topics:      BTreeMap::new(),
    }
  }

  pub fn department(dept: &DepartmentView) -> Self {
    Self {
      node:        ForumNode::Department(dept.id),
      key:         dept.name.clone(),
      description: format!("Neural discussion space for {}", dept.name),
      topics:      BTreeMap::new(),
    }
  }

  /// Most recent topic, i.e. the one with the highest id.
  pub fn latest_topic(&self) -> Option<&TopicView> {
    self.topics.values().next_back()
  }
}

// ─── Snapshot ─────────────────────────────────────────────────────────────────

/// One consistent view of the whole dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
  pub lang:        Lang,
  /// Ascending by id.
  pub departments: Vec<DepartmentView>,
  /// `GLOBAL` first, then one node per department in department order.
  pub forums:      Vec<ForumNodeView>,
  /// Signals per department name, newest first.
  pub signals:     BTreeMap<String, Vec<ActivitySignal>>,
}

impl Snapshot {
  pub fn department(&self, id: DepartmentId) -> Option<&DepartmentView> {
    self.departments.iter().find(|d| d.id == id)
  }

  pub fn department_named(&self, name: &str) -> Option<&DepartmentView> {
    self.departments.iter().find(|d| d.name == name)
  }

  /// Departments shown on the home screen.
  pub fn home_departments(&self) -> impl Iterator<Item = &DepartmentView> {
    self.departments.iter().filter(|d| d.visible)
  }

  /// Every department, hidden ones included.
  pub fn admin_departments(&self) -> &[DepartmentView] {
    &self.departments
  }

  /// The named department, or a defaulted placeholder.
  pub fn department_info(&self, name: &str) -> DepartmentView {
    self
      .department_named(name)
      .cloned()
      .unwrap_or_else(|| DepartmentView::placeholder(name))
  }

  pub fn forum(&self, key: &str) -> Option<&ForumNodeView> {
    self.forums.iter().find(|f| f.key == key)
  }

  pub fn latest_topic(&self, key: &str) -> Option<&TopicView> {
    self.forum(key).and_then(ForumNodeView::latest_topic)
  }

  pub fn signals(&self, department: &str) -> &[ActivitySignal] {
    self.signals.get(department).map(Vec::as_slice).unwrap_or_default()
  }

  /// Signals of every department, in department order then feed order.
  pub fn all_signals(&self) -> impl Iterator<Item = &ActivitySignal> {
    self.departments.iter().flat_map(|d| self.signals(&d.name))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use chrono::TimeZone as _;

  fn dept(id: i64, name: &str) -> Department {
    Department {
      id,
      name:             name.into(),
      hod_user_id:      None,
      hod_name:         None,
      description_en:   format!("{name} team"),
      description_cn:   None,
      color_theme:      "#00F2FF".into(),
      status_update:    String::new(),
      percent_complete: 40,
      is_visible:       true,
      last_updated:     Utc.with_ymd_and_hms(2026, 2, 8, 9, 30, 0).unwrap(),
    }
  }

  #[test]
  fn department_view_fills_display_defaults() {
    let view = DepartmentView::from_department(dept(3, "IT"), Lang::En);
    assert_eq!(view.hod, DEFAULT_HOD);
    assert_eq!(view.avatar, PLACEHOLDER_AVATAR);
    assert_eq!(view.version, "v1.0.0");
    assert_eq!(view.percent, 40);
    assert_eq!(view.last_update_label(), "2026-02-08 09:30");

    let mut named = dept(4, "SEDA");
    named.hod_name = Some("Lee".into());
    named.status_update = "v2.1.0".into();
    let view = DepartmentView::from_department(named, Lang::En);
    assert_eq!(view.hod, "Lee");
    assert_eq!(view.version, "v2.1.0");
  }

  #[test]
  fn placeholder_has_no_update_stamp() {
    let view = DepartmentView::placeholder("MARKETING");
    assert_eq!(view.name, "MARKETING");
    assert!(view.visible);
    assert_eq!(view.last_update_label(), "N/A");
  }

  #[test]
  fn language_falls_back_when_empty() {
    assert_eq!(Lang::En.pick("hello", Some("你好")), "hello");
    assert_eq!(Lang::Cn.pick("hello", Some("你好")), "你好");
    assert_eq!(Lang::Cn.pick("hello", None), "hello");
    assert_eq!(Lang::Cn.pick("hello", Some("")), "hello");
    assert_eq!(Lang::En.pick("", Some("你好")), "你好");
  }

  #[test]
  fn roles() {
    assert!(Role::SuperAdmin.is_admin());
    assert!(Role::Admin.is_admin());
    assert!(!Role::User.is_admin());
    assert_eq!("super_admin".parse::<Role>().unwrap(), Role::SuperAdmin);
    assert_eq!(Role::Admin.to_string(), "ADMIN");
  }

  #[test]
  fn home_hides_only_invisible_departments() {
    let mut hidden = dept(2, "FINANCE");
    hidden.is_visible = false;
    let snapshot = Snapshot {
      departments: [dept(1, "SALES"), hidden, dept(3, "IT")]
        .into_iter()
        .map(|d| DepartmentView::from_department(d, Lang::En))
        .collect(),
      ..Snapshot::default()
    };

    let home: Vec<_> = snapshot.home_departments().map(|d| d.id).collect();
    assert_eq!(home, [1, 3]);
    assert_eq!(snapshot.admin_departments().len(), 3);
    assert_eq!(snapshot.department_info("FINANCE").id, 2);
    assert_eq!(snapshot.department_info("LEGAL").id, 0);
  }
}
