//! The [`Board`] controller: single owner of the dashboard view state.
//!
//! A refresh fetches everything and commits it as one new [`Snapshot`].
//! Mutations write through the backend and then either merge the returned
//! rows into a copy of the current snapshot ([`SyncPolicy::Incremental`]) or
//! refetch everything ([`SyncPolicy::FullResync`]). Either way readers only
//! ever see whole snapshots.

use std::{collections::BTreeMap, sync::Arc};

use deptboard_core::{
  DepartmentId, TopicId,
  activity::{NewActivityEntry, SignalKind},
  department::{DepartmentInput, DepartmentUpsert},
  forum::{NewForumReply, NewForumTopic},
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::sync::watch;

use crate::{
  Error, Result,
  client::BoardBackend,
  view::{
    ActivitySignal, DepartmentView, ForumNodeView, Lang, ReplyView, Snapshot, TopicView, User,
  },
};

/// How the snapshot is brought up to date after a successful write.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SyncPolicy {
  /// Refetch everything after every write.
  FullResync,
  /// Merge the written rows locally; refetch only when that is not possible.
  #[default]
  Incremental,
}

// ─── Board ────────────────────────────────────────────────────────────────────

pub struct Board<B> {
  backend: B,
  user:    User,
  lang:    Lang,
  policy:  SyncPolicy,
  loading: bool,
  state:   watch::Sender<Arc<Snapshot>>,
}

impl<B: BoardBackend> Board<B> {
  /// An empty board. Nothing is fetched until [`Board::refresh`].
  pub fn new(backend: B, user: User) -> Self {
    let (state, _) = watch::channel(Arc::new(Snapshot::default()));
    Self {
      backend,
      user,
      lang: Lang::default(),
      policy: SyncPolicy::default(),
      loading: true,
      state,
    }
  }

  pub fn with_lang(mut self, lang: Lang) -> Self {
    self.lang = lang;
    self
  }

  pub fn with_policy(mut self, policy: SyncPolicy) -> Self {
    self.policy = policy;
    self
  }

  pub fn user(&self) -> &User { &self.user }

  pub fn lang(&self) -> Lang { self.lang }

  pub fn policy(&self) -> SyncPolicy { self.policy }

  /// True until the first refresh completes, and while one is running.
  pub fn is_loading(&self) -> bool { self.loading }

  /// The current snapshot.
  pub fn snapshot(&self) -> Arc<Snapshot> {
    self.state.borrow().clone()
  }

  /// A receiver that observes every committed snapshot.
  pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
    self.state.subscribe()
  }

  /// Attribute subsequent writes to `user`.
  pub fn set_user(&mut self, user: User) {
    self.user = user;
  }

  /// Switch the display language. Content is localised at fetch time, so
  /// this refetches everything.
  ///
  /// If the refetch fails the previous language is kept, matching the
  /// snapshot that stays in place.
  pub async fn set_language(&mut self, lang: Lang) -> Result<()> {
    let previous = std::mem::replace(&mut self.lang, lang);
    let refreshed = self.refresh().await;
    if refreshed.is_err() {
      self.lang = previous;
    }
    refreshed
  }

  // ── Refresh ───────────────────────────────────────────────────────────────

  /// Fetch everything and commit it as a new snapshot.
  ///
  /// On failure the previous snapshot stays in place.
  pub async fn refresh(&mut self) -> Result<()> {
    self.loading = true;
    let fetched = self.fetch().await;
    self.loading = false;

    match fetched {
      Ok(snapshot) => {
        tracing::debug!(
          departments = snapshot.departments.len(),
          forums = snapshot.forums.len(),
          "refreshed board",
        );
        self.commit(snapshot);
        Ok(())
      }
      Err(e) => {
        tracing::error!(error = %e, "refresh failed; keeping previous snapshot");
        Err(e)
      }
    }
  }

  async fn fetch(&self) -> Result<Snapshot> {
    let departments: Vec<DepartmentView> = self
      .backend
      .list_departments()
      .await?
      .into_iter()
      .map(|d| DepartmentView::from_department(d, self.lang))
      .collect();

    let mut forums = Vec::with_capacity(departments.len() + 1);
    forums.push(ForumNodeView::global());
    forums.extend(departments.iter().map(ForumNodeView::department));
    for forum in &mut forums {
      for topic in self.backend.list_topics(&forum.key).await? {
        let replies = self.backend.list_replies(topic.id).await?;
        forum.topics.insert(topic.id, TopicView::new(topic, replies));
      }
    }

    let mut signals = BTreeMap::new();
    for dept in &departments {
      let feed = self
        .backend
        .list_activity(dept.id)
        .await?
        .into_iter()
        .map(|e| ActivitySignal::from_entry(e, &dept.name, self.lang))
        .collect();
      signals.insert(dept.name.clone(), feed);
    }

    Ok(Snapshot { lang: self.lang, departments, forums, signals })
  }

  fn commit(&self, snapshot: Snapshot) {
    self.state.send_replace(Arc::new(snapshot));
  }

  /// Bring the snapshot up to date after a successful write.
  ///
  /// `merge` edits a copy of the current snapshot and returns `false` when it
  /// cannot apply the change locally.
  async fn sync(&mut self, merge: impl FnOnce(&mut Snapshot) -> bool) {
    if self.policy == SyncPolicy::Incremental {
      let mut next = Snapshot::clone(&self.snapshot());
      if merge(&mut next) {
        self.commit(next);
        return;
      }
      tracing::debug!("local merge not possible; resyncing");
    }
    // Failure is logged by `refresh`; the write itself succeeded.
    self.refresh().await.ok();
  }

  fn require_admin(&self, action: &'static str) -> Result<()> {
    if self.user.role.is_admin() {
      Ok(())
    } else {
      Err(Error::Forbidden { action, role: self.user.role })
    }
  }

  // ── Activity ──────────────────────────────────────────────────────────────

  /// Post a signal to the named department's feed.
  pub async fn post_signal(
    &mut self,
    department: &str,
    kind: SignalKind,
    content: &str,
  ) -> Result<ActivitySignal> {
    let snapshot = self.snapshot();
    let dept = snapshot
      .department_named(department)
      .ok_or_else(|| Error::UnknownDepartment(department.to_owned()))?;

    let body = NewActivityEntry {
      dept_metadata_id: Some(dept.id),
      author_id:        Some(self.user.id),
      author_name:      Some(self.user.name.clone()),
      content_en:       Some(content.to_owned()),
      content_cn:       Some(content.to_owned()),
      is_pinned:        Some(kind == SignalKind::SystemUpdate),
      kind:             Some(kind),
    };
    let entry = self.backend.post_activity(&body).await?;
    let signal = ActivitySignal::from_entry(entry, &dept.name, self.lang);
    tracing::info!(department, kind = %signal.kind, id = signal.id, "posted signal");

    let merged = signal.clone();
    self
      .sync(move |s| match s.signals.get_mut(&merged.department) {
        Some(feed) => {
          feed.insert(0, merged);
          true
        }
        None => false,
      })
      .await;
    Ok(signal)
  }

  // ── Forum ─────────────────────────────────────────────────────────────────

  /// Open a topic under `node` (`GLOBAL` or a department name). Returns the
  /// new topic's id.
  pub async fn create_topic(
    &mut self,
    node: &str,
    title: &str,
    content: &str,
  ) -> Result<TopicId> {
    let body = NewForumTopic {
      dept_name:   Some(node.to_owned()),
      author_name: Some(self.user.name.clone()),
      title:       Some(title.to_owned()),
      content:     Some(content.to_owned()),
    };
    let topic = self.backend.create_topic(&body).await?;
    let id = topic.id;
    tracing::info!(node, id, "created topic");

    let key = topic.dept_name.clone();
    let view = TopicView::new(topic, Vec::new());
    self
      .sync(move |s| match s.forums.iter_mut().find(|f| f.key == key) {
        Some(forum) => {
          forum.topics.insert(view.id, view);
          true
        }
        None => false,
      })
      .await;
    Ok(id)
  }

  /// Append a reply to a topic.
  pub async fn add_reply(&mut self, topic_id: TopicId, content: &str) -> Result<ReplyView> {
    let body = NewForumReply {
      topic_id:    Some(topic_id),
      author_name: Some(self.user.name.clone()),
      content:     Some(content.to_owned()),
    };
    let reply = ReplyView::from(self.backend.add_reply(&body).await?);
    tracing::info!(topic_id, id = reply.id, "added reply");

    let merged = reply.clone();
    self
      .sync(move |s| {
        let topic = s.forums.iter_mut().find_map(|f| f.topics.get_mut(&topic_id));
        match topic {
          Some(topic) => {
            topic.replies.push(merged);
            true
          }
          None => false,
        }
      })
      .await;
    Ok(reply)
  }

  // ── Departments (admin) ───────────────────────────────────────────────────

  /// Create (`id` is `None`) or update a department.
  pub async fn update_department(
    &mut self,
    id: Option<DepartmentId>,
    fields: DepartmentInput,
  ) -> Result<DepartmentView> {
    self.require_admin("edit departments")?;
    let view = self.save(DepartmentUpsert { id, fields }).await?;
    tracing::info!(id = view.id, name = %view.name, "saved department");
    Ok(view)
  }

  /// Flip one department's home-screen visibility.
  pub async fn toggle_visibility(&mut self, id: DepartmentId) -> Result<DepartmentView> {
    self.require_admin("change department visibility")?;
    let snapshot = self.snapshot();
    let dept = snapshot.department(id).ok_or(Error::MissingDepartment(id))?;

    let fields = DepartmentInput {
      is_visible: Some(!dept.visible),
      ..DepartmentInput::named(dept.name.clone())
    };
    let view = self.save(DepartmentUpsert { id: Some(id), fields }).await?;
    tracing::info!(id, visible = view.visible, "toggled department visibility");
    Ok(view)
  }

  /// Re-save every visible department unchanged so each one's last-updated
  /// stamp moves to now.
  pub async fn sync_all_dates(&mut self) -> Result<Vec<DepartmentView>> {
    self.require_admin("sync department dates")?;
    let targets: Vec<(DepartmentId, String)> = self
      .snapshot()
      .home_departments()
      .map(|d| (d.id, d.name.clone()))
      .collect();

    let mut saved = Vec::with_capacity(targets.len());
    for (id, name) in targets {
      let body = DepartmentUpsert { id: Some(id), fields: DepartmentInput::named(name) };
      saved.push(self.write_department(&body).await?);
    }
    tracing::info!(count = saved.len(), "synced department dates");

    let merged = saved.clone();
    self
      .sync(move |s| merged.into_iter().all(|view| merge_department(s, view)))
      .await;
    Ok(saved)
  }

  async fn save(&mut self, body: DepartmentUpsert) -> Result<DepartmentView> {
    let view = self.write_department(&body).await?;
    let merged = view.clone();
    self.sync(move |s| merge_department(s, merged)).await;
    Ok(view)
  }

  /// Write one department without touching the snapshot.
  async fn write_department(&self, body: &DepartmentUpsert) -> Result<DepartmentView> {
    let dept = self.backend.save_department(body).await?;
    Ok(DepartmentView::from_department(dept, self.lang))
  }
}

/// Apply a saved department to `s`. A rename moves forum and signal keys, so
/// it is left to a full resync.
fn merge_department(s: &mut Snapshot, view: DepartmentView) -> bool {
  match s.departments.iter().position(|d| d.id == view.id) {
    Some(i) if s.departments[i].name == view.name => {
      s.departments[i] = view;
      true
    }
    Some(_) => false,
    // Ids are allocated in ascending order, so a new department goes last.
    None if s.departments.last().is_none_or(|last| last.id < view.id) => {
      s.forums.push(ForumNodeView::department(&view));
      s.signals.insert(view.name.clone(), Vec::new());
      s.departments.push(view);
      true
    }
    None => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use chrono::Utc;
  use deptboard_core::department::Department;

  fn view(id: DepartmentId, name: &str) -> DepartmentView {
    DepartmentView::from_department(
      Department {
        id,
        name:             name.into(),
        hod_user_id:      None,
        hod_name:         None,
        description_en:   String::new(),
        description_cn:   None,
        color_theme:      "#00F2FF".into(),
        status_update:    "v1.0.0".into(),
        percent_complete: 0,
        is_visible:       true,
        last_updated:     Utc::now(),
      },
      Lang::En,
    )
  }

  fn snapshot() -> Snapshot {
    let departments = vec![view(1, "SALES"), view(2, "IT")];
    let mut forums = vec![ForumNodeView::global()];
    forums.extend(departments.iter().map(ForumNodeView::department));
    let signals = departments.iter().map(|d| (d.name.clone(), Vec::new())).collect();
    Snapshot { lang: Lang::En, departments, forums, signals }
  }

  #[test]
  fn merge_replaces_in_place() {
    let mut s = snapshot();
    let mut edited = view(2, "IT");
    edited.percent = 75;
    assert!(merge_department(&mut s, edited));
    assert_eq!(s.departments[1].percent, 75);
    assert_eq!(s.departments.len(), 2);
  }

  #[test]
  fn merge_appends_new_department_with_empty_forum() {
    let mut s = snapshot();
    assert!(merge_department(&mut s, view(9, "LEGAL")));
    assert_eq!(s.departments.last().map(|d| d.id), Some(9));
    assert_eq!(s.forums.last().map(|f| f.key.as_str()), Some("LEGAL"));
    assert!(s.signals["LEGAL"].is_empty());
  }

  #[test]
  fn merge_refuses_rename() {
    let mut s = snapshot();
    let before = s.clone();
    assert!(!merge_department(&mut s, view(2, "IT-OPS")));
    assert_eq!(s, before);
  }

  #[test]
  fn sync_policy_names() {
    assert_eq!(SyncPolicy::default(), SyncPolicy::Incremental);
    assert_eq!("full-resync".parse::<SyncPolicy>().unwrap(), SyncPolicy::FullResync);
    assert_eq!(SyncPolicy::Incremental.to_string(), "incremental");
  }
}
