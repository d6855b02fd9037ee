//! [`SqliteStore`] — the SQLite implementation of [`BoardStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use deptboard_core::{
  DepartmentId, TopicId,
  activity::{ActivityEntry, NewActivityEntry},
  department::{
    DEFAULT_COLOR_THEME, DEFAULT_STATUS, Department, DepartmentInput,
    SEED_DEPARTMENTS,
  },
  forum::{
    ForumNode, ForumReply, ForumTopic, GLOBAL_NODE, NewForumReply, NewForumTopic,
  },
  store::BoardStore,
};

use crate::{
  Result,
  encode::{
    RawActivity, RawDepartment, RawReply, RawTopic, encode_dt,
    next_stamp,
  },
  schema::{
    ACTIVITY_COLUMNS, DEPARTMENT_COLUMNS, REPLY_COLUMNS, SCHEMA, TOPIC_SELECT,
  },
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A dashboard store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`, then create the schema and seed it.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let store = Self::connect(path).await?;
    store.initialise().await?;
    Ok(store)
  }

  /// Open an initialised, seeded in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.initialise().await?;
    Ok(store)
  }

  /// Open the database at `path` without touching the schema.
  ///
  /// The server uses this so that a failed [`initialise`](Self::initialise)
  /// can be logged without preventing the listener from starting.
  pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Ok(Self { conn })
  }

  /// Create missing tables and seed the default departments if the
  /// department table is empty. Idempotent.
  ///
  /// Returns the number of departments seeded by this call.
  pub async fn initialise(&self) -> Result<usize> {
    let now = encode_dt(Utc::now());

    let seeded = self
      .conn
      .call(move |conn| {
        conn.execute_batch(SCHEMA)?;

        let tx = conn.transaction()?;
        let count: i64 =
          tx.query_row("SELECT count(*) FROM departments", [], |r| r.get(0))?;
        if count > 0 {
          return Ok(0);
        }
        for (name, description) in SEED_DEPARTMENTS {
          tx.execute(
            "INSERT INTO departments (name, description_en, last_updated)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![name, description, now],
          )?;
        }
        tx.commit()?;
        Ok(SEED_DEPARTMENTS.len())
      })
      .await?;

    if seeded > 0 {
      tracing::info!(count = seeded, "seeded initial departments");
    }
    Ok(seeded)
  }
}

// ─── Row helpers (run on the connection thread) ──────────────────────────────

fn select_department(
  conn: &rusqlite::Connection,
  id: DepartmentId,
) -> rusqlite::Result<Option<RawDepartment>> {
  conn
    .query_row(
      &format!("SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE id = ?1"),
      rusqlite::params![id],
      RawDepartment::from_row,
    )
    .optional()
}

fn select_topic(
  conn: &rusqlite::Connection,
  id: TopicId,
) -> rusqlite::Result<RawTopic> {
  conn.query_row(
    &format!("{TOPIC_SELECT} WHERE t.id = ?1"),
    rusqlite::params![id],
    RawTopic::from_row,
  )
}

fn parse_stamp(s: &str) -> tokio_rusqlite::Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))
}

// ─── BoardStore impl ─────────────────────────────────────────────────────────

impl BoardStore for SqliteStore {
  type Error = crate::Error;

  // ── Departments ───────────────────────────────────────────────────────────

  async fn list_departments(&self) -> Result<Vec<Department>> {
    let raws: Vec<RawDepartment> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {DEPARTMENT_COLUMNS} FROM departments ORDER BY id ASC"
        ))?;
        let rows = stmt
          .query_map([], RawDepartment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDepartment::into_department).collect()
  }

  async fn get_department(&self, id: DepartmentId) -> Result<Option<Department>> {
    let raw = self
      .conn
      .call(move |conn| Ok(select_department(conn, id)?))
      .await?;

    raw.map(RawDepartment::into_department).transpose()
  }

  async fn insert_department(&self, input: DepartmentInput) -> Result<Department> {
    input.check_name()?;
    let now = encode_dt(Utc::now());

    let raw: RawDepartment = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!(
            "INSERT INTO departments (
               name, hod_user_id, hod_name, description_en, description_cn,
               color_theme, status_update, percent_complete, is_visible,
               last_updated
             ) VALUES (
               ?1, ?2, ?3, COALESCE(?4, ''), ?5,
               COALESCE(?6, ?7), COALESCE(?8, ?9), COALESCE(?10, 0),
               COALESCE(?11, 1), ?12
             )
             RETURNING {DEPARTMENT_COLUMNS}"
          ),
          rusqlite::params![
            input.name,
            input.hod_user_id,
            input.hod_name,
            input.description_en,
            input.description_cn,
            input.color_theme,
            DEFAULT_COLOR_THEME,
            input.status_update,
            DEFAULT_STATUS,
            input.percent_complete,
            input.is_visible,
            now,
          ],
          RawDepartment::from_row,
        )?)
      })
      .await?;

    tracing::debug!(id = raw.id, name = %raw.name, "inserted department");
    raw.into_department()
  }

  async fn update_department(
    &self,
    id:    DepartmentId,
    input: DepartmentInput,
  ) -> Result<Option<Department>> {
    input.check_name()?;
    let now = Utc::now();

    let raw: Option<RawDepartment> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let previous: Option<String> = tx
          .query_row(
            "SELECT last_updated FROM departments WHERE id = ?1",
            rusqlite::params![id],
            |r| r.get(0),
          )
          .optional()?;
        let Some(previous) = previous else {
          return Ok(None);
        };
        let stamp = encode_dt(next_stamp(Some(parse_stamp(&previous)?), now));

        let raw = tx.query_row(
          &format!(
            "UPDATE departments SET
               name             = COALESCE(?2, name),
               hod_user_id      = COALESCE(?3, hod_user_id),
               hod_name         = COALESCE(?4, hod_name),
               description_en   = COALESCE(?5, description_en),
               description_cn   = COALESCE(?6, description_cn),
               color_theme      = COALESCE(?7, color_theme),
               status_update    = COALESCE(?8, status_update),
               percent_complete = COALESCE(?9, percent_complete),
               is_visible       = COALESCE(?10, is_visible),
               last_updated     = ?11
             WHERE id = ?1
             RETURNING {DEPARTMENT_COLUMNS}"
          ),
          rusqlite::params![
            id,
            input.name,
            input.hod_user_id,
            input.hod_name,
            input.description_en,
            input.description_cn,
            input.color_theme,
            input.status_update,
            input.percent_complete,
            input.is_visible,
            stamp,
          ],
          RawDepartment::from_row,
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawDepartment::into_department).transpose()
  }

  // ── Activity feed ─────────────────────────────────────────────────────────

  async fn list_activity(&self, department_id: DepartmentId) -> Result<Vec<ActivityEntry>> {
    let raws: Vec<RawActivity> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ACTIVITY_COLUMNS} FROM activity_feed
           WHERE dept_metadata_id = ?1
           ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![department_id], RawActivity::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawActivity::into_entry).collect()
  }

  async fn record_activity(&self, input: NewActivityEntry) -> Result<ActivityEntry> {
    let (kind, pinned) = input.resolve_kind();
    let kind_str = kind.as_ref().to_owned();
    let now = encode_dt(Utc::now());

    let raw: RawActivity = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!(
            "INSERT INTO activity_feed (
               dept_metadata_id, author_id, author_name, content_en, content_cn,
               is_pinned, kind, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING {ACTIVITY_COLUMNS}"
          ),
          rusqlite::params![
            input.dept_metadata_id,
            input.author_id,
            input.author_name,
            input.content_en,
            input.content_cn,
            pinned,
            kind_str,
            now,
          ],
          RawActivity::from_row,
        )?)
      })
      .await?;

    raw.into_entry()
  }

  // ── Forum ─────────────────────────────────────────────────────────────────

  async fn resolve_node(&self, name: String) -> Result<Option<ForumNode>> {
    if name == GLOBAL_NODE {
      return Ok(Some(ForumNode::Global));
    }

    let id: Option<DepartmentId> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT id FROM departments WHERE name = ?1",
            rusqlite::params![name],
            |r| r.get(0),
          )
          .optional()?)
      })
      .await?;

    Ok(id.map(ForumNode::Department))
  }

  async fn list_topics(&self, node: ForumNode) -> Result<Vec<ForumTopic>> {
    let department_id = node.department_id();

    let raws: Vec<RawTopic> = self
      .conn
      .call(move |conn| {
        // `IS` rather than `=` so that a NULL parameter selects the global node.
        let mut stmt = conn.prepare(&format!(
          "{TOPIC_SELECT}
           WHERE t.department_id IS ?1
           ORDER BY t.created_at DESC, t.id DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![department_id], RawTopic::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTopic::into_topic).collect()
  }

  async fn create_topic(&self, node: ForumNode, input: NewForumTopic) -> Result<ForumTopic> {
    let department_id = node.department_id();
    let now = encode_dt(Utc::now());

    let raw: RawTopic = self
      .conn
      .call(move |conn| {
        let id: TopicId = conn.query_row(
          "INSERT INTO forum_topics (department_id, author_name, title, content, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)
           RETURNING id",
          rusqlite::params![
            department_id,
            input.author_name,
            input.title,
            input.content,
            now,
          ],
          |r| r.get(0),
        )?;
        Ok(select_topic(conn, id)?)
      })
      .await?;

    tracing::debug!(id = raw.id, node = %node, "created forum topic");
    raw.into_topic()
  }

  async fn list_replies(&self, topic_id: TopicId) -> Result<Vec<ForumReply>> {
    let raws: Vec<RawReply> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {REPLY_COLUMNS} FROM forum_replies
           WHERE topic_id = ?1
           ORDER BY created_at ASC, id ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![topic_id], RawReply::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReply::into_reply).collect()
  }

  async fn add_reply(&self, input: NewForumReply) -> Result<ForumReply> {
    let now = encode_dt(Utc::now());

    let raw: RawReply = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!(
            "INSERT INTO forum_replies (topic_id, author_name, content, created_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING {REPLY_COLUMNS}"
          ),
          rusqlite::params![input.topic_id, input.author_name, input.content, now],
          RawReply::from_row,
        )?)
      })
      .await?;

    raw.into_reply()
  }
}
