//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that lexical `ORDER BY` matches chronological order.

use std::str::FromStr as _;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use deptboard_core::{
  activity::{ActivityEntry, SignalKind},
  department::Department,
  forum::{ForumReply, ForumTopic},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

/// The `last_updated` value for a write happening at `now`.
///
/// Never earlier than one microsecond after `previous`, so consecutive
/// writes to a row always move the stamp forward even when the clock has
/// not (or has gone backwards).
pub fn next_stamp(
  previous: Option<DateTime<Utc>>,
  now: DateTime<Utc>,
) -> DateTime<Utc> {
  let now = truncate_micros(now);
  match previous {
    Some(prev) if now <= prev => prev + Duration::microseconds(1),
    _ => now,
  }
}

/// Drop sub-microsecond precision so stored and in-memory values compare
/// equal after a round trip.
pub fn truncate_micros(dt: DateTime<Utc>) -> DateTime<Utc> {
  DateTime::from_timestamp_micros(dt.timestamp_micros()).unwrap_or(dt)
}

// ─── SignalKind ──────────────────────────────────────────────────────────────

pub fn decode_kind(s: &str) -> Result<SignalKind> {
  SignalKind::from_str(s)
    .map_err(|_| deptboard_core::Error::UnknownSignalKind(s.to_owned()).into())
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `departments` row.
pub struct RawDepartment {
  pub id:               i64,
  pub name:             String,
  pub hod_user_id:      Option<i64>,
  pub hod_name:         Option<String>,
  pub description_en:   String,
  pub description_cn:   Option<String>,
  pub color_theme:      String,
  pub status_update:    String,
  pub percent_complete: i64,
  pub is_visible:       bool,
  pub last_updated:     String,
}

impl RawDepartment {
  /// Map a row selected with [`crate::schema::DEPARTMENT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      name:             row.get(1)?,
      hod_user_id:      row.get(2)?,
      hod_name:         row.get(3)?,
      description_en:   row.get(4)?,
      description_cn:   row.get(5)?,
      color_theme:      row.get(6)?,
      status_update:    row.get(7)?,
      percent_complete: row.get(8)?,
      is_visible:       row.get(9)?,
      last_updated:     row.get(10)?,
    })
  }

  pub fn into_department(self) -> Result<Department> {
    Ok(Department {
      id:               self.id,
      name:             self.name,
      hod_user_id:      self.hod_user_id,
      hod_name:         self.hod_name,
      description_en:   self.description_en,
      description_cn:   self.description_cn,
      color_theme:      self.color_theme,
      status_update:    self.status_update,
      percent_complete: self.percent_complete,
      is_visible:       self.is_visible,
      last_updated:     decode_dt(&self.last_updated)?,
    })
  }
}

/// Raw values read directly from an `activity_feed` row.
pub struct RawActivity {
  pub id:               i64,
  pub dept_metadata_id: i64,
  pub author_id:        Option<i64>,
  pub author_name:      Option<String>,
  pub content_en:       String,
  pub content_cn:       Option<String>,
  pub is_pinned:        bool,
  pub kind:             String,
  pub created_at:       String,
}

impl RawActivity {
  /// Map a row selected with [`crate::schema::ACTIVITY_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      dept_metadata_id: row.get(1)?,
      author_id:        row.get(2)?,
      author_name:      row.get(3)?,
      content_en:       row.get(4)?,
      content_cn:       row.get(5)?,
      is_pinned:        row.get(6)?,
      kind:             row.get(7)?,
      created_at:       row.get(8)?,
    })
  }

  pub fn into_entry(self) -> Result<ActivityEntry> {
    Ok(ActivityEntry {
      id:               self.id,
      dept_metadata_id: self.dept_metadata_id,
      author_id:        self.author_id,
      author_name:      self.author_name,
      content_en:       self.content_en,
      content_cn:       self.content_cn,
      is_pinned:        self.is_pinned,
      kind:             decode_kind(&self.kind)?,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read from a `forum_topics` row joined with its department.
pub struct RawTopic {
  pub id:            i64,
  pub department_id: Option<i64>,
  pub dept_name:     String,
  pub author_name:   String,
  pub title:         String,
  pub content:       String,
  pub created_at:    String,
}

impl RawTopic {
  /// Map a row selected with [`crate::schema::TOPIC_SELECT`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      department_id: row.get(1)?,
      dept_name:     row.get(2)?,
      author_name:   row.get(3)?,
      title:         row.get(4)?,
      content:       row.get(5)?,
      created_at:    row.get(6)?,
    })
  }

  pub fn into_topic(self) -> Result<ForumTopic> {
    Ok(ForumTopic {
      id:            self.id,
      department_id: self.department_id,
      dept_name:     self.dept_name,
      author_name:   self.author_name,
      title:         self.title,
      content:       self.content,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `forum_replies` row.
pub struct RawReply {
  pub id:          i64,
  pub topic_id:    i64,
  pub author_name: String,
  pub content:     String,
  pub created_at:  String,
}

impl RawReply {
  /// Map a row selected with [`crate::schema::REPLY_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      topic_id:    row.get(1)?,
      author_name: row.get(2)?,
      content:     row.get(3)?,
      created_at:  row.get(4)?,
    })
  }

  pub fn into_reply(self) -> Result<ForumReply> {
    Ok(ForumReply {
      id:          self.id,
      topic_id:    self.topic_id,
      author_name: self.author_name,
      content:     self.content,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}
