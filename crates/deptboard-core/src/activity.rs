//! Activity-feed entries ("signals") attached to a department.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{DepartmentId, EntryId};

/// What an activity-feed entry is about.
///
/// Stored explicitly; older writers that only send `is_pinned` get the kind
/// inferred by [`SignalKind::from_pinned`].
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
  Request,
  Feedback,
  Meeting,
  SystemUpdate,
}

impl SignalKind {
  /// Kind assumed for an entry that only carries a pinned flag.
  pub fn from_pinned(pinned: bool) -> Self {
    if pinned { Self::SystemUpdate } else { Self::Request }
  }
}

/// A stored activity-feed row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
  pub id:               EntryId,
  pub dept_metadata_id: DepartmentId,
  pub author_id:        Option<i64>,
  pub author_name:      Option<String>,
  pub content_en:       String,
  pub content_cn:       Option<String>,
  pub is_pinned:        bool,
  pub kind:             SignalKind,
  pub created_at:       DateTime<Utc>,
}

/// JSON body of `POST /activity-feed`.
///
/// Nothing is validated here; a missing department or English content is
/// rejected by the store's constraints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewActivityEntry {
  #[serde(
    default,
    deserialize_with = "crate::id::optional",
    skip_serializing_if = "Option::is_none"
  )]
  pub dept_metadata_id: Option<DepartmentId>,
  #[serde(
    default,
    deserialize_with = "crate::id::optional",
    skip_serializing_if = "Option::is_none"
  )]
  pub author_id:        Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub author_name:      Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub content_en:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub content_cn:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub is_pinned:        Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub kind:             Option<SignalKind>,
}

impl NewActivityEntry {
  /// The `(kind, pinned)` pair to store.
  ///
  /// An explicit kind wins; otherwise it is inferred from the pinned flag.
  /// A missing pinned flag follows the kind (system updates are pinned).
  pub fn resolve_kind(&self) -> (SignalKind, bool) {
    let kind = self
      .kind
      .unwrap_or_else(|| SignalKind::from_pinned(self.is_pinned.unwrap_or(false)));
    let pinned = self.is_pinned.unwrap_or(kind == SignalKind::SystemUpdate);
    (kind, pinned)
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr as _;

  use super::*;

  #[test]
  fn kind_strings_match_wire_format() {
    assert_eq!(SignalKind::SystemUpdate.to_string(), "SYSTEM_UPDATE");
    assert_eq!(SignalKind::from_str("MEETING").unwrap(), SignalKind::Meeting);
    assert!(SignalKind::from_str("meeting").is_err());
    assert_eq!(
      serde_json::to_value(SignalKind::Feedback).unwrap(),
      serde_json::json!("FEEDBACK")
    );
  }

  #[test]
  fn kind_inferred_from_pinned_flag() {
    let pinned = NewActivityEntry { is_pinned: Some(true), ..Default::default() };
    assert_eq!(pinned.resolve_kind(), (SignalKind::SystemUpdate, true));

    let plain = NewActivityEntry::default();
    assert_eq!(plain.resolve_kind(), (SignalKind::Request, false));
  }

  #[test]
  fn explicit_kind_wins_and_drives_pinned_default() {
    let meeting = NewActivityEntry {
      kind: Some(SignalKind::Meeting),
      ..Default::default()
    };
    assert_eq!(meeting.resolve_kind(), (SignalKind::Meeting, false));

    let update = NewActivityEntry {
      kind: Some(SignalKind::SystemUpdate),
      ..Default::default()
    };
    assert_eq!(update.resolve_kind(), (SignalKind::SystemUpdate, true));

    let pinned_feedback = NewActivityEntry {
      kind:      Some(SignalKind::Feedback),
      is_pinned: Some(true),
      ..Default::default()
    };
    assert_eq!(pinned_feedback.resolve_kind(), (SignalKind::Feedback, true));
  }
}
