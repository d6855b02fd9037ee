//! Departments — the nodes shown on the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DepartmentId, Error, Result, forum::GLOBAL_NODE};

/// Status label given to a department created without one.
pub const DEFAULT_STATUS: &str = "v1.0.0";

/// Accent colour given to a department created without one.
pub const DEFAULT_COLOR_THEME: &str = "#00F2FF";

/// Departments created on first boot, in display order.
pub const SEED_DEPARTMENTS: [(&str, &str); 8] = [
  ("SALES", "Department of Sales & Growth"),
  ("ENGINEERING", "Engineering & Innovation"),
  ("FINANCE", "Finance & Procurement"),
  ("IT", "Information Technology"),
  ("O&M", "Operations & Maintenance"),
  ("SEDA", "SEDA Compliance & Sustainability"),
  ("C&I", "C&I Project Execution"),
  ("CULTURE", "People & Culture"),
];

/// A stored department row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
  pub id:               DepartmentId,
  pub name:             String,
  /// Head of department as a user reference, when one is linked.
  pub hod_user_id:      Option<i64>,
  /// Head of department as free text.
  pub hod_name:         Option<String>,
  pub description_en:   String,
  pub description_cn:   Option<String>,
  pub color_theme:      String,
  /// Free-form status/version label, e.g. `v1.2.0`.
  pub status_update:    String,
  /// Expected to lie in `0..=100`; not enforced.
  pub percent_complete: i64,
  pub is_visible:       bool,
  /// Store-assigned; strictly increases on every write to the row.
  pub last_updated:     DateTime<Utc>,
}

/// Writable department fields.
///
/// On insert, `None` falls back to the fixed defaults; on update, `None`
/// keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentInput {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:             Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hod_user_id:      Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hod_name:         Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description_en:   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description_cn:   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub color_theme:      Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status_update:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub percent_complete: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub is_visible:       Option<bool>,
}

impl DepartmentInput {
  /// Input that only renames (or re-asserts the name of) a department.
  pub fn named(name: impl Into<String>) -> Self {
    Self { name: Some(name.into()), ..Self::default() }
  }

  /// Reject names that collide with the reserved global forum node.
  pub fn check_name(&self) -> Result<()> {
    match &self.name {
      Some(n) if n.eq_ignore_ascii_case(GLOBAL_NODE) => {
        Err(Error::ReservedName(n.clone()))
      }
      _ => Ok(()),
    }
  }
}

/// JSON body of `POST /departments`: an `id` selects update, its absence
/// selects insert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepartmentUpsert {
  #[serde(
    default,
    deserialize_with = "crate::id::optional",
    skip_serializing_if = "Option::is_none"
  )]
  pub id:     Option<DepartmentId>,
  #[serde(flatten)]
  pub fields: DepartmentInput,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn global_is_reserved_in_any_case() {
    assert!(DepartmentInput::named("GLOBAL").check_name().is_err());
    assert!(DepartmentInput::named("global").check_name().is_err());
    assert!(DepartmentInput::named("SALES").check_name().is_ok());
    assert!(DepartmentInput::default().check_name().is_ok());
  }

  #[test]
  fn upsert_without_id_is_an_insert() {
    let body: DepartmentUpsert =
      serde_json::from_str(r#"{"id": null, "name": "LEGAL", "percent_complete": 40}"#)
        .unwrap();
    assert_eq!(body.id, None);
    assert_eq!(body.fields.name.as_deref(), Some("LEGAL"));
    assert_eq!(body.fields.percent_complete, Some(40));
    assert_eq!(body.fields.is_visible, None);
  }

  #[test]
  fn upsert_accepts_string_id() {
    let body: DepartmentUpsert =
      serde_json::from_str(r#"{"id": "3", "is_visible": false}"#).unwrap();
    assert_eq!(body.id, Some(3));
    assert_eq!(body.fields.is_visible, Some(false));
    assert_eq!(body.fields.name, None);
  }

  #[test]
  fn partial_input_serialises_only_present_fields() {
    let json = serde_json::to_value(DepartmentInput::named("IT")).unwrap();
    assert_eq!(json, serde_json::json!({ "name": "IT" }));
  }
}
