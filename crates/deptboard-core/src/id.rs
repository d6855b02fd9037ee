//! Lenient id decoding.
//!
//! Browser clients send ids either as JSON numbers or as numeric strings
//! (`"12"`), depending on where the id came from. Request bodies accept both
//! and normalise to the integer form.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
  Int(i64),
  Str(String),
}

impl RawId {
  fn into_id<E: serde::de::Error>(self) -> Result<i64, E> {
    match self {
      RawId::Int(n) => Ok(n),
      RawId::Str(s) => s
        .trim()
        .parse()
        .map_err(|_| E::custom(format!("invalid id: {s:?}"))),
    }
  }
}

/// `deserialize_with` helper for an `Option<i64>` id field.
///
/// `null`, a missing field and an empty string all decode to `None`.
pub fn optional<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<RawId>::deserialize(deserializer)? {
    None => Ok(None),
    Some(RawId::Str(s)) if s.trim().is_empty() => Ok(None),
    Some(raw) => raw.into_id().map(Some),
  }
}

#[cfg(test)]
mod tests {
  use serde::Deserialize;

  #[derive(Deserialize)]
  struct Body {
    #[serde(default, deserialize_with = "super::optional")]
    id: Option<i64>,
  }

  fn decode(json: &str) -> Option<i64> {
    serde_json::from_str::<Body>(json).unwrap().id
  }

  #[test]
  fn accepts_numbers_and_numeric_strings() {
    assert_eq!(decode(r#"{"id": 7}"#), Some(7));
    assert_eq!(decode(r#"{"id": "7"}"#), Some(7));
    assert_eq!(decode(r#"{"id": " 42 "}"#), Some(42));
  }

  #[test]
  fn null_missing_and_empty_are_none() {
    assert_eq!(decode(r#"{"id": null}"#), None);
    assert_eq!(decode(r#"{}"#), None);
    assert_eq!(decode(r#"{"id": ""}"#), None);
  }

  #[test]
  fn rejects_non_numeric_strings() {
    assert!(serde_json::from_str::<Body>(r#"{"id": "NEW"}"#).is_err());
  }
}
