//! Async HTTP client wrapping the deptboard JSON API.

use std::time::Duration;

use deptboard_core::{
  DepartmentId, TopicId,
  activity::{ActivityEntry, NewActivityEntry},
  department::{Department, DepartmentUpsert},
  forum::{ForumReply, ForumTopic, NewForumReply, NewForumTopic},
};
use reqwest::{Client, Response, Url};
use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result};

/// API base used by a development build when no server URL is configured.
pub const DEV_API_BASE: &str = "http://localhost:5000/api";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ─── Backend seam ─────────────────────────────────────────────────────────────

/// The API operations the [`crate::board::Board`] consumes.
///
/// [`ApiClient`] is the production implementation; tests wrap it to inject
/// failures.
pub trait BoardBackend {
  async fn list_departments(&self) -> Result<Vec<Department>>;
  async fn save_department(&self, body: &DepartmentUpsert) -> Result<Department>;

  async fn list_activity(&self, department_id: DepartmentId) -> Result<Vec<ActivityEntry>>;
  async fn post_activity(&self, body: &NewActivityEntry) -> Result<ActivityEntry>;

  async fn list_topics(&self, node: &str) -> Result<Vec<ForumTopic>>;
  async fn create_topic(&self, body: &NewForumTopic) -> Result<ForumTopic>;

  async fn list_replies(&self, topic_id: TopicId) -> Result<Vec<ForumReply>>;
  async fn add_reply(&self, body: &NewForumReply) -> Result<ForumReply>;
}

// ─── Configuration ────────────────────────────────────────────────────────────

/// Connection settings for the deptboard API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Base URL including the `/api` prefix.
  pub base_url: String,
  pub timeout:  Duration,
}

impl ApiConfig {
  /// Resolve the API base from the server origin and build mode.
  ///
  /// An explicit origin always wins. Without one, development builds talk to
  /// [`DEV_API_BASE`]; production builds have no same-origin server to fall
  /// back on and must be told where it is.
  pub fn resolve(url: Option<&str>, production: bool) -> Result<Self> {
    let base_url = match url {
      Some(url) => format!("{}/api", url.trim_end_matches('/')),
      None if production => {
        return Err(Error::Config("production mode requires a server url".into()));
      }
      None => DEV_API_BASE.to_owned(),
    };
    Ok(Self { base_url, timeout: DEFAULT_TIMEOUT })
  }
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// Async HTTP client for the deptboard JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  base:   Url,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    let base = Url::parse(&config.base_url)
      .map_err(|e| Error::Config(format!("invalid api url {:?}: {e}", config.base_url)))?;
    if base.cannot_be_a_base() {
      return Err(Error::Config(format!("{:?} cannot be used as a base url", config.base_url)));
    }
    Ok(Self { client, base })
  }

  /// Append percent-encoded path segments to the base URL.
  fn url(&self, segments: &[&str]) -> Url {
    let mut url = self.base.clone();
    // Checked in `new`.
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(segments);
    }
    url
  }

  async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
    let url = self.url(segments);
    tracing::debug!(%url, "GET");
    let resp = self.client.get(url.clone()).send().await?;
    decode("GET", &url, resp).await
  }

  async fn post<B, T>(&self, segments: &[&str], body: &B) -> Result<T>
  where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
  {
    let url = self.url(segments);
    tracing::debug!(%url, "POST");
    let resp = self.client.post(url.clone()).json(body).send().await?;
    decode("POST", &url, resp).await
  }
}

/// Deserialise a success body, or turn the API's `{"error": ...}` into
/// [`Error::Status`].
async fn decode<T: DeserializeOwned>(
  method: &'static str,
  url:    &Url,
  resp:   Response,
) -> Result<T> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp.json().await?);
  }

  let message = resp
    .json::<serde_json::Value>()
    .await
    .ok()
    .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
    .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_owned());

  Err(Error::Status {
    method,
    path: url.path().to_owned(),
    status: status.as_u16(),
    message,
  })
}

impl BoardBackend for ApiClient {
  // ── Departments ───────────────────────────────────────────────────────────

  /// `GET /api/departments`
  async fn list_departments(&self) -> Result<Vec<Department>> {
    self.get(&["departments"]).await
  }

  /// `POST /api/departments`
  async fn save_department(&self, body: &DepartmentUpsert) -> Result<Department> {
    self.post(&["departments"], body).await
  }

  // ── Activity feed ─────────────────────────────────────────────────────────

  /// `GET /api/activity-feed/<department_id>`
  async fn list_activity(&self, department_id: DepartmentId) -> Result<Vec<ActivityEntry>> {
    self.get(&["activity-feed", &department_id.to_string()]).await
  }

  /// `POST /api/activity-feed`
  async fn post_activity(&self, body: &NewActivityEntry) -> Result<ActivityEntry> {
    self.post(&["activity-feed"], body).await
  }

  // ── Forum ─────────────────────────────────────────────────────────────────

  /// `GET /api/forum/topics/<node>`
  async fn list_topics(&self, node: &str) -> Result<Vec<ForumTopic>> {
    self.get(&["forum", "topics", node]).await
  }

  /// `POST /api/forum/topics`
  async fn create_topic(&self, body: &NewForumTopic) -> Result<ForumTopic> {
    self.post(&["forum", "topics"], body).await
  }

  /// `GET /api/forum/replies/<topic_id>`
  async fn list_replies(&self, topic_id: TopicId) -> Result<Vec<ForumReply>> {
    self.get(&["forum", "replies", &topic_id.to_string()]).await
  }

  /// `POST /api/forum/replies`
  async fn add_reply(&self, body: &NewForumReply) -> Result<ForumReply> {
    self.post(&["forum", "replies"], body).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn base_url_selection() {
    let dev = ApiConfig::resolve(None, false).unwrap();
    assert_eq!(dev.base_url, DEV_API_BASE);
    assert_eq!(dev.timeout, DEFAULT_TIMEOUT);

    let prod = ApiConfig::resolve(Some("https://board.example.com/"), true).unwrap();
    assert_eq!(prod.base_url, "https://board.example.com/api");

    let explicit = ApiConfig::resolve(Some("http://10.0.0.2:5000"), false).unwrap();
    assert_eq!(explicit.base_url, "http://10.0.0.2:5000/api");

    assert!(matches!(ApiConfig::resolve(None, true), Err(Error::Config(_))));
  }

  #[test]
  fn node_keys_are_encoded_as_one_segment() {
    let client = ApiClient::new(ApiConfig::resolve(None, false).unwrap()).unwrap();
    let url = client.url(&["forum", "topics", "R&D/OPS"]);
    assert_eq!(url.as_str(), "http://localhost:5000/api/forum/topics/R&D%2FOPS");
  }

  #[test]
  fn rejects_unusable_base() {
    let config = ApiConfig { base_url: "mailto:ops@example.com".into(), timeout: DEFAULT_TIMEOUT };
    assert!(matches!(ApiClient::new(config), Err(Error::Config(_))));
  }
}
