//! Error type for `deptboard-client`.

use deptboard_core::DepartmentId;
use thiserror::Error;

use crate::view::Role;

#[derive(Debug, Error)]
pub enum Error {
  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),

  /// The API answered with a non-success status.
  #[error("{method} {path} returned {status}: {message}")]
  Status {
    method:  &'static str,
    path:    String,
    status:  u16,
    message: String,
  },

  #[error("{role} may not {action}")]
  Forbidden { action: &'static str, role: Role },

  #[error("{0} is not available from the current screen")]
  NotAvailable(&'static str),

  #[error("unknown department: {0}")]
  UnknownDepartment(String),

  #[error("department {0} is not loaded")]
  MissingDepartment(DepartmentId),

  #[error("configuration error: {0}")]
  Config(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
