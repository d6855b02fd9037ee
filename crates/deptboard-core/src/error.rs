//! Error types for `deptboard-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown signal kind: {0:?}")]
  UnknownSignalKind(String),

  #[error("department name {0:?} is reserved for the global forum node")]
  ReservedName(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
