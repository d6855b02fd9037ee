//! Core types and trait definitions for the deptboard dashboard.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod activity;
pub mod department;
pub mod error;
pub mod forum;
pub mod id;
pub mod store;

pub use error::{Error, Result};

/// Identifier of a department row.
pub type DepartmentId = i64;
/// Identifier of an activity-feed entry.
pub type EntryId = i64;
/// Identifier of a forum topic.
pub type TopicId = i64;
/// Identifier of a forum reply.
pub type ReplyId = i64;
