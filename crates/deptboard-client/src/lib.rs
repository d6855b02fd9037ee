//! Client data and view-state layer for the deptboard API.
//!
//! [`board::Board`] fetches departments, forums and activity feeds through a
//! [`client::BoardBackend`], reshapes them into the view models in [`view`],
//! and publishes each result as an immutable [`view::Snapshot`]. The
//! functions in [`aggregate`] derive the calendar and report from a snapshot;
//! [`nav`] holds the main-screen navigation state.

// `BoardBackend` uses native `async fn`; nothing here needs `Send` futures.
#![allow(async_fn_in_trait)]

pub mod aggregate;
pub mod board;
pub mod client;
pub mod error;
pub mod nav;
pub mod view;

pub use board::{Board, SyncPolicy};
pub use client::{ApiClient, ApiConfig, BoardBackend};
pub use error::{Error, Result};
