//! # `task_board`
//!
//! A task tracker: a JSON API, a server-rendered HTML board and a CLI over an
//! in-memory or `SQLite` task store.

pub mod api;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod paths;
pub mod server;
pub mod tasks;
pub mod templates;
pub mod traits;
pub mod views;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
