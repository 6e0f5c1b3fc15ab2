//! Task tracking.
//!
//! This module provides:
//! - The [`Task`] record and the inputs that create or change it
//! - A [`TaskStore`] abstraction with in-memory and `SQLite` backends
//! - A [`TaskService`] exposing the named views (active, completed,
//!   archived, overdue) and the mutations on a single task
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use task_board::tasks::{InMemoryTaskStore, NewTask, TaskService};
//!
//! let service = TaskService::new(Arc::new(InMemoryTaskStore::new()));
//!
//! let task = service.create(NewTask::new("Write the release notes", None).unwrap()).unwrap();
//! service.toggle_complete(task.id).unwrap();
//!
//! assert_eq!(service.find_completed().unwrap().len(), 1);
//! ```

pub mod memory;
pub mod models;
pub mod service;
pub mod store;

pub use memory::InMemoryTaskStore;
pub use models::{parse_task_id, parse_timestamp, NewTask, Task, TaskUpdate, TaskView};
pub use service::TaskService;
pub use store::{SqliteTaskStore, TaskFilter, TaskStore};
