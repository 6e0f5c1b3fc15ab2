//! Task service: the named views and the mutations over a [`TaskStore`].

use crate::error::{Error, Result};
use crate::tasks::models::{NewTask, Task, TaskUpdate, TaskView};
use crate::tasks::store::{TaskFilter, TaskStore};
use crate::traits::{Clock, SystemClock};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Number of lock stripes guarding read-modify-write sequences.
const LOCK_STRIPES: usize = 64;

/// Per-record critical sections.
///
/// A fixed set of mutexes selected by the task id. Two mutations of the same
/// id always pick the same stripe and so never interleave.
#[derive(Debug)]
struct RecordLocks {
    stripes: Vec<Mutex<()>>,
}

impl RecordLocks {
    fn new() -> Self {
        Self { stripes: (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect() }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn lock(&self, id: Uuid) -> MutexGuard<'_, ()> {
        let index = (id.as_u128() % LOCK_STRIPES as u128) as usize;
        // The guarded value is `()`, so a poisoned stripe carries no broken state.
        self.stripes[index].lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Query and mutation operations over a task store.
///
/// The service keeps no task state of its own; every task it returns is an
/// owned copy, and changing a copy persists nothing.
pub struct TaskService {
    store: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
    locks: RecordLocks,
}

impl std::fmt::Debug for TaskService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskService").finish_non_exhaustive()
    }
}

impl TaskService {
    /// Create a service over `store` using the system clock.
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Create a service with an explicit clock.
    pub fn with_clock(store: Arc<dyn TaskStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock, locks: RecordLocks::new() }
    }

    /// The current time according to the service clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// All tasks, in any state.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn find_all(&self) -> Result<Vec<Task>> {
        self.find(TaskView::All)
    }

    /// Tasks that are not archived.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn find_active(&self) -> Result<Vec<Task>> {
        self.find(TaskView::Active)
    }

    /// Completed tasks that are not archived.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn find_completed(&self) -> Result<Vec<Task>> {
        self.find(TaskView::Completed)
    }

    /// Archived tasks.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn find_archived(&self) -> Result<Vec<Task>> {
        self.find(TaskView::Archived)
    }

    /// Active, incomplete tasks whose due date is before the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn find_overdue(&self) -> Result<Vec<Task>> {
        self.find(TaskView::Overdue)
    }

    /// Tasks in the named view, evaluated against the clock at call time.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn find(&self, view: TaskView) -> Result<Vec<Task>> {
        let filter = TaskFilter::for_view(view, self.clock.now());
        self.store.query_all(&filter)
    }

    /// A single task.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no task has this id.
    pub fn find_by_id(&self, id: Uuid) -> Result<Task> {
        self.store.get_by_id(id)?.ok_or(Error::NotFound(id))
    }

    /// Create a task with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty title, or a store error.
    pub fn create(&self, new: NewTask) -> Result<Task> {
        let NewTask { title, due_date } = NewTask::new(&new.title, new.due_date)?;
        let task = Task::new(Uuid::new_v4(), title, due_date, self.clock.now());
        let stored = self.store.insert(task)?;
        tracing::info!(task_id = %stored.id, "task created");
        Ok(stored)
    }

    /// Overwrite a task's mutable fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty title, [`Error::NotFound`] if
    /// absent, or a store error.
    pub fn update(&self, id: Uuid, update: &TaskUpdate) -> Result<Task> {
        update.validate()?;
        let task = self.mutate(id, |task, now| update.apply_to(task, now))?;
        tracing::info!(task_id = %id, "task updated");
        Ok(task)
    }

    /// Flip the completion flag, stamping or clearing `completed_at`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if absent, or a store error.
    pub fn toggle_complete(&self, id: Uuid) -> Result<Task> {
        let task = self.mutate(id, |task, now| task.set_completed(!task.is_completed, now))?;
        tracing::info!(task_id = %id, completed = task.is_completed, "task completion toggled");
        Ok(task)
    }

    /// Archive a task. Completion is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if absent, or a store error.
    pub fn archive(&self, id: Uuid) -> Result<Task> {
        let task = self.mutate(id, |task, _| task.is_archived = true)?;
        tracing::info!(task_id = %id, "task archived");
        Ok(task)
    }

    /// Restore an archived task. Completion is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if absent, or a store error.
    pub fn unarchive(&self, id: Uuid) -> Result<Task> {
        let task = self.mutate(id, |task, _| task.is_archived = false)?;
        tracing::info!(task_id = %id, "task unarchived");
        Ok(task)
    }

    /// Remove a task permanently.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if absent, or a store error.
    pub fn delete(&self, id: Uuid) -> Result<()> {
        let _guard = self.locks.lock(id);
        self.store.delete(id)?;
        tracing::info!(task_id = %id, "task deleted");
        Ok(())
    }

    /// Read-modify-write one task under its record lock.
    fn mutate(&self, id: Uuid, change: impl FnOnce(&mut Task, DateTime<Utc>)) -> Result<Task> {
        let _guard = self.locks.lock(id);
        let mut task = self.store.get_by_id(id)?.ok_or(Error::NotFound(id))?;
        change(&mut task, self.clock.now());
        tracing::debug!(task_id = %id, "writing task");
        self.store.update(id, task)
    }
}
