//! In-memory task store.
//!
//! Holds every task in a map guarded by an `RwLock`. Insertion order is
//! kept with a monotonically increasing sequence number, so deleting a task
//! never reorders the others. Nothing survives a restart.

use crate::error::{Error, Result};
use crate::tasks::models::Task;
use crate::tasks::store::{TaskFilter, TaskStore};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Records {
    next_seq: u64,
    /// Insertion sequence -> id.
    order: BTreeMap<u64, Uuid>,
    /// id -> (insertion sequence, task).
    tasks: HashMap<Uuid, (u64, Task)>,
}

/// Task store that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    records: RwLock<Records>,
}

impl InMemoryTaskStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding two sample tasks, one of them completed.
    #[must_use]
    pub fn with_sample_tasks(now: DateTime<Utc>) -> Self {
        let mut learn = Task::new(Uuid::new_v4(), "Learn the task board", None, now);
        learn.set_completed(true, now);
        let ship = Task::new(Uuid::new_v4(), "Ship the first release", None, now);

        let mut records = Records::default();
        for task in [learn, ship] {
            records.push(task);
        }
        Self { records: RwLock::new(records) }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Records>> {
        self.records.read().map_err(|_| Error::Storage("task store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Records>> {
        self.records.write().map_err(|_| Error::Storage("task store lock poisoned".into()))
    }
}

impl Records {
    fn push(&mut self, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, task.id);
        self.tasks.insert(task.id, (seq, task));
    }
}

impl TaskStore for InMemoryTaskStore {
    fn insert(&self, task: Task) -> Result<Task> {
        task.validate()?;
        let mut records = self.write()?;
        if records.tasks.contains_key(&task.id) {
            return Err(Error::Conflict(task.id));
        }
        records.push(task.clone());
        Ok(task)
    }

    fn get_by_id(&self, id: Uuid) -> Result<Option<Task>> {
        let records = self.read()?;
        Ok(records.tasks.get(&id).map(|(_, task)| task.clone()))
    }

    fn query_all(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let records = self.read()?;
        let tasks = records
            .order
            .values()
            .filter_map(|id| records.tasks.get(id))
            .map(|(_, task)| task)
            .filter(|task| filter.matches(task))
            .cloned()
            .collect();
        Ok(tasks)
    }

    fn update(&self, id: Uuid, mut task: Task) -> Result<Task> {
        let mut records = self.write()?;
        let (_, stored) = records.tasks.get_mut(&id).ok_or(Error::NotFound(id))?;
        task.id = stored.id;
        task.created_at = stored.created_at;
        task.validate()?;
        *stored = task.clone();
        Ok(task)
    }

    fn delete(&self, id: Uuid) -> Result<()> {
        let mut records = self.write()?;
        let (seq, _) = records.tasks.remove(&id).ok_or(Error::NotFound(id))?;
        records.order.remove(&seq);
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.read()?.tasks.len())
    }
}
