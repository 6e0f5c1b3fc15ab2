//! Task store trait and `SQLite` implementation.

use crate::error::{Error, Result};
use crate::tasks::models::{Task, TaskView};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Trait for task storage operations.
///
/// Every method is atomic with respect to a single record: a reader never
/// observes a partially written task.
#[allow(clippy::missing_errors_doc)]
pub trait TaskStore: Send + Sync {
    /// Persist a new task. Fails with [`Error::Conflict`] if the id exists.
    fn insert(&self, task: Task) -> Result<Task>;

    /// Get a task by ID. Absence is `Ok(None)`, not an error.
    fn get_by_id(&self, id: Uuid) -> Result<Option<Task>>;

    /// All tasks matching `filter`, in insertion order.
    fn query_all(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    /// Replace the stored record. Fails with [`Error::NotFound`] if absent.
    ///
    /// The stored `id` and `created_at` are kept whatever `task` carries.
    fn update(&self, id: Uuid, task: Task) -> Result<Task>;

    /// Remove a task permanently. Fails with [`Error::NotFound`] if absent.
    fn delete(&self, id: Uuid) -> Result<()>;

    /// Number of stored tasks.
    fn len(&self) -> Result<usize>;

    /// Whether the store holds no tasks.
    fn is_empty(&self) -> Result<bool> {
        self.len().map(|n| n == 0)
    }
}

/// Filter options for querying tasks.
///
/// A declarative predicate: unset fields match everything. The in-memory
/// store evaluates [`TaskFilter::matches`]; the `SQLite` store turns the same
/// fields into a `WHERE` clause.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskFilter {
    /// Match on the completion flag.
    pub completed: Option<bool>,
    /// Match on the archive flag.
    pub archived: Option<bool>,
    /// Only tasks with a due date strictly before this instant.
    pub due_before: Option<DateTime<Utc>>,
}

impl TaskFilter {
    /// A filter that matches every task.
    #[must_use]
    pub const fn all() -> Self {
        Self { completed: None, archived: None, due_before: None }
    }

    /// The filter backing a named view, evaluated at `now`.
    #[must_use]
    pub fn for_view(view: TaskView, now: DateTime<Utc>) -> Self {
        match view {
            TaskView::All => Self::all(),
            TaskView::Active => Self { archived: Some(false), ..Self::all() },
            TaskView::Completed => Self { completed: Some(true), archived: Some(false), ..Self::all() },
            TaskView::Archived => Self { archived: Some(true), ..Self::all() },
            TaskView::Overdue => {
                Self { completed: Some(false), archived: Some(false), due_before: Some(now) }
            }
        }
    }

    /// Evaluate the filter against a task.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.completed.map_or(true, |c| task.is_completed == c)
            && self.archived.map_or(true, |a| task.is_archived == a)
            && self.due_before.map_or(true, |limit| task.due_date.is_some_and(|due| due < limit))
    }
}

/// Columns of the `tasks` table, in [`task_from_row`] order.
const TASK_COLUMNS: &str =
    "id, title, is_completed, is_archived, created_at, due_date, completed_at";

/// Encode a timestamp for storage.
///
/// Fixed-width RFC 3339 in UTC with microseconds, so string order in the
/// database equals chronological order.
#[must_use]
pub fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Decode a stored timestamp.
///
/// # Errors
///
/// Returns an error if the text is not RFC 3339.
pub fn decode_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|ts| ts.with_timezone(&Utc))
}

/// Map a failed write, reporting a violated CHECK constraint as invalid input.
fn write_error(err: rusqlite::Error) -> Error {
    match err {
        rusqlite::Error::SqliteFailure(code, message)
            if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_CHECK =>
        {
            Error::validation(message.unwrap_or_else(|| "constraint failed".into()))
        }
        other => Error::Database(other),
    }
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn timestamp_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    decode_timestamp(&raw).map_err(|e| conversion_error(idx, e))
}

fn optional_timestamp_column(
    row: &rusqlite::Row,
    idx: usize,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|value| decode_timestamp(&value).map_err(|e| conversion_error(idx, e))).transpose()
}

/// Parse a task from a row selected with `TASK_COLUMNS`.
fn task_from_row(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    let id: String = row.get(0)?;
    Ok(Task {
        id: Uuid::parse_str(&id).map_err(|e| conversion_error(0, e))?,
        title: row.get(1)?,
        is_completed: row.get(2)?,
        is_archived: row.get(3)?,
        created_at: timestamp_column(row, 4)?,
        due_date: optional_timestamp_column(row, 5)?,
        completed_at: optional_timestamp_column(row, 6)?,
    })
}

/// SQLite-based task store.
///
/// Each operation opens a new connection to the database file, so the store
/// is freely shareable between threads.
#[derive(Debug, Clone)]
pub struct SqliteTaskStore {
    db_path: PathBuf,
}

impl SqliteTaskStore {
    /// Create a new `SQLite` task store at the given database path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let store = Self { db_path: db_path.as_ref().to_path_buf() };
        store.init_schema()?;
        tracing::debug!(path = %store.db_path.display(), "SQLite task store ready");
        Ok(store)
    }

    /// Get the database path.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Open a connection to the database.
    fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Ok(conn)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL CHECK (length(trim(title)) > 0),
                is_completed INTEGER NOT NULL DEFAULT 0,
                is_archived INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                due_date TEXT,
                completed_at TEXT,
                CHECK ((is_completed = 0) = (completed_at IS NULL))
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_is_archived ON tasks(is_archived);
            CREATE INDEX IF NOT EXISTS idx_tasks_is_completed ON tasks(is_completed);
            ",
        )?;

        Ok(())
    }

    fn select_task(conn: &Connection, id: Uuid) -> Result<Option<Task>> {
        let task = conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id.to_string()],
                task_from_row,
            )
            .optional()?;
        Ok(task)
    }
}

impl TaskStore for SqliteTaskStore {
    fn insert(&self, task: Task) -> Result<Task> {
        task.validate()?;
        let conn = self.open()?;

        let rows = conn.execute(
            "INSERT INTO tasks (id, title, is_completed, is_archived, created_at, due_date, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO NOTHING",
            params![
                task.id.to_string(),
                task.title,
                task.is_completed,
                task.is_archived,
                encode_timestamp(task.created_at),
                task.due_date.map(encode_timestamp),
                task.completed_at.map(encode_timestamp),
            ],
        )
        .map_err(write_error)?;
        if rows == 0 {
            return Err(Error::Conflict(task.id));
        }

        Self::select_task(&conn, task.id)?.ok_or(Error::NotFound(task.id))
    }

    fn get_by_id(&self, id: Uuid) -> Result<Option<Task>> {
        let conn = self.open()?;
        Self::select_task(&conn, id)
    }

    fn query_all(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let conn = self.open()?;

        let mut conditions = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(completed) = filter.completed {
            conditions.push("is_completed = ?");
            params_vec.push(Box::new(completed));
        }

        if let Some(archived) = filter.archived {
            conditions.push("is_archived = ?");
            params_vec.push(Box::new(archived));
        }

        if let Some(limit) = filter.due_before {
            conditions.push("due_date IS NOT NULL AND due_date < ?");
            params_vec.push(Box::new(encode_timestamp(limit)));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks {where_clause} ORDER BY rowid ASC");

        let params: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(AsRef::as_ref).collect();
        let mut stmt = conn.prepare(&sql)?;
        let tasks = stmt
            .query_map(params.as_slice(), task_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(tasks)
    }

    fn update(&self, id: Uuid, task: Task) -> Result<Task> {
        task.validate()?;
        let conn = self.open()?;

        let rows = conn.execute(
            "UPDATE tasks
             SET title = ?2, is_completed = ?3, is_archived = ?4, due_date = ?5, completed_at = ?6
             WHERE id = ?1",
            params![
                id.to_string(),
                task.title,
                task.is_completed,
                task.is_archived,
                task.due_date.map(encode_timestamp),
                task.completed_at.map(encode_timestamp),
            ],
        )
        .map_err(write_error)?;
        if rows == 0 {
            return Err(Error::NotFound(id));
        }

        Self::select_task(&conn, id)?.ok_or(Error::NotFound(id))
    }

    fn delete(&self, id: Uuid) -> Result<()> {
        let conn = self.open()?;
        let rows = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id.to_string()])?;
        if rows == 0 {
            return Err(Error::NotFound(id));
        }
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        let conn = self.open()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}
