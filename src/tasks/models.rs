//! Task model types for the task board.

use crate::error::{Error, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use uuid::Uuid;

/// A task on the board.
///
/// Serialized with camelCase field names; timestamps are RFC 3339 strings
/// and the id is the hyphenated UUID form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, generated at creation and never reused.
    pub id: Uuid,
    /// Short title describing the task. Never empty.
    pub title: String,
    /// Whether the task has been completed.
    pub is_completed: bool,
    /// Whether the task has been archived (soft-deleted).
    pub is_archived: bool,
    /// When the task was created. Never changes.
    pub created_at: DateTime<Utc>,
    /// Optional deadline.
    pub due_date: Option<DateTime<Utc>>,
    /// When the task was last completed; `Some` exactly when `is_completed`.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a fresh, active, incomplete task.
    pub fn new(
        id: Uuid,
        title: impl Into<String>,
        due_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            is_completed: false,
            is_archived: false,
            created_at: now,
            due_date,
            completed_at: None,
        }
    }

    /// Set the completion flag, keeping `completed_at` in step with it.
    ///
    /// Marking an already-completed task complete keeps its original
    /// `completed_at`.
    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        if completed {
            if !self.is_completed || self.completed_at.is_none() {
                self.completed_at = Some(now);
            }
        } else {
            self.completed_at = None;
        }
        self.is_completed = completed;
    }

    /// Check the record invariants every store enforces before writing.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the title is blank, if `completed_at`
    /// disagrees with `is_completed`, or if a timestamp falls outside the
    /// storable years.
    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)?;
        if self.is_completed != self.completed_at.is_some() {
            return Err(Error::validation(
                "completedAt must be set exactly when the task is completed",
            ));
        }
        for ts in [Some(self.created_at), self.due_date, self.completed_at].into_iter().flatten() {
            check_storable(ts)?;
        }
        Ok(())
    }

    /// Whether this task is active, incomplete and past its due date.
    #[must_use]
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed && !self.is_archived && self.due_date.is_some_and(|due| due < now)
    }
}

/// Validated input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Title, trimmed of surrounding whitespace.
    pub title: String,
    /// Optional deadline.
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    /// Build a new-task request.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the title is empty or whitespace.
    pub fn new(title: &str, due_date: Option<DateTime<Utc>>) -> Result<Self> {
        Ok(Self { title: validate_title(title)?, due_date })
    }
}

/// Full replacement of a task's mutable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    /// New title.
    pub title: String,
    /// New completion flag.
    pub is_completed: bool,
    /// New archive flag.
    pub is_archived: bool,
    /// New deadline.
    pub due_date: Option<DateTime<Utc>>,
    /// Requested completion time. Only honoured when `is_completed` is true.
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskUpdate {
    /// Check the update before it touches the store.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the title is empty or whitespace.
    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title).map(drop)
    }

    /// Overwrite the mutable fields of `task`.
    ///
    /// `completed_at` follows the completion flag: cleared when incomplete;
    /// when complete it takes the requested value, else keeps the existing
    /// value, else becomes `now`.
    pub fn apply_to(&self, task: &mut Task, now: DateTime<Utc>) {
        task.title = self.title.trim().to_string();
        task.is_archived = self.is_archived;
        task.due_date = self.due_date;
        task.set_completed(self.is_completed, now);
        if self.is_completed {
            if let Some(at) = self.completed_at {
                task.completed_at = Some(at);
            }
        }
    }
}

/// Trim a title and reject it if nothing is left.
///
/// # Errors
///
/// Returns a validation error if the title is empty or whitespace.
pub fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("title is required"));
    }
    Ok(trimmed.to_string())
}

/// Years a timestamp may fall in. Stored timestamps are fixed-width text,
/// so a signed or five-digit year cannot be written.
const STORABLE_YEARS: RangeInclusive<i32> = 0..=9999;

fn check_storable(ts: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if STORABLE_YEARS.contains(&ts.year()) {
        Ok(ts)
    } else {
        Err(Error::validation(format!("invalid date: year {} is out of range", ts.year())))
    }
}

/// Parse a task id from its string form.
///
/// # Errors
///
/// Returns a validation error if the string is not a UUID.
pub fn parse_task_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::validation(format!("invalid task id: '{raw}'")))
}

/// Parse a user-supplied timestamp.
///
/// Accepts RFC 3339 (`2025-12-31T13:01:00Z`), the HTML `datetime-local`
/// forms `2025-12-31T13:01` and `2025-12-31T13:01:30`, and a bare date
/// (`2025-12-31`, midnight). Forms without an offset are read as UTC. An
/// empty string means "no timestamp".
///
/// # Errors
///
/// Returns a validation error if the string matches none of the formats, or
/// if the instant in UTC falls outside years 0000 to 9999.
pub fn parse_timestamp(raw: &str) -> Result<Option<DateTime<Utc>>> {
    parse_any_timestamp(raw)?.map(check_storable).transpose()
}

fn parse_any_timestamp(raw: &str) -> Result<Option<DateTime<Utc>>> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(parsed.with_timezone(&Utc).trunc_subsecs(6)));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Some(naive.and_utc().trunc_subsecs(6)));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Some(midnight.and_utc()));
        }
    }

    Err(Error::validation(format!("invalid date: '{raw}'")))
}

/// The named views over the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskView {
    /// Every task in any state.
    All,
    /// Tasks that are not archived.
    #[default]
    Active,
    /// Completed tasks that are not archived.
    Completed,
    /// Archived tasks.
    Archived,
    /// Active, incomplete tasks whose due date has passed.
    Overdue,
}

impl TaskView {
    /// Every view, in display order.
    pub const ALL: [Self; 5] =
        [Self::Active, Self::Completed, Self::Overdue, Self::Archived, Self::All];

    /// Get the string representation of the view.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Archived => "archived",
            Self::Overdue => "overdue",
        }
    }
}

impl fmt::Display for TaskView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskView {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "archived" => Ok(Self::Archived),
            "overdue" => Ok(Self::Overdue),
            _ => Err(Error::validation(format!(
                "invalid view: '{s}' (must be one of: all, active, completed, archived, overdue)"
            ))),
        }
    }
}
