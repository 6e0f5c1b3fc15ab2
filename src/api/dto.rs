//! Request bodies accepted by the API.
//!
//! Dates arrive as strings so that the `datetime-local` forms a browser
//! sends are accepted alongside RFC 3339.

use serde::Deserialize;

use crate::error::Result;
use crate::tasks::{parse_timestamp, NewTask, TaskUpdate};

/// Body of `POST /tasks`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// Task title.
    pub title: String,
    /// Optional due date.
    #[serde(default)]
    pub due_date: Option<String>,
}

impl CreateTaskRequest {
    /// Validate into a [`NewTask`].
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty title or unparseable date.
    pub fn into_new_task(self) -> Result<NewTask> {
        let due_date = parse_optional_timestamp(self.due_date.as_deref())?;
        NewTask::new(&self.title, due_date)
    }
}

/// Body of `PUT /tasks/{id}`.
///
/// Fields such as `id` and `createdAt` are ignored, so a client may send
/// back a whole task.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    /// New title.
    pub title: String,
    /// New completion flag.
    #[serde(default)]
    pub is_completed: bool,
    /// New archive flag.
    #[serde(default)]
    pub is_archived: bool,
    /// New due date.
    #[serde(default)]
    pub due_date: Option<String>,
    /// Requested completion time.
    #[serde(default)]
    pub completed_at: Option<String>,
}

impl UpdateTaskRequest {
    /// Validate into a [`TaskUpdate`].
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty title or unparseable date.
    pub fn into_update(self) -> Result<TaskUpdate> {
        let update = TaskUpdate {
            title: self.title,
            is_completed: self.is_completed,
            is_archived: self.is_archived,
            due_date: parse_optional_timestamp(self.due_date.as_deref())?,
            completed_at: parse_optional_timestamp(self.completed_at.as_deref())?,
        };
        update.validate()?;
        Ok(update)
    }
}

/// Form body of `POST /board/tasks`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskForm {
    /// Task title.
    pub title: String,
    /// `datetime-local` value; empty when the field was left blank.
    #[serde(default)]
    pub due_date: Option<String>,
}

impl From<CreateTaskForm> for CreateTaskRequest {
    fn from(form: CreateTaskForm) -> Self {
        Self { title: form.title, due_date: form.due_date }
    }
}

fn parse_optional_timestamp(
    raw: Option<&str>,
) -> Result<Option<chrono::DateTime<chrono::Utc>>> {
    raw.map_or(Ok(None), parse_timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_create_request_parses_datetime_local() {
        let request: CreateTaskRequest =
            serde_json::from_str(r#"{"title": "Pay rent", "dueDate": "2000-01-01T00:00"}"#)
                .unwrap();
        let new = request.into_new_task().unwrap();
        assert_eq!(new.title, "Pay rent");
        assert_eq!(new.due_date, Some(Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_create_request_due_date_optional() {
        let request: CreateTaskRequest = serde_json::from_str(r#"{"title": "Write docs"}"#).unwrap();
        assert!(request.into_new_task().unwrap().due_date.is_none());

        let request: CreateTaskRequest =
            serde_json::from_str(r#"{"title": "Write docs", "dueDate": null}"#).unwrap();
        assert!(request.into_new_task().unwrap().due_date.is_none());

        let request: CreateTaskRequest =
            serde_json::from_str(r#"{"title": "Write docs", "dueDate": ""}"#).unwrap();
        assert!(request.into_new_task().unwrap().due_date.is_none());
    }

    #[test]
    fn test_create_request_rejects_empty_title() {
        let request: CreateTaskRequest = serde_json::from_str(r#"{"title": ""}"#).unwrap();
        assert_eq!(request.into_new_task().unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_create_request_rejects_bad_date() {
        let request: CreateTaskRequest =
            serde_json::from_str(r#"{"title": "x", "dueDate": "next tuesday"}"#).unwrap();
        assert_eq!(request.into_new_task().unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_update_request_accepts_whole_task() {
        let body = r#"{
            "id": "5b0e8c1e-3c57-4a4e-9d1c-2f7f3c1a9b10",
            "title": "Renamed",
            "isCompleted": true,
            "isArchived": false,
            "createdAt": "2024-01-01T09:00:00Z",
            "dueDate": null,
            "completedAt": "2024-01-02T10:00:00Z"
        }"#;
        let request: UpdateTaskRequest = serde_json::from_str(body).unwrap();
        let update = request.into_update().unwrap();
        assert_eq!(update.title, "Renamed");
        assert!(update.is_completed);
        assert!(!update.is_archived);
        assert_eq!(update.completed_at, Some(Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap()));
    }

    #[test]
    fn test_update_request_defaults_flags() {
        let request: UpdateTaskRequest = serde_json::from_str(r#"{"title": "t"}"#).unwrap();
        let update = request.into_update().unwrap();
        assert!(!update.is_completed);
        assert!(!update.is_archived);
        assert!(update.due_date.is_none());
    }

    #[test]
    fn test_update_request_requires_title() {
        assert!(serde_json::from_str::<UpdateTaskRequest>(r#"{"isCompleted": true}"#).is_err());
        let request: UpdateTaskRequest = serde_json::from_str(r#"{"title": "  "}"#).unwrap();
        assert_eq!(request.into_update().unwrap_err().kind(), ErrorKind::Validation);
    }
}
