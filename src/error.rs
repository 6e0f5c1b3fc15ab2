//! Error types for `task_board`.

use uuid::Uuid;

/// Errors that can occur while storing, querying or presenting tasks.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input was malformed (empty title, unparseable id, date or body).
    #[error("Validation error: {0}")]
    Validation(String),

    /// An operation referenced a task that does not exist.
    #[error("Task not found: {0}")]
    NotFound(Uuid),

    /// A task with this id is already stored.
    #[error("Task already exists: {0}")]
    Conflict(Uuid),

    /// A `SQLite` database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The store could not complete an operation for a non-database reason.
    #[error("Storage error: {0}")]
    Storage(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON encoding or decoding error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error occurred.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A template error occurred.
    #[error("Template error: {0}")]
    Template(String),
}

/// Coarse classification of an [`Error`], used by callers that map errors
/// to transport-level outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input.
    Validation,
    /// Referenced task is absent.
    NotFound,
    /// Duplicate id on insert.
    Conflict,
    /// Anything the caller cannot fix: storage, I/O, templates.
    Storage,
}

impl Error {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Database(_)
            | Self::Storage(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Yaml(_)
            | Self::Template(_) => ErrorKind::Storage,
        }
    }

    /// Build a validation error from any message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let id = Uuid::nil();
        assert_eq!(Error::validation("bad").kind(), ErrorKind::Validation);
        assert_eq!(Error::NotFound(id).kind(), ErrorKind::NotFound);
        assert_eq!(Error::Conflict(id).kind(), ErrorKind::Conflict);
        assert_eq!(Error::Storage("lock".into()).kind(), ErrorKind::Storage);
        assert_eq!(Error::Template("oops".into()).kind(), ErrorKind::Storage);
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        assert_eq!(Error::from(io).kind(), ErrorKind::Storage);
    }

    #[test]
    fn test_not_found_message_names_the_id() {
        let id = Uuid::new_v4();
        assert_eq!(Error::NotFound(id).to_string(), format!("Task not found: {id}"));
    }
}
