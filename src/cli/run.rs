//! Command execution for the CLI.
//!
//! Task commands produce a [`CliOutput`] instead of printing, so they can be
//! tested against any [`TaskService`].

use crate::cli::{DatabaseArgs, TaskCommand};
use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::tasks::{parse_task_id, parse_timestamp, NewTask, SqliteTaskStore, Task, TaskService};
use crate::templates;
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

/// Output from running the CLI, with separate stdout and stderr messages.
#[derive(Debug)]
pub struct CliOutput {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Messages to print to stdout.
    pub stdout: Vec<String>,
    /// Messages to print to stderr.
    pub stderr: Vec<String>,
}

/// Open a service over the `SQLite` database the command points at.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the database cannot
/// be opened.
pub fn open_service(db: &DatabaseArgs) -> Result<TaskService> {
    let mut config = ServerConfig::load(None)?;
    if let Some(path) = &db.database {
        config.database = Some(path.clone());
    }
    let store = SqliteTaskStore::new(config.database_path()?)?;
    Ok(TaskService::new(Arc::new(store)))
}

/// Run a task command against `service`.
pub fn run(command: TaskCommand, service: &TaskService) -> CliOutput {
    let result = match command {
        TaskCommand::List { filter, .. } => service.find(filter).and_then(|tasks| json_lines(&tasks)),
        TaskCommand::Add { title, due, .. } => add(service, &title, due.as_deref()),
        TaskCommand::Complete { id, .. } => {
            with_id(&id, |id| service.toggle_complete(id)).and_then(|task| json_line(&task))
        }
        TaskCommand::Archive { id, .. } => {
            with_id(&id, |id| service.archive(id)).and_then(|task| json_line(&task))
        }
        TaskCommand::Unarchive { id, .. } => {
            with_id(&id, |id| service.unarchive(id)).and_then(|task| json_line(&task))
        }
        TaskCommand::Delete { id, .. } => {
            with_id(&id, |id| service.delete(id)).map(|()| vec![format!("Task deleted: {id}")])
        }
    };

    match result {
        Ok(stdout) => CliOutput { exit_code: ExitCode::SUCCESS, stdout, stderr: vec![] },
        Err(e) => error_output(e.to_string()),
    }
}

/// Check that every template renders, using overrides from `templates_dir`.
pub fn check_templates(templates_dir: Option<&Path>) -> CliOutput {
    match templates::verify_all_templates(templates_dir) {
        Ok(()) => {
            let mut names = templates::embedded_template_names();
            names.sort_unstable();
            CliOutput {
                exit_code: ExitCode::SUCCESS,
                stdout: names.into_iter().map(|name| format!("ok: {name}")).collect(),
                stderr: vec![],
            }
        }
        Err(e) => error_output(e.to_string()),
    }
}

fn add(service: &TaskService, title: &str, due: Option<&str>) -> Result<Vec<String>> {
    let due_date = match due {
        Some(raw) => parse_timestamp(raw)?,
        None => None,
    };
    let task = service.create(NewTask::new(title, due_date)?)?;
    json_line(&task)
}

fn with_id<T>(raw: &str, op: impl FnOnce(uuid::Uuid) -> Result<T>) -> Result<T> {
    op(parse_task_id(raw)?)
}

fn json_line<T: Serialize>(value: &T) -> Result<Vec<String>> {
    Ok(vec![serde_json::to_string(value)?])
}

fn json_lines(tasks: &[Task]) -> Result<Vec<String>> {
    tasks.iter().map(|task| serde_json::to_string(task).map_err(Error::from)).collect()
}

fn error_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::from(1), stdout: vec![], stderr: vec![message] }
}
