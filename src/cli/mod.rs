//! Command-line interface for task-board.
//!
//! `serve` runs the HTTP server; the task commands operate directly on the
//! `SQLite` database.

mod run;

#[cfg(test)]
mod tests;

pub use run::{check_templates, open_service, run, CliOutput};

use crate::config::{ServerConfig, StoreBackend};
use crate::error::Result;
use crate::tasks::TaskView;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Task board - a small task tracker with a JSON API and an HTML board.
///
/// Run without a subcommand to start the server with default settings.
#[derive(Parser, Debug)]
#[command(name = "task-board")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server.
    Serve(ServeArgs),

    /// Render every board template with sample data and report failures.
    CheckTemplates(CheckTemplatesArgs),

    /// Task commands against the `SQLite` database.
    #[command(flatten)]
    Task(TaskCommand),
}

impl Default for Command {
    fn default() -> Self {
        Self::Serve(ServeArgs::default())
    }
}

/// Options for `serve`.
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// YAML configuration file.
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Interface to bind.
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind.
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Store backend (memory or sqlite).
    #[arg(long)]
    pub store: Option<StoreBackend>,

    /// `SQLite` database path.
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Directory of template overrides.
    #[arg(long)]
    pub templates: Option<PathBuf>,

    /// Start the memory store with two sample tasks.
    #[arg(long)]
    pub seed: bool,
}

impl ServeArgs {
    /// Resolve the server configuration: file, environment, then flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file or environment is invalid.
    pub fn load_config(&self) -> Result<ServerConfig> {
        let mut config = ServerConfig::load(self.config.as_deref())?;
        self.apply_to(&mut config);
        Ok(config)
    }

    /// Override `config` with the flags that were given.
    pub fn apply_to(&self, config: &mut ServerConfig) {
        if let Some(host) = &self.host {
            config.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(store) = self.store {
            config.store = store;
        }
        if let Some(database) = &self.database {
            config.database = Some(database.clone());
        }
        if let Some(templates) = &self.templates {
            config.templates_dir = Some(templates.clone());
        }
        if self.seed {
            config.seed_sample_tasks = true;
        }
    }
}

/// Options for `check-templates`.
#[derive(Args, Debug, Clone, Default)]
pub struct CheckTemplatesArgs {
    /// Directory of template overrides (defaults to `./templates`).
    #[arg(long)]
    pub templates: Option<PathBuf>,
}

/// Where the task commands find their database.
#[derive(Args, Debug, Clone, Default)]
pub struct DatabaseArgs {
    /// `SQLite` database path (defaults to the platform data directory).
    #[arg(long)]
    pub database: Option<PathBuf>,
}

/// Commands that read or change tasks.
#[derive(Subcommand, Debug, Clone)]
pub enum TaskCommand {
    /// List tasks in a view, one JSON object per line.
    List {
        /// View to list (all, active, completed, archived, overdue).
        #[arg(long, short, default_value = "active")]
        filter: TaskView,

        /// Database location.
        #[command(flatten)]
        db: DatabaseArgs,
    },

    /// Create a task.
    Add {
        /// Task title.
        title: String,

        /// Due date (RFC 3339 or `YYYY-MM-DDTHH:MM`, read as UTC).
        #[arg(long)]
        due: Option<String>,

        /// Database location.
        #[command(flatten)]
        db: DatabaseArgs,
    },

    /// Toggle a task's completion.
    Complete {
        /// Task ID.
        id: String,

        /// Database location.
        #[command(flatten)]
        db: DatabaseArgs,
    },

    /// Archive a task.
    Archive {
        /// Task ID.
        id: String,

        /// Database location.
        #[command(flatten)]
        db: DatabaseArgs,
    },

    /// Restore an archived task.
    Unarchive {
        /// Task ID.
        id: String,

        /// Database location.
        #[command(flatten)]
        db: DatabaseArgs,
    },

    /// Delete a task permanently.
    Delete {
        /// Task ID.
        id: String,

        /// Database location.
        #[command(flatten)]
        db: DatabaseArgs,
    },
}

impl TaskCommand {
    /// The database options given to this command.
    #[must_use]
    pub const fn database_args(&self) -> &DatabaseArgs {
        match self {
            Self::List { db, .. }
            | Self::Add { db, .. }
            | Self::Complete { db, .. }
            | Self::Archive { db, .. }
            | Self::Unarchive { db, .. }
            | Self::Delete { db, .. } => db,
        }
    }
}
