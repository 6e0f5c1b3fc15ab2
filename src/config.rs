//! Server configuration.
//!
//! Settings are layered: built-in defaults, then an optional YAML file, then
//! `TASK_BOARD_*` environment variables. Command-line flags are applied last
//! by the binary.

use crate::error::{Error, Result};
use crate::paths;
use crate::tasks::{InMemoryTaskStore, SqliteTaskStore, TaskStore};
use crate::traits::{Clock, SystemClock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Environment variable overriding the bind host.
pub const ENV_HOST: &str = "TASK_BOARD_HOST";
/// Environment variable overriding the bind port.
pub const ENV_PORT: &str = "TASK_BOARD_PORT";
/// Environment variable selecting the store backend.
pub const ENV_STORE: &str = "TASK_BOARD_STORE";
/// Environment variable overriding the database path.
pub const ENV_DATABASE: &str = "TASK_BOARD_DATABASE";
/// Environment variable overriding the templates directory.
pub const ENV_TEMPLATES: &str = "TASK_BOARD_TEMPLATES";
/// Environment variable enabling sample tasks in the memory store.
pub const ENV_SEED: &str = "TASK_BOARD_SEED";

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "task_board=info,tower_http=info";

/// Log filter for one-shot CLI commands when `RUST_LOG` is unset. Their
/// stderr carries error output, so routine events stay quiet.
pub const COMMAND_LOG_FILTER: &str = "warn";

/// Which task store backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Tasks live in process memory and vanish on exit.
    #[default]
    Memory,
    /// Tasks persist in a `SQLite` file.
    Sqlite,
}

impl StoreBackend {
    /// Get the string representation of the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(Error::validation(format!(
                "invalid store: '{s}' (must be one of: memory, sqlite)"
            ))),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Store backend.
    pub store: StoreBackend,
    /// `SQLite` database path. `None` means the platform default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
    /// Directory of template overrides. `None` means `./templates`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<PathBuf>,
    /// Start the memory store with two sample tasks.
    pub seed_sample_tasks: bool,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            store: StoreBackend::Memory,
            database: None,
            templates_dir: None,
            seed_sample_tasks: false,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration: defaults, then `file` if given, then the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or an
    /// environment variable holds an invalid value.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::load_from(path)?,
            None => Self::default(),
        };
        config.apply_env_from(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a YAML file. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Apply `TASK_BOARD_*` overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a variable holds an invalid value.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup(ENV_HOST) {
            self.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| Error::validation(format!("invalid {ENV_PORT}: '{port}'")))?;
        }
        if let Some(store) = lookup(ENV_STORE) {
            self.store = store.parse()?;
        }
        if let Some(database) = lookup(ENV_DATABASE) {
            self.database = Some(PathBuf::from(database));
        }
        if let Some(templates) = lookup(ENV_TEMPLATES) {
            self.templates_dir = Some(PathBuf::from(templates));
        }
        if let Some(seed) = lookup(ENV_SEED) {
            self.seed_sample_tasks = parse_flag(&seed)
                .ok_or_else(|| Error::validation(format!("invalid {ENV_SEED}: '{seed}'")))?;
        }
        Ok(())
    }

    /// Resolve the address to bind.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the host does not resolve.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        if let Ok(ip) = self.host.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, self.port));
        }
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| {
                Error::validation(format!("invalid server address: {}:{}", self.host, self.port))
            })
    }

    /// The database path, falling back to the platform default.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is configured and the platform data
    /// directory cannot be determined.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database {
            Some(path) => Ok(path.clone()),
            None => paths::default_database_path()
                .ok_or_else(|| Error::Storage("cannot determine the data directory".into())),
        }
    }

    /// Open the configured store.
    ///
    /// # Errors
    ///
    /// Returns an error if the `SQLite` database cannot be opened.
    pub fn open_store(&self) -> Result<Arc<dyn TaskStore>> {
        match self.store {
            StoreBackend::Memory if self.seed_sample_tasks => {
                Ok(Arc::new(InMemoryTaskStore::with_sample_tasks(SystemClock.now())))
            }
            StoreBackend::Memory => Ok(Arc::new(InMemoryTaskStore::new())),
            StoreBackend::Sqlite => {
                let path = self.database_path()?;
                tracing::info!(path = %path.display(), "opening task database");
                Ok(Arc::new(SqliteTaskStore::new(path)?))
            }
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
