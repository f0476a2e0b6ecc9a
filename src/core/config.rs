//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::store::DEFAULT_BUSY_TIMEOUT;
use crate::core::workspace::Workspace;

/// Sprinter configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Username to act as when `--as` is not given
    pub user: Option<String>,

    /// Database file; relative paths resolve against the workspace root
    pub database: Option<PathBuf>,

    /// Log filter used when `SPRINTER_LOG` is unset
    pub log_level: Option<String>,

    /// Milliseconds a writer waits for the database lock
    pub busy_timeout_ms: Option<u64>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(workspace: Option<&Workspace>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/sprinter/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Workspace config (.sprinter/config.yaml)
        if let Some(ws) = workspace {
            if let Some(local) = Self::read_file(&ws.config_path()) {
                config.merge(local);
            }
        }

        // 4. Environment variables
        config.apply_env(|name| std::env::var(name).ok());

        config
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "sprinter")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Parse a config file; missing or malformed files are skipped
    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        let blank = contents
            .lines()
            .map(str::trim)
            .all(|l| l.is_empty() || l.starts_with('#'));
        if blank {
            return None;
        }
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config");
                None
            }
        }
    }

    /// Apply `SPRINTER_*` overrides from an environment lookup
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(user) = lookup("SPRINTER_USER").filter(|v| !v.is_empty()) {
            self.user = Some(user);
        }
        if let Some(db) = lookup("SPRINTER_DB").filter(|v| !v.is_empty()) {
            self.database = Some(PathBuf::from(db));
        }
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.user.is_some() {
            self.user = other.user;
        }
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
        if other.busy_timeout_ms.is_some() {
            self.busy_timeout_ms = other.busy_timeout_ms;
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        self.busy_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_BUSY_TIMEOUT)
    }

    /// Database to open for a workspace
    pub fn database_path(&self, workspace: &Workspace) -> PathBuf {
        match &self.database {
            Some(path) => workspace.resolve(path),
            None => workspace.database_path(),
        }
    }

    /// Log filter directive, `warn` unless configured
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("warn")
    }
}
