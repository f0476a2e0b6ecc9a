//! Workspace discovery and layout

use std::path::{Path, PathBuf};
use thiserror::Error;

const WORKSPACE_DIR: &str = ".sprinter";
const DATABASE_FILE: &str = "sprinter.db";
const CONFIG_FILE: &str = "config.yaml";

/// A directory tree tracked by sprinter
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Directory containing `.sprinter/`
    root: PathBuf,
}

impl Workspace {
    /// Find the workspace by walking up from the current directory
    pub fn discover() -> Result<Self, WorkspaceError> {
        let current =
            std::env::current_dir().map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find the workspace by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, WorkspaceError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        loop {
            if current.join(WORKSPACE_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(WorkspaceError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create `.sprinter/` with a commented default config
    ///
    /// The database file itself is created on first open.
    pub fn init(path: &Path) -> Result<Self, WorkspaceError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        let dir = root.join(WORKSPACE_DIR);
        if dir.exists() {
            return Err(WorkspaceError::AlreadyExists(root));
        }

        std::fs::create_dir_all(&dir).map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        std::fs::write(dir.join(CONFIG_FILE), Self::default_config())
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# Sprinter workspace configuration

# Username to act as when --as is not given
# user: ""

# Database file (relative paths resolve against the workspace root)
# database: .sprinter/sprinter.db

# Log filter used when SPRINTER_LOG is unset (error, warn, info, debug, trace)
# log_level: warn

# How long a writer waits for the database lock, in milliseconds
# busy_timeout_ms: 5000
"#
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `.sprinter/` directory
    pub fn dir(&self) -> PathBuf {
        self.root.join(WORKSPACE_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir().join(CONFIG_FILE)
    }

    /// Default database location
    pub fn database_path(&self) -> PathBuf {
        self.dir().join(DATABASE_FILE)
    }

    /// Resolve a configured path against the workspace root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("not a sprinter workspace (searched from {searched_from:?}). Run 'sprinter init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("sprinter workspace already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();

        assert!(ws.dir().is_dir());
        assert!(ws.config_path().exists());
        assert_eq!(ws.database_path(), ws.dir().join("sprinter.db"));
        // Database is created lazily
        assert!(!ws.database_path().exists());
    }

    #[test]
    fn test_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path()).unwrap();

        let err = Workspace::init(tmp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::AlreadyExists(_)));
    }

    #[test]
    fn test_discover_from_nested_dir() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let ws = Workspace::discover_from(&subdir).unwrap();
        assert_eq!(
            ws.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_discover_fails_without_workspace() {
        let tmp = tempdir().unwrap();
        let err = Workspace::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::NotFound { .. }));
    }

    #[test]
    fn test_resolve_relative_paths() {
        let tmp = tempdir().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();
        assert_eq!(
            ws.resolve(Path::new("data/db.sqlite")),
            ws.root().join("data/db.sqlite")
        );
        let abs = tmp.path().join("abs.db");
        assert_eq!(ws.resolve(&abs), abs);
    }
}
