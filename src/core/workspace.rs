//! Workspace discovery and layout
//!
//! A workspace is any directory containing `.sitedesk/`. Records live under
//! it in whichever backend the workspace was initialized with: JSON blobs
//! in `data/` for local storage, or `sitedesk.db` for SQLite. Uploaded file
//! contents go to `files/` either way.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::config::Storage;
use crate::storage::{Backend, FileStore, LocalStore, SqliteStore, StorageError};

/// A discovered sitedesk workspace
#[derive(Debug)]
pub struct Workspace {
    /// Root directory (parent of .sitedesk/)
    root: PathBuf,
}

impl Workspace {
    /// Find the workspace root by walking up from the current directory
    pub fn discover() -> Result<Self, WorkspaceError> {
        let current = std::env::current_dir().map_err(|e| WorkspaceError::Io(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find the workspace root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, WorkspaceError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| WorkspaceError::Io(e.to_string()))?;

        loop {
            if current.join(".sitedesk").is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(WorkspaceError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new workspace at the given path with the chosen backend
    pub fn init(path: &Path, storage: Storage) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let sitedesk_dir = root.join(".sitedesk");
        if sitedesk_dir.exists() {
            return Err(WorkspaceError::AlreadyExists(root.clone()));
        }

        std::fs::create_dir_all(sitedesk_dir.join("files"))
            .map_err(|e| WorkspaceError::Io(e.to_string()))?;
        if storage == Storage::Local {
            std::fs::create_dir_all(sitedesk_dir.join("data"))
                .map_err(|e| WorkspaceError::Io(e.to_string()))?;
        }

        let config_path = sitedesk_dir.join("config.yml");
        std::fs::write(&config_path, default_config(storage))
            .map_err(|e| WorkspaceError::Io(e.to_string()))?;

        Ok(Self { root })
    }

    /// Get the workspace root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .sitedesk directory
    pub fn sitedesk_dir(&self) -> PathBuf {
        self.root.join(".sitedesk")
    }

    /// Get the workspace config file path
    pub fn config_path(&self) -> PathBuf {
        self.sitedesk_dir().join("config.yml")
    }

    /// Blob directory used by the local backend
    pub fn data_dir(&self) -> PathBuf {
        self.sitedesk_dir().join("data")
    }

    /// Database path used by the SQLite backend
    pub fn db_path(&self) -> PathBuf {
        self.sitedesk_dir().join("sitedesk.db")
    }

    /// Content-addressed file blob directory
    pub fn files_dir(&self) -> PathBuf {
        self.sitedesk_dir().join("files")
    }

    /// Open the record backend for this workspace
    pub fn open_backend(&self, storage: Storage) -> Result<Box<dyn Backend>, StorageError> {
        match storage {
            Storage::Local => Ok(Box::new(LocalStore::open(self.data_dir())?)),
            Storage::Sqlite => Ok(Box::new(SqliteStore::open(self.db_path())?)),
        }
    }

    /// Open the uploaded-file store for this workspace
    pub fn file_store(&self) -> Result<FileStore, StorageError> {
        FileStore::open(self.files_dir())
    }
}

fn default_config(storage: Storage) -> String {
    format!(
        r#"# sitedesk workspace configuration

# Record storage backend: local (JSON blobs) or sqlite
storage: {}

# Account id recorded as the actor on mutations (default: $USER)
# user: ""

# Project used when --project is not given
# default_project: ""

# Default output format (auto, yaml, json, csv, id)
# default_format: auto
"#,
        storage
    )
}

/// Errors that can occur during workspace operations
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("not a sitedesk workspace (searched from {searched_from:?}). Run 'sitedesk init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("sitedesk workspace already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    Io(String),
}
