//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::core::workspace::Workspace;

/// Which backend a workspace keeps its records in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Storage {
    /// JSON blob per collection under .sitedesk/data/
    Local,
    /// Relational tables in .sitedesk/sitedesk.db
    Sqlite,
}

impl Default for Storage {
    fn default() -> Self {
        Storage::Local
    }
}

impl std::fmt::Display for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Storage::Local => write!(f, "local"),
            Storage::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for Storage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Storage::Local),
            "sqlite" => Ok(Storage::Sqlite),
            _ => Err(format!("invalid storage: '{}' (valid: local, sqlite)", s)),
        }
    }
}

/// sitedesk configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Account id recorded as the actor on mutations
    pub user: Option<String>,

    /// Record storage backend for the workspace
    pub storage: Option<Storage>,

    /// Project used when --project is not given
    pub default_project: Option<String>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(workspace: Option<&Workspace>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/sitedesk/config.yml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                if let Ok(contents) = std::fs::read_to_string(&global_path) {
                    if let Ok(global) = serde_yml::from_str::<Config>(&contents) {
                        config.merge(global);
                    }
                }
            }
        }

        // 3. Workspace config (.sitedesk/config.yml)
        if let Some(ws) = workspace {
            let ws_config_path = ws.config_path();
            if ws_config_path.exists() {
                if let Ok(contents) = std::fs::read_to_string(&ws_config_path) {
                    if let Ok(ws_config) = serde_yml::from_str::<Config>(&contents) {
                        config.merge(ws_config);
                    }
                }
            }
        }

        // 4. Environment variables
        if let Ok(user) = std::env::var("SITEDESK_USER") {
            config.user = Some(user);
        }
        if let Ok(project) = std::env::var("SITEDESK_PROJECT") {
            config.default_project = Some(project);
        }

        config
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "sitedesk")
            .map(|dirs| dirs.config_dir().join("config.yml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.user.is_some() {
            self.user = other.user;
        }
        if other.storage.is_some() {
            self.storage = other.storage;
        }
        if other.default_project.is_some() {
            self.default_project = other.default_project;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Get the acting user id, falling back to the login name
    pub fn user(&self) -> String {
        if let Some(ref user) = self.user {
            return user.clone();
        }

        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }

    /// Get the storage backend, defaulting to local blobs
    pub fn storage(&self) -> Storage {
        self.storage.unwrap_or_default()
    }
}
