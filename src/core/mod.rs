//! Core module - record store, workspace, and supporting machinery

pub mod config;
pub mod identity;
pub mod sequence;
pub mod store;
pub mod tree;
pub mod workspace;

pub use config::{Config, Storage};
pub use identity::{IdParseError, RecordId};
pub use store::{Store, StoreError, ACTIVITY_CAP};
pub use workspace::{Workspace, WorkspaceError};
