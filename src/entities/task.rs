//! Task entity type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::identity::RecordId;
use crate::entities::document::Attachment;

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "open")]
    Open,
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "closed")]
    Closed,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Open
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Open => write!(f, "open"),
            TaskStatus::InProgress => write!(f, "in progress"),
            TaskStatus::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(TaskStatus::Open),
            "in progress" | "in-progress" | "inprogress" => Ok(TaskStatus::InProgress),
            "closed" => Ok(TaskStatus::Closed),
            _ => Err(format!(
                "invalid task status: '{}' (valid: open, in progress, closed)",
                s
            )),
        }
    }
}

/// Task category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Administrative,
    Closeout,
    Contract,
    Design,
    Miscellaneous,
    Construction,
}

impl Default for TaskCategory {
    fn default() -> Self {
        TaskCategory::Miscellaneous
    }
}

impl std::fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskCategory::Administrative => write!(f, "administrative"),
            TaskCategory::Closeout => write!(f, "closeout"),
            TaskCategory::Contract => write!(f, "contract"),
            TaskCategory::Design => write!(f, "design"),
            TaskCategory::Miscellaneous => write!(f, "miscellaneous"),
            TaskCategory::Construction => write!(f, "construction"),
        }
    }
}

impl FromStr for TaskCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "administrative" => Ok(TaskCategory::Administrative),
            "closeout" => Ok(TaskCategory::Closeout),
            "contract" => Ok(TaskCategory::Contract),
            "design" => Ok(TaskCategory::Design),
            "miscellaneous" => Ok(TaskCategory::Miscellaneous),
            "construction" => Ok(TaskCategory::Construction),
            _ => Err(format!(
                "invalid category: '{}' (valid: administrative, closeout, contract, design, miscellaneous, construction)",
                s
            )),
        }
    }
}

/// A project task with a per-project display number
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier
    pub id: RecordId,

    /// Project this task belongs to
    pub project_id: RecordId,

    /// Per-project sequential display number, never reused
    pub task_number: u32,

    /// Short title, required
    pub title: String,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub category: TaskCategory,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Directory users to notify
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub distribution_list: Vec<RecordId>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Creation payload for a task
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    /// Explicit display number; assigned from the project sequence when None
    pub number: Option<u32>,
    pub title: String,
    pub status: TaskStatus,
    pub category: TaskCategory,
    pub description: String,
    pub distribution_list: Vec<RecordId>,
    pub attachments: Vec<Attachment>,
}

/// Partial update for a task; the display number is immutable
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub status: Option<TaskStatus>,
    pub category: Option<TaskCategory>,
    pub description: Option<String>,
    pub distribution_list: Option<Vec<RecordId>>,
    pub attachments: Option<Vec<Attachment>>,
}

impl TaskPatch {
    pub fn apply(&self, task: &mut Task) {
        if let Some(v) = &self.title {
            task.title = v.clone();
        }
        if let Some(v) = self.status {
            task.status = v;
        }
        if let Some(v) = self.category {
            task.category = v;
        }
        if let Some(v) = &self.description {
            task.description = v.clone();
        }
        if let Some(v) = &self.distribution_list {
            task.distribution_list = v.clone();
        }
        if let Some(v) = &self.attachments {
            task.attachments = v.clone();
        }
    }
}
