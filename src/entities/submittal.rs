//! Submittal entity type

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::identity::RecordId;

/// Submittal review status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmittalStatus {
    #[serde(rename = "draft")]
    Draft,
    #[serde(rename = "open")]
    Open,
    #[serde(rename = "approved")]
    Approved,
    #[serde(rename = "rejected")]
    Rejected,
    #[serde(rename = "revise and resubmit")]
    ReviseResubmit,
    #[serde(rename = "closed")]
    Closed,
}

impl Default for SubmittalStatus {
    fn default() -> Self {
        SubmittalStatus::Open
    }
}

impl std::fmt::Display for SubmittalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmittalStatus::Draft => write!(f, "draft"),
            SubmittalStatus::Open => write!(f, "open"),
            SubmittalStatus::Approved => write!(f, "approved"),
            SubmittalStatus::Rejected => write!(f, "rejected"),
            SubmittalStatus::ReviseResubmit => write!(f, "revise and resubmit"),
            SubmittalStatus::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for SubmittalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(SubmittalStatus::Draft),
            "open" => Ok(SubmittalStatus::Open),
            "approved" => Ok(SubmittalStatus::Approved),
            "rejected" => Ok(SubmittalStatus::Rejected),
            "revise and resubmit" | "revise-and-resubmit" | "revise" => {
                Ok(SubmittalStatus::ReviseResubmit)
            }
            "closed" => Ok(SubmittalStatus::Closed),
            _ => Err(format!(
                "invalid submittal status: '{}' (valid: draft, open, approved, rejected, revise and resubmit, closed)",
                s
            )),
        }
    }
}

/// A submittal with a per-project display number
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submittal {
    /// Unique identifier
    pub id: RecordId,

    /// Project this submittal belongs to
    pub project_id: RecordId,

    /// Per-project sequential display number, never reused
    pub submittal_number: u32,

    /// Short title, required
    pub title: String,

    #[serde(default)]
    pub status: SubmittalStatus,

    /// What is being submitted (e.g. Shop Drawings, Product Data)
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub submittal_type: String,

    /// Specification section reference (e.g. 03300)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub spec_section: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Directory user reviewing the submittal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<RecordId>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Creation payload for a submittal
#[derive(Debug, Clone, Default)]
pub struct SubmittalDraft {
    /// Explicit display number; assigned from the project sequence when None
    pub number: Option<u32>,
    pub title: String,
    pub status: SubmittalStatus,
    pub submittal_type: String,
    pub spec_section: String,
    pub due_date: Option<NaiveDate>,
    pub assignee: Option<RecordId>,
    pub description: String,
}

/// Partial update for a submittal; the display number is immutable
#[derive(Debug, Clone, Default)]
pub struct SubmittalPatch {
    pub title: Option<String>,
    pub status: Option<SubmittalStatus>,
    pub submittal_type: Option<String>,
    pub spec_section: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub assignee: Option<RecordId>,
    pub description: Option<String>,
}

impl SubmittalPatch {
    pub fn apply(&self, submittal: &mut Submittal) {
        if let Some(v) = &self.title {
            submittal.title = v.clone();
        }
        if let Some(v) = self.status {
            submittal.status = v;
        }
        if let Some(v) = &self.submittal_type {
            submittal.submittal_type = v.clone();
        }
        if let Some(v) = &self.spec_section {
            submittal.spec_section = v.clone();
        }
        if let Some(v) = self.due_date {
            submittal.due_date = Some(v);
        }
        if let Some(v) = &self.assignee {
            submittal.assignee = Some(v.clone());
        }
        if let Some(v) = &self.description {
            submittal.description = v.clone();
        }
    }
}
