//! Activity feed entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::identity::RecordId;

/// Which record family an activity entry describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Project,
    Task,
    Rfi,
    Submittal,
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityKind::Project => write!(f, "project"),
            ActivityKind::Task => write!(f, "task"),
            ActivityKind::Rfi => write!(f, "rfi"),
            ActivityKind::Submittal => write!(f, "submittal"),
        }
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "project" => Ok(ActivityKind::Project),
            "task" => Ok(ActivityKind::Task),
            "rfi" => Ok(ActivityKind::Rfi),
            "submittal" => Ok(ActivityKind::Submittal),
            _ => Err(format!(
                "invalid activity kind: '{}' (valid: project, task, rfi, submittal)",
                s
            )),
        }
    }
}

/// An immutable, human-readable event in the journal
///
/// Entries are only ever removed by the global retention cap or by the
/// cascade when their project is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    /// Unique identifier
    pub id: RecordId,

    /// Project the event happened in
    pub project_id: RecordId,

    /// Record family
    #[serde(rename = "type")]
    pub kind: ActivityKind,

    /// What happened: "created", "updated", "response"
    pub action: String,

    /// Display string, e.g. `RFI #4: Window detail`
    pub details: String,

    /// Account id of the actor
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_id: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_roundtrip() {
        let entry = ActivityEntry {
            id: RecordId::generate(),
            project_id: RecordId::generate(),
            kind: ActivityKind::Rfi,
            action: "created".to_string(),
            details: "RFI #1: Window detail".to_string(),
            user_id: "u1".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"type\":\"rfi\""));
        let parsed: ActivityEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.kind, ActivityKind::Rfi);
        assert_eq!(parsed.action, "created");
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("task".parse::<ActivityKind>().unwrap(), ActivityKind::Task);
        assert!("document".parse::<ActivityKind>().is_err());
    }
}
