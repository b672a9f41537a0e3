//! Request for Information (RFI) entity type

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::identity::RecordId;
use crate::entities::document::Attachment;

/// Longest subject accepted on create/update
pub const MAX_SUBJECT_LEN: usize = 200;

/// RFI workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RfiStatus {
    Draft,
    Open,
    Closed,
}

impl Default for RfiStatus {
    fn default() -> Self {
        RfiStatus::Open
    }
}

impl std::fmt::Display for RfiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RfiStatus::Draft => write!(f, "draft"),
            RfiStatus::Open => write!(f, "open"),
            RfiStatus::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for RfiStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(RfiStatus::Draft),
            "open" => Ok(RfiStatus::Open),
            "closed" => Ok(RfiStatus::Closed),
            _ => Err(format!(
                "invalid RFI status: '{}' (valid: draft, open, closed)",
                s
            )),
        }
    }
}

/// A response on an RFI thread
///
/// Responses are append-only: never reordered, edited, or removed
/// individually.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfiResponse {
    /// Unique identifier within the thread
    pub id: RecordId,

    /// Account id of the author
    pub author_id: String,

    /// Response body
    pub text: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A Request for Information with a per-project display number
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rfi {
    /// Unique identifier
    pub id: RecordId,

    /// Project this RFI belongs to
    pub project_id: RecordId,

    /// Per-project sequential display number, never reused
    pub rfi_number: u32,

    /// Subject line, required, at most 200 characters
    pub subject: String,

    /// The question being asked
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub question: String,

    #[serde(default)]
    pub status: RfiStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Directory user managing this RFI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rfi_manager: Option<RecordId>,

    /// Directory user the question came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_from: Option<RecordId>,

    /// Directory users assigned to answer
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<RecordId>,

    /// Directory users to notify
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub distribution_list: Vec<RecordId>,

    /// Directory company responsible for the work
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_contractor: Option<RecordId>,

    /// Specification section this RFI concerns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specification: Option<RecordId>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub drawing_number: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,

    /// Response thread, append-only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<RfiResponse>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Creation payload for an RFI; `responses` always starts empty
#[derive(Debug, Clone, Default)]
pub struct RfiDraft {
    /// Explicit display number; assigned from the project sequence when None
    pub number: Option<u32>,
    pub subject: String,
    pub question: String,
    pub status: RfiStatus,
    pub due_date: Option<NaiveDate>,
    pub rfi_manager: Option<RecordId>,
    pub received_from: Option<RecordId>,
    pub assignees: Vec<RecordId>,
    pub distribution_list: Vec<RecordId>,
    pub responsible_contractor: Option<RecordId>,
    pub specification: Option<RecordId>,
    pub drawing_number: String,
    pub attachments: Vec<Attachment>,
}

/// Partial update for an RFI; number and responses are not patchable
#[derive(Debug, Clone, Default)]
pub struct RfiPatch {
    pub subject: Option<String>,
    pub question: Option<String>,
    pub status: Option<RfiStatus>,
    pub due_date: Option<NaiveDate>,
    pub rfi_manager: Option<RecordId>,
    pub received_from: Option<RecordId>,
    pub assignees: Option<Vec<RecordId>>,
    pub distribution_list: Option<Vec<RecordId>>,
    pub responsible_contractor: Option<RecordId>,
    pub specification: Option<RecordId>,
    pub drawing_number: Option<String>,
    pub attachments: Option<Vec<Attachment>>,
}

impl RfiPatch {
    pub fn apply(&self, rfi: &mut Rfi) {
        if let Some(v) = &self.subject {
            rfi.subject = v.clone();
        }
        if let Some(v) = &self.question {
            rfi.question = v.clone();
        }
        if let Some(v) = self.status {
            rfi.status = v;
        }
        if let Some(v) = self.due_date {
            rfi.due_date = Some(v);
        }
        if let Some(v) = &self.rfi_manager {
            rfi.rfi_manager = Some(v.clone());
        }
        if let Some(v) = &self.received_from {
            rfi.received_from = Some(v.clone());
        }
        if let Some(v) = &self.assignees {
            rfi.assignees = v.clone();
        }
        if let Some(v) = &self.distribution_list {
            rfi.distribution_list = v.clone();
        }
        if let Some(v) = &self.responsible_contractor {
            rfi.responsible_contractor = Some(v.clone());
        }
        if let Some(v) = &self.specification {
            rfi.specification = Some(v.clone());
        }
        if let Some(v) = &self.drawing_number {
            rfi.drawing_number = v.clone();
        }
        if let Some(v) = &self.attachments {
            rfi.attachments = v.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Rfi {
        Rfi {
            id: RecordId::generate(),
            project_id: RecordId::generate(),
            rfi_number: 1,
            subject: "Window detail".to_string(),
            question: "Which glazing spec applies at grid line 4?".to_string(),
            status: RfiStatus::Open,
            due_date: None,
            rfi_manager: None,
            received_from: None,
            assignees: Vec::new(),
            distribution_list: Vec::new(),
            responsible_contractor: None,
            specification: None,
            drawing_number: "A-201".to_string(),
            attachments: Vec::new(),
            responses: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_rfi_roundtrip() {
        let rfi = sample();
        let json = serde_json::to_string(&rfi).unwrap();
        assert!(json.contains("\"rfiNumber\":1"));
        assert!(json.contains("\"drawingNumber\":\"A-201\""));
        let parsed: Rfi = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.subject, "Window detail");
        assert!(parsed.responses.is_empty());
    }

    #[test]
    fn test_responses_roundtrip_in_order() {
        let mut rfi = sample();
        for i in 0..3 {
            rfi.responses.push(RfiResponse {
                id: RecordId::generate(),
                author_id: format!("u{}", i),
                text: format!("answer {}", i),
                created_at: Utc::now(),
            });
        }
        let json = serde_json::to_string(&rfi).unwrap();
        let parsed: Rfi = serde_json::from_str(&json).unwrap();
        let authors: Vec<_> = parsed.responses.iter().map(|r| r.author_id.as_str()).collect();
        assert_eq!(authors, vec!["u0", "u1", "u2"]);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("draft".parse::<RfiStatus>().unwrap(), RfiStatus::Draft);
        assert!("pending".parse::<RfiStatus>().is_err());
    }
}
