//! Distribution groups

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::RecordId;

/// A named set of directory users used for RFI/task distribution
///
/// Membership is a plain id list and is not enforced against deleted users;
/// readers tolerate dangling ids by rendering a placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionGroup {
    /// Unique identifier
    pub id: RecordId,

    /// Project this group belongs to
    pub project_id: RecordId,

    /// Group name, required
    pub name: String,

    /// Directory user ids in this group
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub member_ids: Vec<RecordId>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Creation payload for a distribution group
#[derive(Debug, Clone, Default)]
pub struct DistributionGroupDraft {
    pub name: String,
    pub member_ids: Vec<RecordId>,
}

/// Partial update for a distribution group
#[derive(Debug, Clone, Default)]
pub struct DistributionGroupPatch {
    pub name: Option<String>,
    pub member_ids: Option<Vec<RecordId>>,
}

impl DistributionGroupPatch {
    pub fn apply(&self, group: &mut DistributionGroup) {
        if let Some(v) = &self.name {
            group.name = v.clone();
        }
        if let Some(v) = &self.member_ids {
            group.member_ids = v.clone();
        }
    }
}
