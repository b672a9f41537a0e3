//! Project membership records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::RecordId;

/// Role granted to every project creator
pub const ADMINISTRATOR: &str = "administrator";

/// Membership of a user in a project, unique per (project, user) pair
///
/// Adding a member for a pair that already exists updates the role in place
/// instead of inserting a second row; see `Store::add_member`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    /// Unique identifier
    pub id: RecordId,

    /// Project this membership belongs to
    pub project_id: RecordId,

    /// Account id of the member, opaque to the data layer
    pub user_id: String,

    /// Role within the project (e.g. "administrator")
    pub role: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}
