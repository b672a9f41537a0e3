//! Project directory: people and companies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::identity::RecordId;

/// Permission bucket for a directory contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "architect/engineer")]
    ArchitectEngineer,
    #[serde(rename = "owner/client")]
    OwnerClient,
    #[serde(rename = "subcontractor")]
    Subcontractor,
    #[serde(rename = "company employee")]
    CompanyEmployee,
}

impl Default for Permission {
    fn default() -> Self {
        Permission::CompanyEmployee
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Permission::ArchitectEngineer => write!(f, "architect/engineer"),
            Permission::OwnerClient => write!(f, "owner/client"),
            Permission::Subcontractor => write!(f, "subcontractor"),
            Permission::CompanyEmployee => write!(f, "company employee"),
        }
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "architect/engineer" | "architect" | "engineer" => Ok(Permission::ArchitectEngineer),
            "owner/client" | "owner" | "client" => Ok(Permission::OwnerClient),
            "subcontractor" => Ok(Permission::Subcontractor),
            "company employee" | "company-employee" | "employee" => Ok(Permission::CompanyEmployee),
            _ => Err(format!(
                "invalid permission: '{}' (valid: architect/engineer, owner/client, subcontractor, company employee)",
                s
            )),
        }
    }
}

/// A person in the project directory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    /// Unique identifier
    pub id: RecordId,

    /// Project this contact belongs to
    pub project_id: RecordId,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub first_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_name: String,

    /// Email address, required
    pub email: String,

    #[serde(default)]
    pub permission: Permission,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl DirectoryUser {
    /// Display name: "First Last", falling back to the email address
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_str(), self.last_name.as_str()]
            .iter()
            .filter(|p| !p.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.email.clone()
        } else {
            name
        }
    }
}

/// Creation payload for a directory user
#[derive(Debug, Clone, Default)]
pub struct DirectoryUserDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub permission: Permission,
}

/// Partial update for a directory user
#[derive(Debug, Clone, Default)]
pub struct DirectoryUserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub permission: Option<Permission>,
}

impl DirectoryUserPatch {
    pub fn apply(&self, user: &mut DirectoryUser) {
        if let Some(v) = &self.first_name {
            user.first_name = v.clone();
        }
        if let Some(v) = &self.last_name {
            user.last_name = v.clone();
        }
        if let Some(v) = &self.email {
            user.email = v.clone();
        }
        if let Some(v) = self.permission {
            user.permission = v;
        }
    }
}

/// A company in the project directory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryCompany {
    /// Unique identifier
    pub id: RecordId,

    /// Project this company belongs to
    pub project_id: RecordId,

    /// Company name, required
    pub name: String,

    /// Trade or company type (e.g. Electrical, General Contractor)
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub company_type: String,

    /// Primary contact person
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub contact: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phone: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Creation payload for a directory company
#[derive(Debug, Clone, Default)]
pub struct DirectoryCompanyDraft {
    pub name: String,
    pub company_type: String,
    pub contact: String,
    pub email: String,
    pub phone: String,
}

/// Partial update for a directory company
#[derive(Debug, Clone, Default)]
pub struct DirectoryCompanyPatch {
    pub name: Option<String>,
    pub company_type: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl DirectoryCompanyPatch {
    pub fn apply(&self, company: &mut DirectoryCompany) {
        if let Some(v) = &self.name {
            company.name = v.clone();
        }
        if let Some(v) = &self.company_type {
            company.company_type = v.clone();
        }
        if let Some(v) = &self.contact {
            company.contact = v.clone();
        }
        if let Some(v) = &self.email {
            company.email = v.clone();
        }
        if let Some(v) = &self.phone {
            company.phone = v.clone();
        }
    }
}
