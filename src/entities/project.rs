//! Project entity type

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::identity::RecordId;

/// Lifecycle stage of a construction project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStage {
    #[serde(rename = "bidding")]
    Bidding,
    #[serde(rename = "pre-construction")]
    PreConstruction,
    #[serde(rename = "course of construction")]
    CourseOfConstruction,
    #[serde(rename = "post-construction")]
    PostConstruction,
    #[serde(rename = "warranty")]
    Warranty,
}

impl Default for ProjectStage {
    fn default() -> Self {
        ProjectStage::PreConstruction
    }
}

impl std::fmt::Display for ProjectStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStage::Bidding => write!(f, "bidding"),
            ProjectStage::PreConstruction => write!(f, "pre-construction"),
            ProjectStage::CourseOfConstruction => write!(f, "course of construction"),
            ProjectStage::PostConstruction => write!(f, "post-construction"),
            ProjectStage::Warranty => write!(f, "warranty"),
        }
    }
}

impl FromStr for ProjectStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bidding" => Ok(ProjectStage::Bidding),
            "pre-construction" | "preconstruction" => Ok(ProjectStage::PreConstruction),
            "course of construction" | "course-of-construction" | "construction" => {
                Ok(ProjectStage::CourseOfConstruction)
            }
            "post-construction" | "postconstruction" => Ok(ProjectStage::PostConstruction),
            "warranty" => Ok(ProjectStage::Warranty),
            _ => Err(format!(
                "invalid stage: '{}' (valid: bidding, pre-construction, course of construction, post-construction, warranty)",
                s
            )),
        }
    }
}

/// A construction project, the root of every other record's scope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique identifier
    pub id: RecordId,

    /// Project name
    pub name: String,

    /// Job / contract number
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub job_number: String,

    /// Street address
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub city: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub state: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub zip: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub county: String,

    /// Current lifecycle stage
    #[serde(default)]
    pub stage: ProjectStage,

    /// Market sector (e.g. Commercial, Healthcare)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sector: String,

    /// Contract value in dollars, never negative
    #[serde(default)]
    pub contract_value: f64,

    /// Free-text description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_start_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projected_finish_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty_start_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty_end_date: Option<NaiveDate>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Creation payload for a project
#[derive(Debug, Clone, Default)]
pub struct ProjectDraft {
    pub name: String,
    pub job_number: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub county: String,
    pub stage: ProjectStage,
    pub sector: String,
    pub contract_value: f64,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub completion_date: Option<NaiveDate>,
}

/// Partial update for a project; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub job_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub county: Option<String>,
    pub stage: Option<ProjectStage>,
    pub sector: Option<String>,
    pub contract_value: Option<f64>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub actual_start_date: Option<NaiveDate>,
    pub completion_date: Option<NaiveDate>,
    pub projected_finish_date: Option<NaiveDate>,
    pub warranty_start_date: Option<NaiveDate>,
    pub warranty_end_date: Option<NaiveDate>,
}

impl ProjectPatch {
    /// Merge the provided fields into the project
    pub fn apply(&self, project: &mut Project) {
        if let Some(v) = &self.name {
            project.name = v.clone();
        }
        if let Some(v) = &self.job_number {
            project.job_number = v.clone();
        }
        if let Some(v) = &self.address {
            project.address = v.clone();
        }
        if let Some(v) = &self.city {
            project.city = v.clone();
        }
        if let Some(v) = &self.state {
            project.state = v.clone();
        }
        if let Some(v) = &self.zip {
            project.zip = v.clone();
        }
        if let Some(v) = &self.county {
            project.county = v.clone();
        }
        if let Some(v) = self.stage {
            project.stage = v;
        }
        if let Some(v) = &self.sector {
            project.sector = v.clone();
        }
        if let Some(v) = self.contract_value {
            project.contract_value = v;
        }
        if let Some(v) = &self.description {
            project.description = v.clone();
        }
        if let Some(v) = self.start_date {
            project.start_date = Some(v);
        }
        if let Some(v) = self.actual_start_date {
            project.actual_start_date = Some(v);
        }
        if let Some(v) = self.completion_date {
            project.completion_date = Some(v);
        }
        if let Some(v) = self.projected_finish_date {
            project.projected_finish_date = Some(v);
        }
        if let Some(v) = self.warranty_start_date {
            project.warranty_start_date = Some(v);
        }
        if let Some(v) = self.warranty_end_date {
            project.warranty_end_date = Some(v);
        }
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.job_number.is_none()
            && self.address.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip.is_none()
            && self.county.is_none()
            && self.stage.is_none()
            && self.sector.is_none()
            && self.contract_value.is_none()
            && self.description.is_none()
            && self.start_date.is_none()
            && self.actual_start_date.is_none()
            && self.completion_date.is_none()
            && self.projected_finish_date.is_none()
            && self.warranty_start_date.is_none()
            && self.warranty_end_date.is_none()
    }
}
