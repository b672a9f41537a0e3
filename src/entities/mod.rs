//! Entity type definitions
//!
//! Sitedesk manages the following record types, all project-scoped except
//! [`Project`] itself:
//!
//! **Portfolio:**
//! - [`Project`] - A construction project with stage, location, and milestones
//! - [`ProjectMember`] - Per-project membership with a role, unique per (project, user)
//!
//! **Directory:**
//! - [`DirectoryUser`] - People reachable on the project
//! - [`DirectoryCompany`] - Companies under contract
//! - [`DistributionGroup`] - Named sets of directory users
//!
//! **Project tools:**
//! - [`Document`] - Folder/file nodes in the hierarchical document tree
//! - [`Task`] - Numbered work items
//! - [`Rfi`] - Numbered Requests for Information with response threads
//! - [`Submittal`] - Numbered submittals under review
//! - [`Specification`] - Specification sections in numeric-aware order
//! - [`ActivityEntry`] - Append-only journal of tracked mutations

pub mod activity;
pub mod directory;
pub mod document;
pub mod group;
pub mod member;
pub mod project;
pub mod rfi;
pub mod specification;
pub mod submittal;
pub mod task;

pub use activity::{ActivityEntry, ActivityKind};
pub use directory::{
    DirectoryCompany, DirectoryCompanyDraft, DirectoryCompanyPatch, DirectoryUser,
    DirectoryUserDraft, DirectoryUserPatch, Permission,
};
pub use document::{Attachment, Document, DocumentKind, FilePayload};
pub use group::{DistributionGroup, DistributionGroupDraft, DistributionGroupPatch};
pub use member::ProjectMember;
pub use project::{Project, ProjectDraft, ProjectPatch, ProjectStage};
pub use rfi::{Rfi, RfiDraft, RfiPatch, RfiResponse, RfiStatus};
pub use specification::{natural_cmp, Specification, SpecificationPatch};
pub use submittal::{Submittal, SubmittalDraft, SubmittalPatch, SubmittalStatus};
pub use task::{Task, TaskCategory, TaskDraft, TaskPatch, TaskStatus};
