//! Persistence adapters
//!
//! The in-memory store talks to durable storage through the [`Backend`]
//! trait. Two implementations satisfy the same contract:
//!
//! - [`LocalStore`]: one JSON blob per collection under `.sitedesk/data/`,
//!   identifiers generated client-side (ULIDs).
//! - [`SqliteStore`]: one snake_case table per collection in
//!   `.sitedesk/sitedesk.db`, identifiers allocated by the database.
//!
//! Given the same sequence of logical operations, both backends produce the
//! same logical collection state, differing only in identifier values and
//! timestamp precision.

pub mod files;
pub mod local;
pub mod sqlite;

pub use files::FileStore;
pub use local::LocalStore;
pub use sqlite::SqliteStore;

use thiserror::Error;

use crate::core::identity::RecordId;
use crate::entities::{
    ActivityEntry, DirectoryCompany, DirectoryUser, DistributionGroup, Document, Project,
    ProjectMember, Rfi, Specification, Submittal, Task,
};

/// The eleven persisted collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Project,
    Member,
    DirUser,
    DirCompany,
    DistGroup,
    Document,
    Task,
    Rfi,
    Submittal,
    Specification,
    Activity,
}

impl Kind {
    /// Every collection, in schema order
    pub const ALL: [Kind; 11] = [
        Kind::Project,
        Kind::Member,
        Kind::DirUser,
        Kind::DirCompany,
        Kind::DistGroup,
        Kind::Document,
        Kind::Task,
        Kind::Rfi,
        Kind::Submittal,
        Kind::Specification,
        Kind::Activity,
    ];

    /// Table name (SQLite) and blob key stem (local), snake_case plural
    pub fn table(&self) -> &'static str {
        match self {
            Kind::Project => "projects",
            Kind::Member => "project_members",
            Kind::DirUser => "dir_users",
            Kind::DirCompany => "dir_companies",
            Kind::DistGroup => "dist_groups",
            Kind::Document => "documents",
            Kind::Task => "tasks",
            Kind::Rfi => "rfis",
            Kind::Submittal => "submittals",
            Kind::Specification => "specifications",
            Kind::Activity => "activity_feed",
        }
    }

    /// Singular human-readable label for messages
    pub fn label(&self) -> &'static str {
        match self {
            Kind::Project => "project",
            Kind::Member => "project member",
            Kind::DirUser => "directory user",
            Kind::DirCompany => "directory company",
            Kind::DistGroup => "distribution group",
            Kind::Document => "document",
            Kind::Task => "task",
            Kind::Rfi => "RFI",
            Kind::Submittal => "submittal",
            Kind::Specification => "specification",
            Kind::Activity => "activity entry",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A record of any collection, the unit the adapters move around
#[derive(Debug, Clone)]
pub enum Record {
    Project(Project),
    Member(ProjectMember),
    DirUser(DirectoryUser),
    DirCompany(DirectoryCompany),
    DistGroup(DistributionGroup),
    Document(Document),
    Task(Task),
    Rfi(Rfi),
    Submittal(Submittal),
    Specification(Specification),
    Activity(ActivityEntry),
}

impl Record {
    pub fn kind(&self) -> Kind {
        match self {
            Record::Project(_) => Kind::Project,
            Record::Member(_) => Kind::Member,
            Record::DirUser(_) => Kind::DirUser,
            Record::DirCompany(_) => Kind::DirCompany,
            Record::DistGroup(_) => Kind::DistGroup,
            Record::Document(_) => Kind::Document,
            Record::Task(_) => Kind::Task,
            Record::Rfi(_) => Kind::Rfi,
            Record::Submittal(_) => Kind::Submittal,
            Record::Specification(_) => Kind::Specification,
            Record::Activity(_) => Kind::Activity,
        }
    }

    pub fn id(&self) -> &RecordId {
        match self {
            Record::Project(r) => &r.id,
            Record::Member(r) => &r.id,
            Record::DirUser(r) => &r.id,
            Record::DirCompany(r) => &r.id,
            Record::DistGroup(r) => &r.id,
            Record::Document(r) => &r.id,
            Record::Task(r) => &r.id,
            Record::Rfi(r) => &r.id,
            Record::Submittal(r) => &r.id,
            Record::Specification(r) => &r.id,
            Record::Activity(r) => &r.id,
        }
    }
}

/// One mutation in a persistence batch
///
/// A batch is applied atomically where the backend supports it (SQLite runs
/// the whole batch in a transaction; the local store rewrites affected blob
/// files best-effort).
#[derive(Debug, Clone)]
pub enum Op {
    /// Append a record (activity entries prepend, everything else appends)
    Insert(Record),
    /// Replace the record with the same id
    Update(Record),
    /// Remove one record by id
    Delete(Kind, RecordId),
    /// Remove a project and every record scoped to it
    PurgeProject(RecordId),
    /// Drop activity entries beyond the newest `cap`
    TrimFeed(usize),
}

/// Full collection state, insertion-ordered (activity newest-first)
///
/// Shared between the store's read model and the local backend's blob
/// mirror so both sides apply identical in-memory semantics.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub projects: Vec<Project>,
    pub members: Vec<ProjectMember>,
    pub dir_users: Vec<DirectoryUser>,
    pub dir_companies: Vec<DirectoryCompany>,
    pub dist_groups: Vec<DistributionGroup>,
    pub documents: Vec<Document>,
    pub tasks: Vec<Task>,
    pub rfis: Vec<Rfi>,
    pub submittals: Vec<Submittal>,
    pub specifications: Vec<Specification>,
    pub activity: Vec<ActivityEntry>,
}

impl Snapshot {
    /// Apply one operation to the in-memory collections
    pub fn apply(&mut self, op: &Op) {
        match op {
            Op::Insert(record) => self.insert(record.clone()),
            Op::Update(record) => self.replace(record.clone()),
            Op::Delete(kind, id) => self.remove(*kind, id),
            Op::PurgeProject(id) => self.purge_project(id),
            Op::TrimFeed(cap) => self.activity.truncate(*cap),
        }
    }

    fn insert(&mut self, record: Record) {
        match record {
            Record::Project(r) => self.projects.push(r),
            Record::Member(r) => self.members.push(r),
            Record::DirUser(r) => self.dir_users.push(r),
            Record::DirCompany(r) => self.dir_companies.push(r),
            Record::DistGroup(r) => self.dist_groups.push(r),
            Record::Document(r) => self.documents.push(r),
            Record::Task(r) => self.tasks.push(r),
            Record::Rfi(r) => self.rfis.push(r),
            Record::Submittal(r) => self.submittals.push(r),
            Record::Specification(r) => self.specifications.push(r),
            // The feed reads newest-first
            Record::Activity(r) => self.activity.insert(0, r),
        }
    }

    fn replace(&mut self, record: Record) {
        fn swap<T>(items: &mut [T], incoming: T, id_of: impl Fn(&T) -> &RecordId) {
            let id = id_of(&incoming).clone();
            if let Some(slot) = items.iter_mut().find(|item| *id_of(item) == id) {
                *slot = incoming;
            }
        }
        match record {
            Record::Project(r) => swap(&mut self.projects, r, |p| &p.id),
            Record::Member(r) => swap(&mut self.members, r, |m| &m.id),
            Record::DirUser(r) => swap(&mut self.dir_users, r, |u| &u.id),
            Record::DirCompany(r) => swap(&mut self.dir_companies, r, |c| &c.id),
            Record::DistGroup(r) => swap(&mut self.dist_groups, r, |g| &g.id),
            Record::Document(r) => swap(&mut self.documents, r, |d| &d.id),
            Record::Task(r) => swap(&mut self.tasks, r, |t| &t.id),
            Record::Rfi(r) => swap(&mut self.rfis, r, |x| &x.id),
            Record::Submittal(r) => swap(&mut self.submittals, r, |s| &s.id),
            Record::Specification(r) => swap(&mut self.specifications, r, |s| &s.id),
            Record::Activity(r) => swap(&mut self.activity, r, |a| &a.id),
        }
    }

    fn remove(&mut self, kind: Kind, id: &RecordId) {
        match kind {
            Kind::Project => self.projects.retain(|r| r.id != *id),
            Kind::Member => self.members.retain(|r| r.id != *id),
            Kind::DirUser => self.dir_users.retain(|r| r.id != *id),
            Kind::DirCompany => self.dir_companies.retain(|r| r.id != *id),
            Kind::DistGroup => self.dist_groups.retain(|r| r.id != *id),
            Kind::Document => self.documents.retain(|r| r.id != *id),
            Kind::Task => self.tasks.retain(|r| r.id != *id),
            Kind::Rfi => self.rfis.retain(|r| r.id != *id),
            Kind::Submittal => self.submittals.retain(|r| r.id != *id),
            Kind::Specification => self.specifications.retain(|r| r.id != *id),
            Kind::Activity => self.activity.retain(|r| r.id != *id),
        }
    }

    fn purge_project(&mut self, id: &RecordId) {
        self.projects.retain(|r| r.id != *id);
        self.members.retain(|r| r.project_id != *id);
        self.dir_users.retain(|r| r.project_id != *id);
        self.dir_companies.retain(|r| r.project_id != *id);
        self.dist_groups.retain(|r| r.project_id != *id);
        self.documents.retain(|r| r.project_id != *id);
        self.tasks.retain(|r| r.project_id != *id);
        self.rfis.retain(|r| r.project_id != *id);
        self.submittals.retain(|r| r.project_id != *id);
        self.specifications.retain(|r| r.project_id != *id);
        self.activity.retain(|r| r.project_id != *id);
    }
}

/// Storage backend contract
///
/// `allocate_id` makes identifier provenance the backend's concern: the
/// local store hands out ULIDs, the SQLite store numbers from a counter
/// table. `apply` must leave durable state untouched when it fails; the
/// caller only folds the batch into its read model after success.
pub trait Backend {
    /// Read the full collection state
    fn load(&mut self) -> Result<Snapshot, StorageError>;

    /// Produce an identifier for a record about to be inserted
    fn allocate_id(&mut self, kind: Kind) -> Result<RecordId, StorageError>;

    /// Persist a batch of operations
    fn apply(&mut self, batch: &[Op]) -> Result<(), StorageError>;
}

/// Errors from the persistence boundary
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt stored data: {0}")]
    Corrupt(String),

    #[error("unsupported database schema version {found} (expected {expected})")]
    SchemaVersion { found: i64, expected: i64 },
}
