//! The record store
//!
//! All reads come from an in-memory [`Snapshot`] and every mutation funnels
//! through one commit point: build a batch of storage ops, hand it to the
//! backend, and fold it into the snapshot only after the backend confirms.
//! A failed persist therefore never leaves phantom records in memory.
//!
//! The mutators here are the only sanctioned write path. They validate
//! required fields, assign sequence numbers, enforce the document tree
//! rules, cascade project deletes, and append activity feed entries for
//! the mutations the feed tracks.

use chrono::Utc;
use thiserror::Error;

use crate::core::identity::RecordId;
use crate::core::{sequence, tree};
use crate::entities::{
    ActivityEntry, ActivityKind, DirectoryCompany, DirectoryCompanyDraft, DirectoryCompanyPatch,
    DirectoryUser, DirectoryUserDraft, DirectoryUserPatch, DistributionGroup,
    DistributionGroupDraft, DistributionGroupPatch, Document, DocumentKind, FilePayload, Project,
    ProjectDraft, ProjectMember, ProjectPatch, Rfi, RfiDraft, RfiPatch, RfiResponse,
    Specification, SpecificationPatch, Submittal, SubmittalDraft, SubmittalPatch, Task, TaskDraft,
    TaskPatch, natural_cmp,
};
use crate::entities::member::ADMINISTRATOR;
use crate::entities::rfi::MAX_SUBJECT_LEN;
use crate::storage::{Backend, Kind, Op, Record, Snapshot, StorageError};

/// The activity feed keeps this many entries, newest first
pub const ACTIVITY_CAP: usize = 500;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: Kind, id: String },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidOperation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// All record collections plus the backend that persists them
pub struct Store {
    backend: Box<dyn Backend>,
    data: Snapshot,
}

impl Store {
    /// Load the full record state from a backend
    pub fn open(mut backend: Box<dyn Backend>) -> Result<Self, StoreError> {
        let data = backend.load()?;
        Ok(Self { backend, data })
    }

    /// Persist a batch, then fold it into the in-memory state
    fn commit(&mut self, batch: Vec<Op>) -> Result<(), StoreError> {
        self.backend.apply(&batch)?;
        for op in &batch {
            self.data.apply(op);
        }
        Ok(())
    }

    fn allocate(&mut self, kind: Kind) -> Result<RecordId, StoreError> {
        Ok(self.backend.allocate_id(kind)?)
    }

    /// Feed entry ops for a tracked mutation; the cap rides in the same batch
    fn journal(
        &mut self,
        project_id: &RecordId,
        kind: ActivityKind,
        action: &str,
        details: String,
        actor: &str,
    ) -> Result<Vec<Op>, StoreError> {
        let entry = ActivityEntry {
            id: self.allocate(Kind::Activity)?,
            project_id: project_id.clone(),
            kind,
            action: action.to_string(),
            details,
            user_id: actor.to_string(),
            created_at: Utc::now(),
        };
        Ok(vec![
            Op::Insert(Record::Activity(entry)),
            Op::TrimFeed(ACTIVITY_CAP),
        ])
    }

    // -----------------------------------------------------------------------
    // read access

    pub fn projects(&self) -> &[Project] {
        &self.data.projects
    }

    pub fn project(&self, id: &RecordId) -> Result<&Project, StoreError> {
        find(&self.data.projects, Kind::Project, id, |p| &p.id)
    }

    pub fn project_members(&self, project_id: &RecordId) -> Vec<&ProjectMember> {
        scoped(&self.data.members, project_id, |m| &m.project_id)
    }

    pub fn project_dir_users(&self, project_id: &RecordId) -> Vec<&DirectoryUser> {
        scoped(&self.data.dir_users, project_id, |u| &u.project_id)
    }

    pub fn dir_user(&self, id: &RecordId) -> Result<&DirectoryUser, StoreError> {
        find(&self.data.dir_users, Kind::DirUser, id, |u| &u.id)
    }

    pub fn project_dir_companies(&self, project_id: &RecordId) -> Vec<&DirectoryCompany> {
        scoped(&self.data.dir_companies, project_id, |c| &c.project_id)
    }

    pub fn dir_company(&self, id: &RecordId) -> Result<&DirectoryCompany, StoreError> {
        find(&self.data.dir_companies, Kind::DirCompany, id, |c| &c.id)
    }

    pub fn project_groups(&self, project_id: &RecordId) -> Vec<&DistributionGroup> {
        scoped(&self.data.dist_groups, project_id, |g| &g.project_id)
    }

    pub fn group(&self, id: &RecordId) -> Result<&DistributionGroup, StoreError> {
        find(&self.data.dist_groups, Kind::DistGroup, id, |g| &g.id)
    }

    pub fn project_documents(&self, project_id: &RecordId) -> Vec<&Document> {
        scoped(&self.data.documents, project_id, |d| &d.project_id)
    }

    pub fn document(&self, id: &RecordId) -> Result<&Document, StoreError> {
        find(&self.data.documents, Kind::Document, id, |d| &d.id)
    }

    /// One folder level of a project, `None` for the root
    pub fn documents_in(
        &self,
        project_id: &RecordId,
        parent_id: Option<&RecordId>,
    ) -> Vec<&Document> {
        self.data
            .documents
            .iter()
            .filter(|d| &d.project_id == project_id)
            .filter(|d| d.parent_id.as_ref() == parent_id)
            .collect()
    }

    /// Folder chain from the project root down to the given node
    pub fn breadcrumb(&self, id: &RecordId) -> Vec<&Document> {
        tree::breadcrumb(&self.data.documents, id)
    }

    pub fn project_tasks(&self, project_id: &RecordId) -> Vec<&Task> {
        scoped(&self.data.tasks, project_id, |t| &t.project_id)
    }

    pub fn task(&self, id: &RecordId) -> Result<&Task, StoreError> {
        find(&self.data.tasks, Kind::Task, id, |t| &t.id)
    }

    pub fn project_rfis(&self, project_id: &RecordId) -> Vec<&Rfi> {
        scoped(&self.data.rfis, project_id, |r| &r.project_id)
    }

    pub fn rfi(&self, id: &RecordId) -> Result<&Rfi, StoreError> {
        find(&self.data.rfis, Kind::Rfi, id, |r| &r.id)
    }

    pub fn project_submittals(&self, project_id: &RecordId) -> Vec<&Submittal> {
        scoped(&self.data.submittals, project_id, |s| &s.project_id)
    }

    pub fn submittal(&self, id: &RecordId) -> Result<&Submittal, StoreError> {
        find(&self.data.submittals, Kind::Submittal, id, |s| &s.id)
    }

    /// Specifications for a project, ordered by section number
    pub fn project_specifications(&self, project_id: &RecordId) -> Vec<&Specification> {
        let mut specs = scoped(&self.data.specifications, project_id, |s| &s.project_id);
        specs.sort_by(|a, b| natural_cmp(&a.number, &b.number));
        specs
    }

    pub fn specification(&self, id: &RecordId) -> Result<&Specification, StoreError> {
        find(&self.data.specifications, Kind::Specification, id, |s| &s.id)
    }

    /// The full feed, newest first
    pub fn activity(&self) -> &[ActivityEntry] {
        &self.data.activity
    }

    pub fn project_activity(&self, project_id: &RecordId) -> Vec<&ActivityEntry> {
        scoped(&self.data.activity, project_id, |a| &a.project_id)
    }

    /// Role of a user on a project, if they are a member
    pub fn project_role(&self, project_id: &RecordId, user_id: &str) -> Option<&str> {
        self.data
            .members
            .iter()
            .find(|m| &m.project_id == project_id && m.user_id == user_id)
            .map(|m| m.role.as_str())
    }

    /// Projects the user is a member of, in insertion order
    pub fn user_projects(&self, user_id: &str) -> Vec<&Project> {
        self.data
            .projects
            .iter()
            .filter(|p| {
                self.data
                    .members
                    .iter()
                    .any(|m| m.project_id == p.id && m.user_id == user_id)
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // projects

    /// Create a project; the creator becomes its administrator member
    pub fn add_project(&mut self, draft: ProjectDraft, actor: &str) -> Result<Project, StoreError> {
        require(&draft.name, "project name")?;
        require(actor, "user id")?;
        if draft.contract_value < 0.0 {
            return Err(StoreError::Validation(
                "contract value cannot be negative".to_string(),
            ));
        }

        let now = Utc::now();
        let project = Project {
            id: self.allocate(Kind::Project)?,
            name: draft.name,
            job_number: draft.job_number,
            address: draft.address,
            city: draft.city,
            state: draft.state,
            zip: draft.zip,
            county: draft.county,
            stage: draft.stage,
            sector: draft.sector,
            contract_value: draft.contract_value,
            description: draft.description,
            start_date: draft.start_date,
            actual_start_date: None,
            completion_date: draft.completion_date,
            projected_finish_date: None,
            warranty_start_date: None,
            warranty_end_date: None,
            created_at: now,
        };
        let member = ProjectMember {
            id: self.allocate(Kind::Member)?,
            project_id: project.id.clone(),
            user_id: actor.to_string(),
            role: ADMINISTRATOR.to_string(),
            created_at: now,
        };

        let mut batch = vec![
            Op::Insert(Record::Project(project.clone())),
            Op::Insert(Record::Member(member)),
        ];
        batch.extend(self.journal(
            &project.id,
            ActivityKind::Project,
            "created",
            format!("Project \"{}\" created", project.name),
            actor,
        )?);
        self.commit(batch)?;
        Ok(project)
    }

    pub fn update_project(
        &mut self,
        id: &RecordId,
        patch: ProjectPatch,
        actor: &str,
    ) -> Result<Project, StoreError> {
        if let Some(name) = &patch.name {
            require(name, "project name")?;
        }
        if matches!(patch.contract_value, Some(v) if v < 0.0) {
            return Err(StoreError::Validation(
                "contract value cannot be negative".to_string(),
            ));
        }

        let mut project = self.project(id)?.clone();
        patch.apply(&mut project);

        let mut batch = vec![Op::Update(Record::Project(project.clone()))];
        batch.extend(self.journal(
            id,
            ActivityKind::Project,
            "updated",
            "Project information updated".to_string(),
            actor,
        )?);
        self.commit(batch)?;
        Ok(project)
    }

    /// Delete a project and every record scoped to it
    pub fn delete_project(&mut self, id: &RecordId) -> Result<Project, StoreError> {
        let project = self.project(id)?.clone();
        self.commit(vec![Op::PurgeProject(id.clone())])?;
        Ok(project)
    }

    // -----------------------------------------------------------------------
    // members

    /// Add a member, or update the role if the (project, user) pair exists
    pub fn add_member(
        &mut self,
        project_id: &RecordId,
        user_id: &str,
        role: &str,
    ) -> Result<ProjectMember, StoreError> {
        require(user_id, "user id")?;
        require(role, "role")?;
        self.project(project_id)?;

        let existing = self
            .data
            .members
            .iter()
            .find(|m| &m.project_id == project_id && m.user_id == user_id)
            .cloned();

        let member = match existing {
            Some(mut member) => {
                member.role = role.to_string();
                self.commit(vec![Op::Update(Record::Member(member.clone()))])?;
                member
            }
            None => {
                let member = ProjectMember {
                    id: self.allocate(Kind::Member)?,
                    project_id: project_id.clone(),
                    user_id: user_id.to_string(),
                    role: role.to_string(),
                    created_at: Utc::now(),
                };
                self.commit(vec![Op::Insert(Record::Member(member.clone()))])?;
                member
            }
        };
        Ok(member)
    }

    pub fn remove_member(
        &mut self,
        project_id: &RecordId,
        user_id: &str,
    ) -> Result<ProjectMember, StoreError> {
        let member = self
            .data
            .members
            .iter()
            .find(|m| &m.project_id == project_id && m.user_id == user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: Kind::Member,
                id: user_id.to_string(),
            })?;
        self.commit(vec![Op::Delete(Kind::Member, member.id.clone())])?;
        Ok(member)
    }

    // -----------------------------------------------------------------------
    // directory

    pub fn add_dir_user(
        &mut self,
        project_id: &RecordId,
        draft: DirectoryUserDraft,
    ) -> Result<DirectoryUser, StoreError> {
        require(&draft.email, "email")?;
        self.project(project_id)?;

        let user = DirectoryUser {
            id: self.allocate(Kind::DirUser)?,
            project_id: project_id.clone(),
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            permission: draft.permission,
            created_at: Utc::now(),
        };
        self.commit(vec![Op::Insert(Record::DirUser(user.clone()))])?;
        Ok(user)
    }

    pub fn update_dir_user(
        &mut self,
        id: &RecordId,
        patch: DirectoryUserPatch,
    ) -> Result<DirectoryUser, StoreError> {
        if let Some(email) = &patch.email {
            require(email, "email")?;
        }
        let mut user = self.dir_user(id)?.clone();
        patch.apply(&mut user);
        self.commit(vec![Op::Update(Record::DirUser(user.clone()))])?;
        Ok(user)
    }

    pub fn delete_dir_user(&mut self, id: &RecordId) -> Result<DirectoryUser, StoreError> {
        let user = self.dir_user(id)?.clone();
        self.commit(vec![Op::Delete(Kind::DirUser, id.clone())])?;
        Ok(user)
    }

    pub fn add_dir_company(
        &mut self,
        project_id: &RecordId,
        draft: DirectoryCompanyDraft,
    ) -> Result<DirectoryCompany, StoreError> {
        require(&draft.name, "company name")?;
        self.project(project_id)?;

        let company = DirectoryCompany {
            id: self.allocate(Kind::DirCompany)?,
            project_id: project_id.clone(),
            name: draft.name,
            company_type: draft.company_type,
            contact: draft.contact,
            email: draft.email,
            phone: draft.phone,
            created_at: Utc::now(),
        };
        self.commit(vec![Op::Insert(Record::DirCompany(company.clone()))])?;
        Ok(company)
    }

    pub fn update_dir_company(
        &mut self,
        id: &RecordId,
        patch: DirectoryCompanyPatch,
    ) -> Result<DirectoryCompany, StoreError> {
        if let Some(name) = &patch.name {
            require(name, "company name")?;
        }
        let mut company = self.dir_company(id)?.clone();
        patch.apply(&mut company);
        self.commit(vec![Op::Update(Record::DirCompany(company.clone()))])?;
        Ok(company)
    }

    pub fn delete_dir_company(&mut self, id: &RecordId) -> Result<DirectoryCompany, StoreError> {
        let company = self.dir_company(id)?.clone();
        self.commit(vec![Op::Delete(Kind::DirCompany, id.clone())])?;
        Ok(company)
    }

    // -----------------------------------------------------------------------
    // distribution groups

    pub fn add_group(
        &mut self,
        project_id: &RecordId,
        draft: DistributionGroupDraft,
    ) -> Result<DistributionGroup, StoreError> {
        require(&draft.name, "group name")?;
        self.project(project_id)?;

        let group = DistributionGroup {
            id: self.allocate(Kind::DistGroup)?,
            project_id: project_id.clone(),
            name: draft.name,
            member_ids: draft.member_ids,
            created_at: Utc::now(),
        };
        self.commit(vec![Op::Insert(Record::DistGroup(group.clone()))])?;
        Ok(group)
    }

    pub fn update_group(
        &mut self,
        id: &RecordId,
        patch: DistributionGroupPatch,
    ) -> Result<DistributionGroup, StoreError> {
        if let Some(name) = &patch.name {
            require(name, "group name")?;
        }
        let mut group = self.group(id)?.clone();
        patch.apply(&mut group);
        self.commit(vec![Op::Update(Record::DistGroup(group.clone()))])?;
        Ok(group)
    }

    pub fn delete_group(&mut self, id: &RecordId) -> Result<DistributionGroup, StoreError> {
        let group = self.group(id)?.clone();
        self.commit(vec![Op::Delete(Kind::DistGroup, id.clone())])?;
        Ok(group)
    }

    // -----------------------------------------------------------------------
    // documents

    /// A non-root destination must be a folder in the same project
    fn check_destination(
        &self,
        project_id: &RecordId,
        parent_id: &RecordId,
    ) -> Result<(), StoreError> {
        let parent = self.document(parent_id)?;
        if !parent.is_folder() {
            return Err(StoreError::InvalidOperation(
                "destination is not a folder".to_string(),
            ));
        }
        if &parent.project_id != project_id {
            return Err(StoreError::InvalidOperation(
                "destination folder belongs to a different project".to_string(),
            ));
        }
        Ok(())
    }

    pub fn add_folder(
        &mut self,
        project_id: &RecordId,
        parent_id: Option<&RecordId>,
        name: &str,
    ) -> Result<Document, StoreError> {
        require(name, "folder name")?;
        self.project(project_id)?;
        if let Some(parent) = parent_id {
            self.check_destination(project_id, parent)?;
        }

        let folder = Document {
            id: self.allocate(Kind::Document)?,
            project_id: project_id.clone(),
            parent_id: parent_id.cloned(),
            name: name.trim().to_string(),
            kind: DocumentKind::Folder,
            file_data: None,
            created_at: Utc::now(),
        };
        self.commit(vec![Op::Insert(Record::Document(folder.clone()))])?;
        Ok(folder)
    }

    pub fn add_file(
        &mut self,
        project_id: &RecordId,
        parent_id: Option<&RecordId>,
        payload: FilePayload,
    ) -> Result<Document, StoreError> {
        require(&payload.name, "file name")?;
        self.project(project_id)?;
        if let Some(parent) = parent_id {
            self.check_destination(project_id, parent)?;
        }

        let file = Document {
            id: self.allocate(Kind::Document)?,
            project_id: project_id.clone(),
            parent_id: parent_id.cloned(),
            name: payload.name.clone(),
            kind: DocumentKind::File,
            file_data: Some(payload),
            created_at: Utc::now(),
        };
        self.commit(vec![Op::Insert(Record::Document(file.clone()))])?;
        Ok(file)
    }

    pub fn rename_document(&mut self, id: &RecordId, name: &str) -> Result<Document, StoreError> {
        require(name, "document name")?;
        let mut doc = self.document(id)?.clone();
        doc.name = name.trim().to_string();
        self.commit(vec![Op::Update(Record::Document(doc.clone()))])?;
        Ok(doc)
    }

    /// Reparent a node; rejected if the destination sits inside its subtree
    pub fn move_document(
        &mut self,
        id: &RecordId,
        new_parent_id: Option<&RecordId>,
    ) -> Result<Document, StoreError> {
        let mut doc = self.document(id)?.clone();
        if let Some(parent) = new_parent_id {
            self.check_destination(&doc.project_id, parent)?;
            if tree::would_create_cycle(&self.data.documents, id, parent) {
                return Err(StoreError::InvalidOperation(
                    "cannot move a folder into its own subtree".to_string(),
                ));
            }
        }

        doc.parent_id = new_parent_id.cloned();
        self.commit(vec![Op::Update(Record::Document(doc.clone()))])?;
        Ok(doc)
    }

    /// Delete a node and every descendant; returns the removed nodes
    pub fn delete_document(&mut self, id: &RecordId) -> Result<Vec<Document>, StoreError> {
        self.document(id)?;
        let removed: Vec<Document> = tree::collect_subtree(&self.data.documents, id)
            .into_iter()
            .cloned()
            .collect();

        let batch = removed
            .iter()
            .map(|d| Op::Delete(Kind::Document, d.id.clone()))
            .collect();
        self.commit(batch)?;
        Ok(removed)
    }

    /// Deep-copy a subtree under a new parent; returns the clones, root first
    ///
    /// The cloned root is renamed with a " (copy)" suffix. File contents are
    /// shared by digest, so no blob data moves.
    pub fn copy_document(
        &mut self,
        id: &RecordId,
        new_parent_id: Option<&RecordId>,
    ) -> Result<Vec<Document>, StoreError> {
        let doc = self.document(id)?.clone();
        if let Some(parent) = new_parent_id {
            self.check_destination(&doc.project_id, parent)?;
            if tree::would_create_cycle(&self.data.documents, id, parent) {
                return Err(StoreError::InvalidOperation(
                    "cannot copy a folder into its own subtree".to_string(),
                ));
            }
        }

        let subtree: Vec<Document> = tree::collect_subtree(&self.data.documents, id)
            .into_iter()
            .cloned()
            .collect();
        let mut new_ids = Vec::with_capacity(subtree.len());
        for _ in 0..subtree.len() {
            new_ids.push(self.allocate(Kind::Document)?);
        }

        let originals: Vec<&Document> = subtree.iter().collect();
        let clones = tree::clone_subtree(&originals, &new_ids, new_parent_id.cloned(), Utc::now());

        let batch = clones
            .iter()
            .map(|d| Op::Insert(Record::Document(d.clone())))
            .collect();
        self.commit(batch)?;
        Ok(clones)
    }

    // -----------------------------------------------------------------------
    // tasks

    pub fn add_task(
        &mut self,
        project_id: &RecordId,
        draft: TaskDraft,
        actor: &str,
    ) -> Result<Task, StoreError> {
        require(&draft.title, "task title")?;
        self.project(project_id)?;

        let number = sequence::assign(
            draft.number,
            self.data
                .tasks
                .iter()
                .filter(|t| &t.project_id == project_id)
                .map(|t| t.task_number),
        );
        let task = Task {
            id: self.allocate(Kind::Task)?,
            project_id: project_id.clone(),
            task_number: number,
            title: draft.title,
            status: draft.status,
            category: draft.category,
            description: draft.description,
            distribution_list: draft.distribution_list,
            attachments: draft.attachments,
            created_at: Utc::now(),
        };

        let mut batch = vec![Op::Insert(Record::Task(task.clone()))];
        batch.extend(self.journal(
            project_id,
            ActivityKind::Task,
            "created",
            format!("Task #{}: {}", task.task_number, task.title),
            actor,
        )?);
        self.commit(batch)?;
        Ok(task)
    }

    pub fn update_task(
        &mut self,
        id: &RecordId,
        patch: TaskPatch,
        actor: &str,
    ) -> Result<Task, StoreError> {
        if let Some(title) = &patch.title {
            require(title, "task title")?;
        }
        let mut task = self.task(id)?.clone();
        patch.apply(&mut task);

        let project_id = task.project_id.clone();
        let mut batch = vec![Op::Update(Record::Task(task.clone()))];
        batch.extend(self.journal(
            &project_id,
            ActivityKind::Task,
            "updated",
            format!("Task #{}: {} updated", task.task_number, task.title),
            actor,
        )?);
        self.commit(batch)?;
        Ok(task)
    }

    pub fn delete_task(&mut self, id: &RecordId) -> Result<Task, StoreError> {
        let task = self.task(id)?.clone();
        self.commit(vec![Op::Delete(Kind::Task, id.clone())])?;
        Ok(task)
    }

    // -----------------------------------------------------------------------
    // RFIs

    pub fn add_rfi(
        &mut self,
        project_id: &RecordId,
        draft: RfiDraft,
        actor: &str,
    ) -> Result<Rfi, StoreError> {
        require(&draft.subject, "RFI subject")?;
        check_subject_len(&draft.subject)?;
        self.project(project_id)?;

        let number = sequence::assign(
            draft.number,
            self.data
                .rfis
                .iter()
                .filter(|r| &r.project_id == project_id)
                .map(|r| r.rfi_number),
        );
        let rfi = Rfi {
            id: self.allocate(Kind::Rfi)?,
            project_id: project_id.clone(),
            rfi_number: number,
            subject: draft.subject,
            question: draft.question,
            status: draft.status,
            due_date: draft.due_date,
            rfi_manager: draft.rfi_manager,
            received_from: draft.received_from,
            assignees: draft.assignees,
            distribution_list: draft.distribution_list,
            responsible_contractor: draft.responsible_contractor,
            specification: draft.specification,
            drawing_number: draft.drawing_number,
            attachments: draft.attachments,
            responses: Vec::new(),
            created_at: Utc::now(),
        };

        let mut batch = vec![Op::Insert(Record::Rfi(rfi.clone()))];
        batch.extend(self.journal(
            project_id,
            ActivityKind::Rfi,
            "created",
            format!("RFI #{}: {}", rfi.rfi_number, rfi.subject),
            actor,
        )?);
        self.commit(batch)?;
        Ok(rfi)
    }

    pub fn update_rfi(
        &mut self,
        id: &RecordId,
        patch: RfiPatch,
        actor: &str,
    ) -> Result<Rfi, StoreError> {
        if let Some(subject) = &patch.subject {
            require(subject, "RFI subject")?;
            check_subject_len(subject)?;
        }
        let mut rfi = self.rfi(id)?.clone();
        patch.apply(&mut rfi);

        let project_id = rfi.project_id.clone();
        let mut batch = vec![Op::Update(Record::Rfi(rfi.clone()))];
        batch.extend(self.journal(
            &project_id,
            ActivityKind::Rfi,
            "updated",
            format!("RFI #{}: {} updated", rfi.rfi_number, rfi.subject),
            actor,
        )?);
        self.commit(batch)?;
        Ok(rfi)
    }

    /// Append a response to an RFI's thread
    pub fn add_rfi_response(
        &mut self,
        id: &RecordId,
        text: &str,
        author: &str,
    ) -> Result<Rfi, StoreError> {
        require(text, "response text")?;
        let mut rfi = self.rfi(id)?.clone();
        rfi.responses.push(RfiResponse {
            id: RecordId::generate(),
            author_id: author.to_string(),
            text: text.trim().to_string(),
            created_at: Utc::now(),
        });

        let project_id = rfi.project_id.clone();
        let mut batch = vec![Op::Update(Record::Rfi(rfi.clone()))];
        batch.extend(self.journal(
            &project_id,
            ActivityKind::Rfi,
            "response",
            format!("RFI #{} received a response", rfi.rfi_number),
            author,
        )?);
        self.commit(batch)?;
        Ok(rfi)
    }

    pub fn delete_rfi(&mut self, id: &RecordId) -> Result<Rfi, StoreError> {
        let rfi = self.rfi(id)?.clone();
        self.commit(vec![Op::Delete(Kind::Rfi, id.clone())])?;
        Ok(rfi)
    }

    // -----------------------------------------------------------------------
    // submittals

    pub fn add_submittal(
        &mut self,
        project_id: &RecordId,
        draft: SubmittalDraft,
        actor: &str,
    ) -> Result<Submittal, StoreError> {
        require(&draft.title, "submittal title")?;
        self.project(project_id)?;

        let number = sequence::assign(
            draft.number,
            self.data
                .submittals
                .iter()
                .filter(|s| &s.project_id == project_id)
                .map(|s| s.submittal_number),
        );
        let submittal = Submittal {
            id: self.allocate(Kind::Submittal)?,
            project_id: project_id.clone(),
            submittal_number: number,
            title: draft.title,
            status: draft.status,
            submittal_type: draft.submittal_type,
            spec_section: draft.spec_section,
            due_date: draft.due_date,
            assignee: draft.assignee,
            description: draft.description,
            created_at: Utc::now(),
        };

        let mut batch = vec![Op::Insert(Record::Submittal(submittal.clone()))];
        batch.extend(self.journal(
            project_id,
            ActivityKind::Submittal,
            "created",
            format!("Submittal #{}: {}", submittal.submittal_number, submittal.title),
            actor,
        )?);
        self.commit(batch)?;
        Ok(submittal)
    }

    pub fn update_submittal(
        &mut self,
        id: &RecordId,
        patch: SubmittalPatch,
        actor: &str,
    ) -> Result<Submittal, StoreError> {
        if let Some(title) = &patch.title {
            require(title, "submittal title")?;
        }
        let mut submittal = self.submittal(id)?.clone();
        patch.apply(&mut submittal);

        let project_id = submittal.project_id.clone();
        let mut batch = vec![Op::Update(Record::Submittal(submittal.clone()))];
        batch.extend(self.journal(
            &project_id,
            ActivityKind::Submittal,
            "updated",
            format!("Submittal #{} updated", submittal.submittal_number),
            actor,
        )?);
        self.commit(batch)?;
        Ok(submittal)
    }

    pub fn delete_submittal(&mut self, id: &RecordId) -> Result<Submittal, StoreError> {
        let submittal = self.submittal(id)?.clone();
        self.commit(vec![Op::Delete(Kind::Submittal, id.clone())])?;
        Ok(submittal)
    }

    // -----------------------------------------------------------------------
    // specifications

    pub fn add_specification(
        &mut self,
        project_id: &RecordId,
        number: &str,
        title: &str,
    ) -> Result<Specification, StoreError> {
        require(number, "section number")?;
        require(title, "section title")?;
        self.project(project_id)?;

        let spec = Specification {
            id: self.allocate(Kind::Specification)?,
            project_id: project_id.clone(),
            number: number.trim().to_string(),
            title: title.trim().to_string(),
            created_at: Utc::now(),
        };
        self.commit(vec![Op::Insert(Record::Specification(spec.clone()))])?;
        Ok(spec)
    }

    pub fn update_specification(
        &mut self,
        id: &RecordId,
        patch: SpecificationPatch,
    ) -> Result<Specification, StoreError> {
        if let Some(number) = &patch.number {
            require(number, "section number")?;
        }
        if let Some(title) = &patch.title {
            require(title, "section title")?;
        }
        let mut spec = self.specification(id)?.clone();
        patch.apply(&mut spec);
        self.commit(vec![Op::Update(Record::Specification(spec.clone()))])?;
        Ok(spec)
    }

    pub fn delete_specification(&mut self, id: &RecordId) -> Result<Specification, StoreError> {
        let spec = self.specification(id)?.clone();
        self.commit(vec![Op::Delete(Kind::Specification, id.clone())])?;
        Ok(spec)
    }
}

fn find<'a, T>(
    items: &'a [T],
    kind: Kind,
    id: &RecordId,
    key: impl Fn(&T) -> &RecordId,
) -> Result<&'a T, StoreError> {
    items
        .iter()
        .find(|item| key(item) == id)
        .ok_or_else(|| StoreError::NotFound {
            kind,
            id: id.to_string(),
        })
}

fn scoped<'a, T>(
    items: &'a [T],
    project_id: &RecordId,
    key: impl Fn(&T) -> &RecordId,
) -> Vec<&'a T> {
    items.iter().filter(|item| key(item) == project_id).collect()
}

fn require(value: &str, what: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation(format!("{} is required", what)));
    }
    Ok(())
}

fn check_subject_len(subject: &str) -> Result<(), StoreError> {
    if subject.chars().count() > MAX_SUBJECT_LEN {
        return Err(StoreError::Validation(format!(
            "RFI subject is limited to {} characters",
            MAX_SUBJECT_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStore;
    use tempfile::TempDir;

    fn open_store(tmp: &TempDir) -> Store {
        let backend = LocalStore::open(tmp.path().join("data")).unwrap();
        Store::open(Box::new(backend)).unwrap()
    }

    fn tower_a(store: &mut Store) -> Project {
        store
            .add_project(
                ProjectDraft {
                    name: "Tower A".to_string(),
                    ..Default::default()
                },
                "u1",
            )
            .unwrap()
    }

    #[test]
    fn test_creator_becomes_administrator() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let project = tower_a(&mut store);

        assert_eq!(store.project_role(&project.id, "u1"), Some(ADMINISTRATOR));
        assert_eq!(store.user_projects("u1").len(), 1);
        assert!(store.user_projects("u2").is_empty());

        let feed = store.activity();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].details, "Project \"Tower A\" created");
        assert_eq!(feed[0].action, "created");
        assert_eq!(feed[0].user_id, "u1");
    }

    #[test]
    fn test_blank_project_name_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let err = store
            .add_project(
                ProjectDraft {
                    name: "   ".to_string(),
                    ..Default::default()
                },
                "u1",
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.projects().is_empty());
        assert!(store.activity().is_empty());
    }

    #[test]
    fn test_negative_contract_value_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let err = store
            .add_project(
                ProjectDraft {
                    name: "Tower A".to_string(),
                    contract_value: -5.0,
                    ..Default::default()
                },
                "u1",
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn test_update_project_journals_fixed_message() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let project = tower_a(&mut store);

        let updated = store
            .update_project(
                &project.id,
                ProjectPatch {
                    city: Some("Denver".to_string()),
                    ..Default::default()
                },
                "u1",
            )
            .unwrap();
        assert_eq!(updated.city, "Denver");
        assert_eq!(updated.name, "Tower A");
        assert_eq!(store.activity()[0].details, "Project information updated");
    }

    #[test]
    fn test_update_missing_project_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let err = store
            .update_project(
                &RecordId::generate(),
                ProjectPatch::default(),
                "u1",
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_delete_project_cascades_everything() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let keep = tower_a(&mut store);
        let doomed = store
            .add_project(
                ProjectDraft {
                    name: "Tower B".to_string(),
                    ..Default::default()
                },
                "u1",
            )
            .unwrap();

        for project in [&keep, &doomed] {
            store
                .add_task(
                    &project.id,
                    TaskDraft {
                        title: "Pour slab".to_string(),
                        ..Default::default()
                    },
                    "u1",
                )
                .unwrap();
            store
                .add_rfi(
                    &project.id,
                    RfiDraft {
                        subject: "Window detail".to_string(),
                        ..Default::default()
                    },
                    "u1",
                )
                .unwrap();
            store.add_folder(&project.id, None, "Drawings").unwrap();
            store
                .add_dir_user(
                    &project.id,
                    DirectoryUserDraft {
                        email: "pm@example.com".to_string(),
                        ..Default::default()
                    },
                )
                .unwrap();
        }

        store.delete_project(&doomed.id).unwrap();

        assert_eq!(store.projects().len(), 1);
        assert!(store.project_tasks(&doomed.id).is_empty());
        assert!(store.project_rfis(&doomed.id).is_empty());
        assert!(store.project_documents(&doomed.id).is_empty());
        assert!(store.project_dir_users(&doomed.id).is_empty());
        assert!(store.project_members(&doomed.id).is_empty());
        assert!(store.project_activity(&doomed.id).is_empty());

        // The surviving project is untouched
        assert_eq!(store.project_tasks(&keep.id).len(), 1);
        assert_eq!(store.project_members(&keep.id).len(), 1);
    }

    #[test]
    fn test_rfi_numbers_are_never_reused() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let project = tower_a(&mut store);

        let first = store
            .add_rfi(
                &project.id,
                RfiDraft {
                    subject: "Window detail".to_string(),
                    ..Default::default()
                },
                "u1",
            )
            .unwrap();
        let second = store
            .add_rfi(
                &project.id,
                RfiDraft {
                    subject: "Door schedule".to_string(),
                    ..Default::default()
                },
                "u1",
            )
            .unwrap();
        assert_eq!(first.rfi_number, 1);
        assert_eq!(second.rfi_number, 2);

        store.delete_rfi(&first.id).unwrap();
        let third = store
            .add_rfi(
                &project.id,
                RfiDraft {
                    subject: "Roof flashing".to_string(),
                    ..Default::default()
                },
                "u1",
            )
            .unwrap();
        assert_eq!(third.rfi_number, 3);
    }

    #[test]
    fn test_numbers_count_per_project() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let a = tower_a(&mut store);
        let b = store
            .add_project(
                ProjectDraft {
                    name: "Tower B".to_string(),
                    ..Default::default()
                },
                "u1",
            )
            .unwrap();

        let t1 = store
            .add_task(
                &a.id,
                TaskDraft {
                    title: "one".to_string(),
                    ..Default::default()
                },
                "u1",
            )
            .unwrap();
        let t2 = store
            .add_task(
                &b.id,
                TaskDraft {
                    title: "two".to_string(),
                    ..Default::default()
                },
                "u1",
            )
            .unwrap();
        assert_eq!(t1.task_number, 1);
        assert_eq!(t2.task_number, 1);
    }

    #[test]
    fn test_explicit_number_is_kept() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let project = tower_a(&mut store);

        let task = store
            .add_task(
                &project.id,
                TaskDraft {
                    number: Some(40),
                    title: "Punch list".to_string(),
                    ..Default::default()
                },
                "u1",
            )
            .unwrap();
        assert_eq!(task.task_number, 40);

        let next = store
            .add_task(
                &project.id,
                TaskDraft {
                    title: "Final clean".to_string(),
                    ..Default::default()
                },
                "u1",
            )
            .unwrap();
        assert_eq!(next.task_number, 41);
    }

    #[test]
    fn test_task_journal_strings() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let project = tower_a(&mut store);

        let task = store
            .add_task(
                &project.id,
                TaskDraft {
                    title: "Pour slab".to_string(),
                    ..Default::default()
                },
                "u1",
            )
            .unwrap();
        assert_eq!(store.activity()[0].details, "Task #1: Pour slab");

        store
            .update_task(
                &task.id,
                TaskPatch {
                    status: Some(crate::entities::TaskStatus::Closed),
                    ..Default::default()
                },
                "u1",
            )
            .unwrap();
        assert_eq!(store.activity()[0].details, "Task #1: Pour slab updated");
        assert_eq!(store.activity()[0].action, "updated");

        // Deletes are not journaled
        let before = store.activity().len();
        store.delete_task(&task.id).unwrap();
        assert_eq!(store.activity().len(), before);
    }

    #[test]
    fn test_member_upsert_updates_role_in_place() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let project = tower_a(&mut store);

        store.add_member(&project.id, "u2", "viewer").unwrap();
        assert_eq!(store.project_members(&project.id).len(), 2);

        store.add_member(&project.id, "u2", ADMINISTRATOR).unwrap();
        let members = store.project_members(&project.id);
        assert_eq!(members.len(), 2);
        assert_eq!(store.project_role(&project.id, "u2"), Some(ADMINISTRATOR));
    }

    #[test]
    fn test_remove_member() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let project = tower_a(&mut store);
        store.add_member(&project.id, "u2", "viewer").unwrap();

        store.remove_member(&project.id, "u2").unwrap();
        assert_eq!(store.project_role(&project.id, "u2"), None);

        let err = store.remove_member(&project.id, "u2").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_recursive_delete_takes_the_whole_subtree() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let project = tower_a(&mut store);

        let drawings = store.add_folder(&project.id, None, "Drawings").unwrap();
        let structural = store
            .add_folder(&project.id, Some(&drawings.id), "Structural")
            .unwrap();
        store
            .add_file(
                &project.id,
                Some(&structural.id),
                FilePayload {
                    name: "S-101.pdf".to_string(),
                    size: 10,
                    content_type: "application/pdf".to_string(),
                    digest: "ab".repeat(32),
                },
            )
            .unwrap();
        let photos = store.add_folder(&project.id, None, "Photos").unwrap();

        let removed = store.delete_document(&drawings.id).unwrap();
        assert_eq!(removed.len(), 3);

        let remaining = store.project_documents(&project.id);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, photos.id);
    }

    #[test]
    fn test_copy_rewires_descendants_to_clones() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let project = tower_a(&mut store);

        let drawings = store.add_folder(&project.id, None, "Drawings").unwrap();
        let structural = store
            .add_folder(&project.id, Some(&drawings.id), "Structural")
            .unwrap();
        let file = store
            .add_file(
                &project.id,
                Some(&structural.id),
                FilePayload {
                    name: "S-101.pdf".to_string(),
                    size: 10,
                    content_type: "application/pdf".to_string(),
                    digest: "ab".repeat(32),
                },
            )
            .unwrap();

        let clones = store.copy_document(&structural.id, None).unwrap();
        assert_eq!(clones.len(), 2);
        assert_eq!(clones[0].name, "Structural (copy)");
        assert!(clones[0].parent_id.is_none());
        assert_eq!(clones[1].name, "S-101.pdf");
        assert_eq!(clones[1].parent_id.as_ref(), Some(&clones[0].id));
        assert_ne!(clones[1].id, file.id);

        // Originals untouched
        assert_eq!(
            store.document(&file.id).unwrap().parent_id.as_ref(),
            Some(&structural.id)
        );
        assert_eq!(store.project_documents(&project.id).len(), 5);
    }

    #[test]
    fn test_move_into_own_subtree_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let project = tower_a(&mut store);

        let drawings = store.add_folder(&project.id, None, "Drawings").unwrap();
        let structural = store
            .add_folder(&project.id, Some(&drawings.id), "Structural")
            .unwrap();

        let err = store
            .move_document(&drawings.id, Some(&structural.id))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidOperation(_)));

        // Still where it was
        assert!(store.document(&drawings.id).unwrap().parent_id.is_none());
    }

    #[test]
    fn test_move_changes_only_the_moved_node() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let project = tower_a(&mut store);

        let drawings = store.add_folder(&project.id, None, "Drawings").unwrap();
        let photos = store.add_folder(&project.id, None, "Photos").unwrap();
        let site = store
            .add_folder(&project.id, Some(&photos.id), "Site")
            .unwrap();

        store.move_document(&photos.id, Some(&drawings.id)).unwrap();

        assert_eq!(
            store.document(&photos.id).unwrap().parent_id.as_ref(),
            Some(&drawings.id)
        );
        assert_eq!(
            store.document(&site.id).unwrap().parent_id.as_ref(),
            Some(&photos.id)
        );
        assert!(store.document(&drawings.id).unwrap().parent_id.is_none());
    }

    #[test]
    fn test_files_cannot_contain_children() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let project = tower_a(&mut store);

        let file = store
            .add_file(
                &project.id,
                None,
                FilePayload {
                    name: "notes.txt".to_string(),
                    size: 1,
                    content_type: "text/plain".to_string(),
                    digest: "cd".repeat(32),
                },
            )
            .unwrap();

        let err = store
            .add_folder(&project.id, Some(&file.id), "Inside")
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidOperation(_)));
    }

    #[test]
    fn test_breadcrumb_walks_to_the_root() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let project = tower_a(&mut store);

        let drawings = store.add_folder(&project.id, None, "Drawings").unwrap();
        let structural = store
            .add_folder(&project.id, Some(&drawings.id), "Structural")
            .unwrap();

        let trail: Vec<_> = store
            .breadcrumb(&structural.id)
            .iter()
            .map(|d| d.name.clone())
            .collect();
        assert_eq!(trail, vec!["Drawings", "Structural"]);
    }

    #[test]
    fn test_rfi_response_appends_and_journals() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let project = tower_a(&mut store);

        let rfi = store
            .add_rfi(
                &project.id,
                RfiDraft {
                    subject: "Window detail".to_string(),
                    ..Default::default()
                },
                "u1",
            )
            .unwrap();

        let updated = store
            .add_rfi_response(&rfi.id, "See detail 5/A-501", "u2")
            .unwrap();
        assert_eq!(updated.responses.len(), 1);
        assert_eq!(updated.responses[0].author_id, "u2");

        let feed = store.activity();
        assert_eq!(feed[0].action, "response");
        assert_eq!(feed[0].details, "RFI #1 received a response");
    }

    #[test]
    fn test_subject_length_cap() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let project = tower_a(&mut store);

        let err = store
            .add_rfi(
                &project.id,
                RfiDraft {
                    subject: "x".repeat(MAX_SUBJECT_LEN + 1),
                    ..Default::default()
                },
                "u1",
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn test_submittal_update_journal_has_no_title() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let project = tower_a(&mut store);

        let submittal = store
            .add_submittal(
                &project.id,
                SubmittalDraft {
                    title: "Rebar shop drawings".to_string(),
                    ..Default::default()
                },
                "u1",
            )
            .unwrap();
        assert_eq!(store.activity()[0].details, "Submittal #1: Rebar shop drawings");

        store
            .update_submittal(
                &submittal.id,
                SubmittalPatch {
                    spec_section: Some("03 20 00".to_string()),
                    ..Default::default()
                },
                "u1",
            )
            .unwrap();
        assert_eq!(store.activity()[0].details, "Submittal #1 updated");
    }

    #[test]
    fn test_feed_caps_at_five_hundred() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let project = tower_a(&mut store);

        for n in 0..ACTIVITY_CAP + 5 {
            store
                .add_task(
                    &project.id,
                    TaskDraft {
                        title: format!("task {}", n),
                        ..Default::default()
                    },
                    "u1",
                )
                .unwrap();
        }

        let feed = store.activity();
        assert_eq!(feed.len(), ACTIVITY_CAP);
        // Newest first; the project-created entry has long since rolled off
        assert_eq!(feed[0].details, format!("Task #{}: task {}", ACTIVITY_CAP + 5, ACTIVITY_CAP + 4));
        assert!(!feed.iter().any(|a| a.details.starts_with("Project \"")));
    }

    #[test]
    fn test_specifications_sort_numerically() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let project = tower_a(&mut store);

        store
            .add_specification(&project.id, "10 11 00", "Visual Display Units")
            .unwrap();
        store
            .add_specification(&project.id, "03 30 00", "Cast-in-Place Concrete")
            .unwrap();
        store
            .add_specification(&project.id, "09 91 13", "Exterior Painting")
            .unwrap();

        let numbers: Vec<_> = store
            .project_specifications(&project.id)
            .iter()
            .map(|s| s.number.clone())
            .collect();
        assert_eq!(numbers, vec!["03 30 00", "09 91 13", "10 11 00"]);
    }

    #[test]
    fn test_deleting_directory_user_leaves_dangling_references() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let project = tower_a(&mut store);

        let user = store
            .add_dir_user(
                &project.id,
                DirectoryUserDraft {
                    first_name: "Dana".to_string(),
                    email: "dana@example.com".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
        let group = store
            .add_group(
                &project.id,
                DistributionGroupDraft {
                    name: "Field team".to_string(),
                    member_ids: vec![user.id.clone()],
                },
            )
            .unwrap();

        store.delete_dir_user(&user.id).unwrap();

        // Membership lists are not cleaned up; readers render a placeholder
        let group = store.group(&group.id).unwrap();
        assert_eq!(group.member_ids, vec![user.id.clone()]);
        assert!(store.dir_user(&user.id).is_err());
    }

    /// Flatten a store into a backend-independent description: everything
    /// except id values and timestamps.
    fn logical_state(store: &Store) -> Vec<String> {
        let mut out = Vec::new();
        for project in store.projects() {
            out.push(format!("project {}", project.name));
            let mut members: Vec<String> = store
                .project_members(&project.id)
                .iter()
                .map(|m| format!("member {} {}", m.user_id, m.role))
                .collect();
            members.sort();
            out.extend(members);
            for task in store.project_tasks(&project.id) {
                out.push(format!("task #{} {} [{}]", task.task_number, task.title, task.status));
            }
            for rfi in store.project_rfis(&project.id) {
                out.push(format!(
                    "rfi #{} {} ({} responses)",
                    rfi.rfi_number,
                    rfi.subject,
                    rfi.responses.len()
                ));
            }
            let mut docs: Vec<String> = store
                .project_documents(&project.id)
                .iter()
                .map(|d| {
                    let parent = d
                        .parent_id
                        .as_ref()
                        .and_then(|pid| store.document(pid).ok())
                        .map(|p| p.name.as_str())
                        .unwrap_or("<root>");
                    format!("doc {} {} under {}", d.kind, d.name, parent)
                })
                .collect();
            docs.sort();
            out.extend(docs);
        }
        for entry in store.activity() {
            out.push(format!("feed {} {}", entry.action, entry.details));
        }
        out
    }

    fn drive_sample_session(store: &mut Store) {
        let project = store
            .add_project(
                ProjectDraft {
                    name: "Tower A".to_string(),
                    ..Default::default()
                },
                "u1",
            )
            .unwrap();
        store.add_member(&project.id, "u2", "engineer").unwrap();
        store.add_member(&project.id, "u2", "superintendent").unwrap();

        let first = store
            .add_task(
                &project.id,
                TaskDraft {
                    title: "Pour slab".to_string(),
                    ..Default::default()
                },
                "u1",
            )
            .unwrap();
        store
            .add_task(
                &project.id,
                TaskDraft {
                    title: "Strip forms".to_string(),
                    ..Default::default()
                },
                "u1",
            )
            .unwrap();
        store.delete_task(&first.id).unwrap();
        store
            .add_task(
                &project.id,
                TaskDraft {
                    title: "Cure test".to_string(),
                    ..Default::default()
                },
                "u1",
            )
            .unwrap();

        let drawings = store.add_folder(&project.id, None, "Drawings").unwrap();
        store
            .add_folder(&project.id, Some(&drawings.id), "Structural")
            .unwrap();
        store.copy_document(&drawings.id, None).unwrap();

        let rfi = store
            .add_rfi(
                &project.id,
                RfiDraft {
                    subject: "Footing depth".to_string(),
                    ..Default::default()
                },
                "u1",
            )
            .unwrap();
        store
            .add_rfi_response(&rfi.id, "See S-201 rev B", "u2")
            .unwrap();
    }

    #[test]
    fn test_backends_agree_on_logical_state() {
        use crate::storage::SqliteStore;

        let local_tmp = TempDir::new().unwrap();
        let sqlite_tmp = TempDir::new().unwrap();
        let db_path = sqlite_tmp.path().join("sitedesk.db");

        let mut local = open_store(&local_tmp);
        let mut sqlite =
            Store::open(Box::new(SqliteStore::open(&db_path).unwrap())).unwrap();
        drive_sample_session(&mut local);
        drive_sample_session(&mut sqlite);
        assert_eq!(logical_state(&local), logical_state(&sqlite));

        // Reopening from disk lands both backends in that same state
        let local =
            Store::open(Box::new(LocalStore::open(local_tmp.path().join("data")).unwrap()))
                .unwrap();
        let sqlite = Store::open(Box::new(SqliteStore::open(&db_path).unwrap())).unwrap();
        assert_eq!(logical_state(&local), logical_state(&sqlite));
        assert!(!logical_state(&local).is_empty());
    }
}
