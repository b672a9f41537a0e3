//! Local blob storage
//!
//! One JSON file per collection under the workspace data directory, named
//! by the collection's fixed key (`projects.json`, `dir_users.json`, …).
//! The whole collection is rewritten on every change, mirroring how the
//! hosted application serialized each collection wholesale into browser
//! storage. Identifiers are generated client-side as ULIDs.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::identity::RecordId;
use crate::storage::{Backend, Kind, Op, Snapshot, StorageError};

/// Blob-per-collection backend
#[derive(Debug)]
pub struct LocalStore {
    dir: PathBuf,
    mirror: Snapshot,
}

impl LocalStore {
    /// Open the blob directory, creating it if needed, and read all
    /// collections into the mirror
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let mirror = read_snapshot(&dir)?;
        Ok(Self { dir, mirror })
    }

    fn blob_path(&self, kind: Kind) -> PathBuf {
        self.dir.join(format!("{}.json", kind.table()))
    }

    fn write_kind(&self, kind: Kind) -> Result<(), StorageError> {
        let path = self.blob_path(kind);
        match kind {
            Kind::Project => write_collection(&path, &self.mirror.projects),
            Kind::Member => write_collection(&path, &self.mirror.members),
            Kind::DirUser => write_collection(&path, &self.mirror.dir_users),
            Kind::DirCompany => write_collection(&path, &self.mirror.dir_companies),
            Kind::DistGroup => write_collection(&path, &self.mirror.dist_groups),
            Kind::Document => write_collection(&path, &self.mirror.documents),
            Kind::Task => write_collection(&path, &self.mirror.tasks),
            Kind::Rfi => write_collection(&path, &self.mirror.rfis),
            Kind::Submittal => write_collection(&path, &self.mirror.submittals),
            Kind::Specification => write_collection(&path, &self.mirror.specifications),
            Kind::Activity => write_collection(&path, &self.mirror.activity),
        }
    }
}

impl Backend for LocalStore {
    fn load(&mut self) -> Result<Snapshot, StorageError> {
        Ok(self.mirror.clone())
    }

    fn allocate_id(&mut self, _kind: Kind) -> Result<RecordId, StorageError> {
        Ok(RecordId::generate())
    }

    fn apply(&mut self, batch: &[Op]) -> Result<(), StorageError> {
        let mut touched: Vec<Kind> = Vec::new();
        let mut touch = |kinds: &[Kind], touched: &mut Vec<Kind>| {
            for kind in kinds {
                if !touched.contains(kind) {
                    touched.push(*kind);
                }
            }
        };

        for op in batch {
            self.mirror.apply(op);
            match op {
                Op::Insert(record) | Op::Update(record) => {
                    touch(&[record.kind()], &mut touched)
                }
                Op::Delete(kind, _) => touch(&[*kind], &mut touched),
                Op::PurgeProject(_) => touch(&Kind::ALL, &mut touched),
                Op::TrimFeed(_) => touch(&[Kind::Activity], &mut touched),
            }
        }

        for kind in touched {
            self.write_kind(kind)?;
        }
        Ok(())
    }
}

fn read_snapshot(dir: &Path) -> Result<Snapshot, StorageError> {
    Ok(Snapshot {
        projects: read_collection(&dir.join("projects.json"))?,
        members: read_collection(&dir.join("project_members.json"))?,
        dir_users: read_collection(&dir.join("dir_users.json"))?,
        dir_companies: read_collection(&dir.join("dir_companies.json"))?,
        dist_groups: read_collection(&dir.join("dist_groups.json"))?,
        documents: read_collection(&dir.join("documents.json"))?,
        tasks: read_collection(&dir.join("tasks.json"))?,
        rfis: read_collection(&dir.join("rfis.json"))?,
        submittals: read_collection(&dir.join("submittals.json"))?,
        specifications: read_collection(&dir.join("specifications.json"))?,
        activity: read_collection(&dir.join("activity_feed.json"))?,
    })
}

/// Missing files read as empty collections; corrupt files are surfaced
/// rather than silently replaced on the next write.
fn read_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StorageError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| StorageError::Corrupt(format!("{}: {}", path.display(), e)))
}

fn write_collection<T: Serialize>(path: &Path, items: &[T]) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(items)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ActivityKind, Task};
    use crate::storage::Record;
    use chrono::Utc;
    use tempfile::TempDir;

    fn task(project: &RecordId, id: RecordId, n: u32) -> Task {
        Task {
            id,
            project_id: project.clone(),
            task_number: n,
            title: format!("task {}", n),
            status: Default::default(),
            category: Default::default(),
            description: String::new(),
            distribution_list: Vec::new(),
            attachments: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_open_empty_directory() {
        let tmp = TempDir::new().unwrap();
        let mut store = LocalStore::open(tmp.path().join("data")).unwrap();
        let snapshot = store.load().unwrap();
        assert!(snapshot.projects.is_empty());
        assert!(snapshot.tasks.is_empty());
    }

    #[test]
    fn test_state_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("data");
        let project = RecordId::parse("p1").unwrap();

        let mut store = LocalStore::open(&dir).unwrap();
        let id1 = store.allocate_id(Kind::Task).unwrap();
        let id2 = store.allocate_id(Kind::Task).unwrap();
        assert_ne!(id1, id2);
        store
            .apply(&[
                Op::Insert(Record::Task(task(&project, id1.clone(), 1))),
                Op::Insert(Record::Task(task(&project, id2, 2))),
            ])
            .unwrap();
        drop(store);

        let mut reopened = LocalStore::open(&dir).unwrap();
        let snapshot = reopened.load().unwrap();
        assert_eq!(snapshot.tasks.len(), 2);
        assert_eq!(snapshot.tasks[0].id, id1);
        assert_eq!(snapshot.tasks[0].task_number, 1);
    }

    #[test]
    fn test_activity_order_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("data");
        let project = RecordId::parse("p1").unwrap();

        let mut store = LocalStore::open(&dir).unwrap();
        for n in 1..=3 {
            let id = store.allocate_id(Kind::Activity).unwrap();
            store
                .apply(&[Op::Insert(Record::Activity(crate::entities::ActivityEntry {
                    id,
                    project_id: project.clone(),
                    kind: ActivityKind::Task,
                    action: "created".to_string(),
                    details: format!("Task #{}", n),
                    user_id: "u1".to_string(),
                    created_at: Utc::now(),
                }))])
                .unwrap();
        }
        drop(store);

        let mut reopened = LocalStore::open(&dir).unwrap();
        let snapshot = reopened.load().unwrap();
        let details: Vec<_> = snapshot.activity.iter().map(|a| a.details.as_str()).collect();
        assert_eq!(details, vec!["Task #3", "Task #2", "Task #1"]);
    }

    #[test]
    fn test_purge_rewrites_all_blobs() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("data");
        let project = RecordId::parse("p1").unwrap();

        let mut store = LocalStore::open(&dir).unwrap();
        let id = store.allocate_id(Kind::Task).unwrap();
        store
            .apply(&[Op::Insert(Record::Task(task(&project, id, 1)))])
            .unwrap();
        store.apply(&[Op::PurgeProject(project)]).unwrap();

        let mut reopened = LocalStore::open(&dir).unwrap();
        assert!(reopened.load().unwrap().tasks.is_empty());
    }

    #[test]
    fn test_corrupt_blob_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("data");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("tasks.json"), "not json").unwrap();
        let err = LocalStore::open(&dir).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(_)));
    }
}
