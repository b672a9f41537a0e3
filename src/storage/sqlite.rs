//! SQLite relational storage
//!
//! One snake_case table per collection, one row per record. Column names
//! are the snake_case forms of the blob field names (`jobNumber` ↔
//! `job_number`) with no other transformation; list- and object-valued
//! fields live in JSON text columns under the same name. Empty strings are
//! written as NULL to keep typed columns clean and read back as empty
//! strings.
//!
//! Identifiers are allocated by the database from a per-collection counter
//! table, so rows inserted here carry numeric ids. Every batch runs inside
//! a transaction.

use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};

use crate::core::identity::RecordId;
use crate::entities::{
    ActivityEntry, DirectoryCompany, DirectoryUser, DistributionGroup, Document, Project,
    ProjectMember, Rfi, Specification, Submittal, Task,
};
use crate::storage::{Backend, Kind, Op, Record, Snapshot, StorageError};

/// Current schema version
const SCHEMA_VERSION: i64 = 1;

/// Relational backend
pub struct SqliteStore {
    conn: Connection,
    #[allow(dead_code)]
    path: PathBuf,
}

impl SqliteStore {
    /// Open or create the database and ensure the schema is current
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

        let store = Self { conn, path };
        store.init_schema()?;
        store.check_schema_version()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            r#"
            -- Schema version for migrations
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- Next id per collection; ids are allocated here, not by callers
            CREATE TABLE IF NOT EXISTS record_counters (
                kind TEXT PRIMARY KEY,
                next_id INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                job_number TEXT,
                address TEXT,
                city TEXT,
                state TEXT,
                zip TEXT,
                county TEXT,
                stage TEXT NOT NULL,
                sector TEXT,
                contract_value REAL NOT NULL DEFAULT 0,
                description TEXT,
                start_date TEXT,
                actual_start_date TEXT,
                completion_date TEXT,
                projected_finish_date TEXT,
                warranty_start_date TEXT,
                warranty_end_date TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS project_members (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_members_project ON project_members(project_id);
            CREATE INDEX IF NOT EXISTS idx_members_user ON project_members(user_id);

            CREATE TABLE IF NOT EXISTS dir_users (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                first_name TEXT,
                last_name TEXT,
                email TEXT NOT NULL,
                permission TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_dir_users_project ON dir_users(project_id);

            CREATE TABLE IF NOT EXISTS dir_companies (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                name TEXT NOT NULL,
                type TEXT,
                contact TEXT,
                email TEXT,
                phone TEXT,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_dir_companies_project ON dir_companies(project_id);

            CREATE TABLE IF NOT EXISTS dist_groups (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                name TEXT NOT NULL,
                member_ids TEXT,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_dist_groups_project ON dist_groups(project_id);

            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                parent_id TEXT,
                name TEXT NOT NULL,
                type TEXT NOT NULL,
                file_data TEXT,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_documents_project ON documents(project_id);
            CREATE INDEX IF NOT EXISTS idx_documents_parent ON documents(parent_id);

            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                task_number INTEGER NOT NULL,
                title TEXT NOT NULL,
                status TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT,
                distribution_list TEXT,
                attachments TEXT,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks(project_id);

            CREATE TABLE IF NOT EXISTS rfis (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                rfi_number INTEGER NOT NULL,
                subject TEXT NOT NULL,
                question TEXT,
                status TEXT NOT NULL,
                due_date TEXT,
                rfi_manager TEXT,
                received_from TEXT,
                assignees TEXT,
                distribution_list TEXT,
                responsible_contractor TEXT,
                specification TEXT,
                drawing_number TEXT,
                attachments TEXT,
                responses TEXT,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_rfis_project ON rfis(project_id);

            CREATE TABLE IF NOT EXISTS submittals (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                submittal_number INTEGER NOT NULL,
                title TEXT NOT NULL,
                status TEXT NOT NULL,
                type TEXT,
                spec_section TEXT,
                due_date TEXT,
                assignee TEXT,
                description TEXT,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_submittals_project ON submittals(project_id);

            CREATE TABLE IF NOT EXISTS specifications (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                number TEXT NOT NULL,
                title TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_specifications_project ON specifications(project_id);

            CREATE TABLE IF NOT EXISTS activity_feed (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                type TEXT NOT NULL,
                action TEXT NOT NULL,
                details TEXT NOT NULL,
                user_id TEXT,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_activity_project ON activity_feed(project_id);
            "#,
        )?;

        self.conn.execute(
            "INSERT INTO schema_version (version)
             SELECT ?1 WHERE NOT EXISTS (SELECT 1 FROM schema_version)",
            params![SCHEMA_VERSION],
        )?;
        Ok(())
    }

    fn check_schema_version(&self) -> Result<(), StorageError> {
        let found: i64 =
            self.conn
                .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                    row.get(0)
                })?;
        if found != SCHEMA_VERSION {
            return Err(StorageError::SchemaVersion {
                found,
                expected: SCHEMA_VERSION,
            });
        }
        Ok(())
    }
}

impl Backend for SqliteStore {
    fn load(&mut self) -> Result<Snapshot, StorageError> {
        Ok(Snapshot {
            projects: load_projects(&self.conn)?,
            members: load_members(&self.conn)?,
            dir_users: load_dir_users(&self.conn)?,
            dir_companies: load_dir_companies(&self.conn)?,
            dist_groups: load_dist_groups(&self.conn)?,
            documents: load_documents(&self.conn)?,
            tasks: load_tasks(&self.conn)?,
            rfis: load_rfis(&self.conn)?,
            submittals: load_submittals(&self.conn)?,
            specifications: load_specifications(&self.conn)?,
            activity: load_activity(&self.conn)?,
        })
    }

    fn allocate_id(&mut self, kind: Kind) -> Result<RecordId, StorageError> {
        let tx = self.conn.transaction()?;
        let current: Option<i64> = tx
            .query_row(
                "SELECT next_id FROM record_counters WHERE kind = ?1",
                params![kind.table()],
                |row| row.get(0),
            )
            .optional()?;

        let id = match current {
            Some(n) => {
                tx.execute(
                    "UPDATE record_counters SET next_id = ?1 WHERE kind = ?2",
                    params![n + 1, kind.table()],
                )?;
                n
            }
            None => {
                tx.execute(
                    "INSERT INTO record_counters (kind, next_id) VALUES (?1, 2)",
                    params![kind.table()],
                )?;
                1
            }
        };
        tx.commit()?;
        Ok(RecordId::from_number(id as u64))
    }

    fn apply(&mut self, batch: &[Op]) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        for op in batch {
            match op {
                Op::Insert(record) | Op::Update(record) => {
                    upsert_record(&tx, record)?;
                }
                Op::Delete(kind, id) => {
                    tx.execute(
                        &format!("DELETE FROM {} WHERE id = ?1", kind.table()),
                        params![id.as_str()],
                    )?;
                }
                Op::PurgeProject(id) => {
                    tx.execute("DELETE FROM projects WHERE id = ?1", params![id.as_str()])?;
                    for kind in Kind::ALL {
                        if kind == Kind::Project {
                            continue;
                        }
                        tx.execute(
                            &format!("DELETE FROM {} WHERE project_id = ?1", kind.table()),
                            params![id.as_str()],
                        )?;
                    }
                }
                Op::TrimFeed(cap) => {
                    tx.execute(
                        "DELETE FROM activity_feed WHERE rowid NOT IN (
                            SELECT rowid FROM activity_feed ORDER BY rowid DESC LIMIT ?1
                        )",
                        params![*cap as i64],
                    )?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// value translation helpers

/// Empty string → NULL on the way in
fn opt_text(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn opt_id(id: &Option<RecordId>) -> Option<&str> {
    id.as_ref().map(|v| v.as_str())
}

fn opt_date(date: &Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.to_string())
}

fn json_list<T: serde::Serialize>(items: &[T]) -> Result<Option<String>, StorageError> {
    if items.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::to_string(items)?))
    }
}

fn conv_err(
    idx: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, err.into())
}

fn get_id(row: &rusqlite::Row<'_>, idx: usize) -> Result<RecordId, rusqlite::Error> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| conv_err(idx, e))
}

fn get_opt_id(row: &rusqlite::Row<'_>, idx: usize) -> Result<Option<RecordId>, rusqlite::Error> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        Some(s) => Ok(Some(s.parse().map_err(|e| conv_err(idx, e))?)),
        None => Ok(None),
    }
}

/// NULL → empty string on the way out
fn get_text(row: &rusqlite::Row<'_>, idx: usize) -> Result<String, rusqlite::Error> {
    Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
}

fn get_parsed<T>(row: &rusqlite::Row<'_>, idx: usize) -> Result<T, rusqlite::Error>
where
    T: std::str::FromStr,
    T::Err: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
{
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e: T::Err| conv_err(idx, e))
}

fn get_timestamp(row: &rusqlite::Row<'_>, idx: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conv_err(idx, e))
}

fn get_opt_date(row: &rusqlite::Row<'_>, idx: usize) -> Result<Option<NaiveDate>, rusqlite::Error> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        Some(s) => Ok(Some(s.parse().map_err(|e| conv_err(idx, e))?)),
        None => Ok(None),
    }
}

fn get_json_list<T: serde::de::DeserializeOwned>(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> Result<Vec<T>, rusqlite::Error> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        Some(s) => serde_json::from_str(&s).map_err(|e| conv_err(idx, e)),
        None => Ok(Vec::new()),
    }
}

// ---------------------------------------------------------------------------
// per-table writes

fn upsert_record(conn: &Connection, record: &Record) -> Result<(), StorageError> {
    match record {
        Record::Project(r) => upsert_project(conn, r),
        Record::Member(r) => upsert_member(conn, r),
        Record::DirUser(r) => upsert_dir_user(conn, r),
        Record::DirCompany(r) => upsert_dir_company(conn, r),
        Record::DistGroup(r) => upsert_dist_group(conn, r),
        Record::Document(r) => upsert_document(conn, r),
        Record::Task(r) => upsert_task(conn, r),
        Record::Rfi(r) => upsert_rfi(conn, r),
        Record::Submittal(r) => upsert_submittal(conn, r),
        Record::Specification(r) => upsert_specification(conn, r),
        Record::Activity(r) => upsert_activity(conn, r),
    }
}

fn upsert_project(conn: &Connection, p: &Project) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO projects (
            id, name, job_number, address, city, state, zip, county, stage,
            sector, contract_value, description, start_date, actual_start_date,
            completion_date, projected_finish_date, warranty_start_date,
            warranty_end_date, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            job_number = excluded.job_number,
            address = excluded.address,
            city = excluded.city,
            state = excluded.state,
            zip = excluded.zip,
            county = excluded.county,
            stage = excluded.stage,
            sector = excluded.sector,
            contract_value = excluded.contract_value,
            description = excluded.description,
            start_date = excluded.start_date,
            actual_start_date = excluded.actual_start_date,
            completion_date = excluded.completion_date,
            projected_finish_date = excluded.projected_finish_date,
            warranty_start_date = excluded.warranty_start_date,
            warranty_end_date = excluded.warranty_end_date",
        params![
            p.id.as_str(),
            p.name,
            opt_text(&p.job_number),
            opt_text(&p.address),
            opt_text(&p.city),
            opt_text(&p.state),
            opt_text(&p.zip),
            opt_text(&p.county),
            p.stage.to_string(),
            opt_text(&p.sector),
            p.contract_value,
            opt_text(&p.description),
            opt_date(&p.start_date),
            opt_date(&p.actual_start_date),
            opt_date(&p.completion_date),
            opt_date(&p.projected_finish_date),
            opt_date(&p.warranty_start_date),
            opt_date(&p.warranty_end_date),
            p.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn load_projects(conn: &Connection) -> Result<Vec<Project>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, job_number, address, city, state, zip, county, stage,
                sector, contract_value, description, start_date, actual_start_date,
                completion_date, projected_finish_date, warranty_start_date,
                warranty_end_date, created_at
         FROM projects ORDER BY rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Project {
            id: get_id(row, 0)?,
            name: row.get(1)?,
            job_number: get_text(row, 2)?,
            address: get_text(row, 3)?,
            city: get_text(row, 4)?,
            state: get_text(row, 5)?,
            zip: get_text(row, 6)?,
            county: get_text(row, 7)?,
            stage: get_parsed(row, 8)?,
            sector: get_text(row, 9)?,
            contract_value: row.get(10)?,
            description: get_text(row, 11)?,
            start_date: get_opt_date(row, 12)?,
            actual_start_date: get_opt_date(row, 13)?,
            completion_date: get_opt_date(row, 14)?,
            projected_finish_date: get_opt_date(row, 15)?,
            warranty_start_date: get_opt_date(row, 16)?,
            warranty_end_date: get_opt_date(row, 17)?,
            created_at: get_timestamp(row, 18)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

fn upsert_member(conn: &Connection, m: &ProjectMember) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO project_members (id, project_id, user_id, role, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET role = excluded.role",
        params![
            m.id.as_str(),
            m.project_id.as_str(),
            m.user_id,
            m.role,
            m.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn load_members(conn: &Connection) -> Result<Vec<ProjectMember>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT id, project_id, user_id, role, created_at
         FROM project_members ORDER BY rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(ProjectMember {
            id: get_id(row, 0)?,
            project_id: get_id(row, 1)?,
            user_id: row.get(2)?,
            role: row.get(3)?,
            created_at: get_timestamp(row, 4)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

fn upsert_dir_user(conn: &Connection, u: &DirectoryUser) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO dir_users (id, project_id, first_name, last_name, email, permission, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
            first_name = excluded.first_name,
            last_name = excluded.last_name,
            email = excluded.email,
            permission = excluded.permission",
        params![
            u.id.as_str(),
            u.project_id.as_str(),
            opt_text(&u.first_name),
            opt_text(&u.last_name),
            u.email,
            u.permission.to_string(),
            u.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn load_dir_users(conn: &Connection) -> Result<Vec<DirectoryUser>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT id, project_id, first_name, last_name, email, permission, created_at
         FROM dir_users ORDER BY rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(DirectoryUser {
            id: get_id(row, 0)?,
            project_id: get_id(row, 1)?,
            first_name: get_text(row, 2)?,
            last_name: get_text(row, 3)?,
            email: row.get(4)?,
            permission: get_parsed(row, 5)?,
            created_at: get_timestamp(row, 6)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

fn upsert_dir_company(conn: &Connection, c: &DirectoryCompany) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO dir_companies (id, project_id, name, type, contact, email, phone, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            type = excluded.type,
            contact = excluded.contact,
            email = excluded.email,
            phone = excluded.phone",
        params![
            c.id.as_str(),
            c.project_id.as_str(),
            c.name,
            opt_text(&c.company_type),
            opt_text(&c.contact),
            opt_text(&c.email),
            opt_text(&c.phone),
            c.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn load_dir_companies(conn: &Connection) -> Result<Vec<DirectoryCompany>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT id, project_id, name, type, contact, email, phone, created_at
         FROM dir_companies ORDER BY rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(DirectoryCompany {
            id: get_id(row, 0)?,
            project_id: get_id(row, 1)?,
            name: row.get(2)?,
            company_type: get_text(row, 3)?,
            contact: get_text(row, 4)?,
            email: get_text(row, 5)?,
            phone: get_text(row, 6)?,
            created_at: get_timestamp(row, 7)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

fn upsert_dist_group(conn: &Connection, g: &DistributionGroup) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO dist_groups (id, project_id, name, member_ids, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            member_ids = excluded.member_ids",
        params![
            g.id.as_str(),
            g.project_id.as_str(),
            g.name,
            json_list(&g.member_ids)?,
            g.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn load_dist_groups(conn: &Connection) -> Result<Vec<DistributionGroup>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT id, project_id, name, member_ids, created_at
         FROM dist_groups ORDER BY rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(DistributionGroup {
            id: get_id(row, 0)?,
            project_id: get_id(row, 1)?,
            name: row.get(2)?,
            member_ids: get_json_list(row, 3)?,
            created_at: get_timestamp(row, 4)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

fn upsert_document(conn: &Connection, d: &Document) -> Result<(), StorageError> {
    let file_data = match &d.file_data {
        Some(payload) => Some(serde_json::to_string(payload)?),
        None => None,
    };
    conn.execute(
        "INSERT INTO documents (id, project_id, parent_id, name, type, file_data, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
            parent_id = excluded.parent_id,
            name = excluded.name,
            type = excluded.type,
            file_data = excluded.file_data",
        params![
            d.id.as_str(),
            d.project_id.as_str(),
            opt_id(&d.parent_id),
            d.name,
            d.kind.to_string(),
            file_data,
            d.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn load_documents(conn: &Connection) -> Result<Vec<Document>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT id, project_id, parent_id, name, type, file_data, created_at
         FROM documents ORDER BY rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        let file_data: Option<String> = row.get(5)?;
        let file_data = match file_data {
            Some(raw) => Some(serde_json::from_str(&raw).map_err(|e| conv_err(5, e))?),
            None => None,
        };
        Ok(Document {
            id: get_id(row, 0)?,
            project_id: get_id(row, 1)?,
            parent_id: get_opt_id(row, 2)?,
            name: row.get(3)?,
            kind: get_parsed(row, 4)?,
            file_data,
            created_at: get_timestamp(row, 6)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

fn upsert_task(conn: &Connection, t: &Task) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO tasks (
            id, project_id, task_number, title, status, category, description,
            distribution_list, attachments, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            status = excluded.status,
            category = excluded.category,
            description = excluded.description,
            distribution_list = excluded.distribution_list,
            attachments = excluded.attachments",
        params![
            t.id.as_str(),
            t.project_id.as_str(),
            t.task_number,
            t.title,
            t.status.to_string(),
            t.category.to_string(),
            opt_text(&t.description),
            json_list(&t.distribution_list)?,
            json_list(&t.attachments)?,
            t.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn load_tasks(conn: &Connection) -> Result<Vec<Task>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT id, project_id, task_number, title, status, category, description,
                distribution_list, attachments, created_at
         FROM tasks ORDER BY rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Task {
            id: get_id(row, 0)?,
            project_id: get_id(row, 1)?,
            task_number: row.get(2)?,
            title: row.get(3)?,
            status: get_parsed(row, 4)?,
            category: get_parsed(row, 5)?,
            description: get_text(row, 6)?,
            distribution_list: get_json_list(row, 7)?,
            attachments: get_json_list(row, 8)?,
            created_at: get_timestamp(row, 9)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

fn upsert_rfi(conn: &Connection, r: &Rfi) -> Result<(), StorageError> {
    let responses = json_list(&r.responses)?;
    conn.execute(
        "INSERT INTO rfis (
            id, project_id, rfi_number, subject, question, status, due_date,
            rfi_manager, received_from, assignees, distribution_list,
            responsible_contractor, specification, drawing_number, attachments,
            responses, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
        ON CONFLICT(id) DO UPDATE SET
            subject = excluded.subject,
            question = excluded.question,
            status = excluded.status,
            due_date = excluded.due_date,
            rfi_manager = excluded.rfi_manager,
            received_from = excluded.received_from,
            assignees = excluded.assignees,
            distribution_list = excluded.distribution_list,
            responsible_contractor = excluded.responsible_contractor,
            specification = excluded.specification,
            drawing_number = excluded.drawing_number,
            attachments = excluded.attachments,
            responses = excluded.responses",
        params![
            r.id.as_str(),
            r.project_id.as_str(),
            r.rfi_number,
            r.subject,
            opt_text(&r.question),
            r.status.to_string(),
            opt_date(&r.due_date),
            opt_id(&r.rfi_manager),
            opt_id(&r.received_from),
            json_list(&r.assignees)?,
            json_list(&r.distribution_list)?,
            opt_id(&r.responsible_contractor),
            opt_id(&r.specification),
            opt_text(&r.drawing_number),
            json_list(&r.attachments)?,
            responses,
            r.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn load_rfis(conn: &Connection) -> Result<Vec<Rfi>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT id, project_id, rfi_number, subject, question, status, due_date,
                rfi_manager, received_from, assignees, distribution_list,
                responsible_contractor, specification, drawing_number, attachments,
                responses, created_at
         FROM rfis ORDER BY rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Rfi {
            id: get_id(row, 0)?,
            project_id: get_id(row, 1)?,
            rfi_number: row.get(2)?,
            subject: row.get(3)?,
            question: get_text(row, 4)?,
            status: get_parsed(row, 5)?,
            due_date: get_opt_date(row, 6)?,
            rfi_manager: get_opt_id(row, 7)?,
            received_from: get_opt_id(row, 8)?,
            assignees: get_json_list(row, 9)?,
            distribution_list: get_json_list(row, 10)?,
            responsible_contractor: get_opt_id(row, 11)?,
            specification: get_opt_id(row, 12)?,
            drawing_number: get_text(row, 13)?,
            attachments: get_json_list(row, 14)?,
            responses: get_json_list(row, 15)?,
            created_at: get_timestamp(row, 16)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

fn upsert_submittal(conn: &Connection, s: &Submittal) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO submittals (
            id, project_id, submittal_number, title, status, type, spec_section,
            due_date, assignee, description, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            status = excluded.status,
            type = excluded.type,
            spec_section = excluded.spec_section,
            due_date = excluded.due_date,
            assignee = excluded.assignee,
            description = excluded.description",
        params![
            s.id.as_str(),
            s.project_id.as_str(),
            s.submittal_number,
            s.title,
            s.status.to_string(),
            opt_text(&s.submittal_type),
            opt_text(&s.spec_section),
            opt_date(&s.due_date),
            opt_id(&s.assignee),
            opt_text(&s.description),
            s.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn load_submittals(conn: &Connection) -> Result<Vec<Submittal>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT id, project_id, submittal_number, title, status, type, spec_section,
                due_date, assignee, description, created_at
         FROM submittals ORDER BY rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Submittal {
            id: get_id(row, 0)?,
            project_id: get_id(row, 1)?,
            submittal_number: row.get(2)?,
            title: row.get(3)?,
            status: get_parsed(row, 4)?,
            submittal_type: get_text(row, 5)?,
            spec_section: get_text(row, 6)?,
            due_date: get_opt_date(row, 7)?,
            assignee: get_opt_id(row, 8)?,
            description: get_text(row, 9)?,
            created_at: get_timestamp(row, 10)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

fn upsert_specification(conn: &Connection, s: &Specification) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO specifications (id, project_id, number, title, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
            number = excluded.number,
            title = excluded.title",
        params![
            s.id.as_str(),
            s.project_id.as_str(),
            s.number,
            s.title,
            s.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn load_specifications(conn: &Connection) -> Result<Vec<Specification>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT id, project_id, number, title, created_at
         FROM specifications ORDER BY rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Specification {
            id: get_id(row, 0)?,
            project_id: get_id(row, 1)?,
            number: row.get(2)?,
            title: row.get(3)?,
            created_at: get_timestamp(row, 4)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

fn upsert_activity(conn: &Connection, a: &ActivityEntry) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO activity_feed (id, project_id, type, action, details, user_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO NOTHING",
        params![
            a.id.as_str(),
            a.project_id.as_str(),
            a.kind.to_string(),
            a.action,
            a.details,
            opt_text(&a.user_id),
            a.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Newest first: the feed reads in reverse insertion order
fn load_activity(conn: &Connection) -> Result<Vec<ActivityEntry>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT id, project_id, type, action, details, user_id, created_at
         FROM activity_feed ORDER BY rowid DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(ActivityEntry {
            id: get_id(row, 0)?,
            project_id: get_id(row, 1)?,
            kind: get_parsed(row, 2)?,
            action: row.get(3)?,
            details: row.get(4)?,
            user_id: get_text(row, 5)?,
            created_at: get_timestamp(row, 6)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}
