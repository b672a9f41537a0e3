//! sitedesk: construction project records from the command line
//!
//! Projects, RFIs, submittals, tasks, documents, and directory contacts
//! kept in a local workspace, backed by JSON blobs or SQLite.

pub mod cli;
pub mod core;
pub mod entities;
pub mod storage;
