//! Document tree nodes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::identity::RecordId;

/// Node kind in the document hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Folder,
    File,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Folder => write!(f, "folder"),
            DocumentKind::File => write!(f, "file"),
        }
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "folder" => Ok(DocumentKind::Folder),
            "file" => Ok(DocumentKind::File),
            _ => Err(format!("invalid document kind: '{}' (valid: folder, file)", s)),
        }
    }
}

/// Stored payload of a file node
///
/// Content lives in the workspace file store addressed by `digest`; the
/// record keeps only the reference plus the original upload metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePayload {
    /// Original filename at upload time
    pub name: String,

    /// Size in bytes
    pub size: u64,

    /// MIME type guessed from the extension
    #[serde(rename = "type")]
    pub content_type: String,

    /// sha256 of the content, hex-encoded
    pub digest: String,
}

/// An attachment reference on a task or RFI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Original filename
    pub name: String,

    /// Size in bytes
    pub size: u64,

    /// sha256 of the content, hex-encoded
    pub digest: String,
}

/// A folder or file in a project's document tree
///
/// `parent_id = None` means the node sits at the project root. A non-null
/// parent must reference a folder in the same project; the tree operations
/// in `core::tree` preserve that invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Unique identifier
    pub id: RecordId,

    /// Project this node belongs to
    pub project_id: RecordId,

    /// Containing folder, None at the root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<RecordId>,

    /// Display name; duplicate names among siblings are permitted
    pub name: String,

    /// Folder or file
    #[serde(rename = "type")]
    pub kind: DocumentKind,

    /// Payload for file nodes, None for folders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_data: Option<FilePayload>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// True for folder nodes
    pub fn is_folder(&self) -> bool {
        self.kind == DocumentKind::Folder
    }
}
