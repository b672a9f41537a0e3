//! Content-addressed file storage
//!
//! Uploaded file contents live outside the record collections, keyed by the
//! SHA256 of their bytes. Document records carry only the metadata payload
//! (name, size, content type, digest). Storing by digest deduplicates
//! repeated uploads and makes copies free.

use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::entities::FilePayload;
use crate::storage::StorageError;

/// Blob store rooted at `<workspace>/files/`
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Import a file from disk and return its stored payload
    pub fn put(&self, source: &Path) -> Result<FilePayload, StorageError> {
        let content = fs::read(source)?;
        let digest = compute_digest(&content);
        let target = self.dir.join(&digest);
        if !target.exists() {
            fs::write(&target, &content)?;
        }

        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(FilePayload {
            name: name.clone(),
            size: content.len() as u64,
            content_type: guess_content_type(&name),
            digest,
        })
    }

    /// Path of a stored blob, if it exists
    pub fn blob_path(&self, digest: &str) -> Option<PathBuf> {
        let path = self.dir.join(digest);
        if path.is_file() {
            Some(path)
        } else {
            None
        }
    }

    /// Copy a stored blob out to `dest`
    pub fn export(&self, digest: &str, dest: &Path) -> Result<(), StorageError> {
        let source = self.blob_path(digest).ok_or_else(|| {
            StorageError::Corrupt(format!("missing file content for digest {}", digest))
        })?;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source, dest)?;
        Ok(())
    }
}

fn compute_digest(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Content type from the file extension, matching common construction
/// document formats
fn guess_content_type(name: &str) -> String {
    let ext = name.rsplit('.').next().unwrap_or("").to_lowercase();
    let mime = match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "tif" | "tiff" => "image/tiff",
        "dwg" => "image/vnd.dwg",
        "dxf" => "image/vnd.dxf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "csv" => "text/csv",
        "txt" => "text/plain",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    };
    mime.to_string()
}
