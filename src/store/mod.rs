//! JSON document store for member records.
//!
//! The whole collection is the unit of persistence: every save rewrites the
//! document. Writes go to a temporary file in the same directory which is
//! then renamed over the destination, so readers only ever see a complete
//! document. There is no locking; concurrent saves are last-writer-wins.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::errors::AppError;
use crate::models::{Member, MemberDocument, MemberDocumentRef};

/// File-backed store for the member document.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the member document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all members.
    ///
    /// A missing document is an empty collection. An unreadable or malformed
    /// document is logged and also treated as empty.
    pub fn load(&self) -> Vec<Member> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("Member document {:?} not found, starting empty", self.path);
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!("Failed to read member document {:?}: {}", self.path, e);
                return Vec::new();
            }
        };

        match serde_json::from_slice::<MemberDocument>(&bytes) {
            Ok(document) => document.members,
            Err(e) => {
                tracing::warn!(
                    "Member document {:?} is malformed, treating as empty: {}",
                    self.path,
                    e
                );
                Vec::new()
            }
        }
    }

    /// Load all members keyed by id. Records without an id are skipped and
    /// the first record wins when ids repeat.
    pub fn load_by_id(&self) -> HashMap<String, Member> {
        let mut by_id = HashMap::new();
        for member in self.load() {
            if !member.id.is_empty() {
                by_id.entry(member.id.clone()).or_insert(member);
            }
        }
        by_id
    }

    /// Replace the document with `members`.
    pub fn save(&self, members: &[Member]) -> Result<(), AppError> {
        let bytes = serde_json::to_vec_pretty(&MemberDocumentRef { members })?;
        self.write_atomically(|file| file.write_all(&bytes))?;
        tracing::debug!("Saved {} members to {:?}", members.len(), self.path);
        Ok(())
    }

    /// Run `write` against a temp file next to the document, then rename it
    /// into place. On any error the temp file is dropped (and deleted) and
    /// the existing document is untouched.
    fn write_atomically<F>(&self, write: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut File) -> io::Result<()>,
    {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        write(tmp.as_file_mut())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;
        sync_dir(dir)?;
        Ok(())
    }
}

/// Flush the directory entry so the rename survives a crash.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
