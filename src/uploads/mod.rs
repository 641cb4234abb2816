//! Portfolio attachment storage.
//!
//! Attachments live as plain files in one directory and are referenced from
//! `portfolio_file` by bare filename.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::errors::AppError;

/// Extensions accepted for portfolio attachments (compared case-insensitively).
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg", "zip", "pptx"];

/// Stem used when sanitizing leaves nothing of the original name.
const FALLBACK_STEM: &str = "file";

/// Check that `filename` has an extension from [`ALLOWED_EXTENSIONS`].
pub fn is_allowed(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS
            .iter()
            .any(|allowed| ext.eq_ignore_ascii_case(allowed)),
        None => false,
    }
}

/// Reduce a client-supplied filename to a safe bare name.
///
/// Only the last path component is kept, whitespace becomes `_`, and
/// anything outside `[A-Za-z0-9._-]` is dropped. The extension is cleaned
/// separately so it survives a stem made entirely of non-ASCII characters.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let (stem, ext) = match base.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (base, None),
    };

    let stem: String = stem
        .chars()
        .filter_map(|c| match c {
            c if c.is_whitespace() => Some('_'),
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') => Some(c),
            _ => None,
        })
        .collect();
    let stem = stem.trim_matches(|c: char| c == '.' || c == '_');
    let stem = if stem.is_empty() { FALLBACK_STEM } else { stem };

    let ext: String = ext
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    if ext.is_empty() {
        stem.to_string()
    } else {
        format!("{}.{}", stem, ext)
    }
}

/// Outcome of a best-effort attachment removal. Never escalated as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cleanup {
    Removed,
    Missing,
    Failed(String),
}

/// Attachment directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store `bytes` under a sanitized, collision-free version of
    /// `original_filename` and return the name used.
    ///
    /// `report.pdf` becomes `report_1.pdf`, `report_2.pdf`, ... when taken.
    pub fn store(&self, bytes: &[u8], original_filename: &str) -> Result<String, AppError> {
        if !is_allowed(original_filename) {
            return Err(AppError::Validation(format!(
                "File type not allowed: {} (allowed: {})",
                original_filename,
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        let safe = sanitize_filename(original_filename);
        let (stem, ext) = match safe.rsplit_once('.') {
            Some((stem, ext)) => (stem.to_string(), format!(".{}", ext)),
            None => (safe.clone(), String::new()),
        };

        fs::create_dir_all(&self.dir)?;

        let mut suffix = 0u32;
        loop {
            let candidate = if suffix == 0 {
                safe.clone()
            } else {
                format!("{}_{}{}", stem, suffix, ext)
            };
            let path = self.dir.join(&candidate);

            // create_new fails if another writer already claimed the name
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    if let Err(e) = file.write_all(bytes).and_then(|_| file.sync_all()) {
                        drop(file);
                        fs::remove_file(&path).ok();
                        return Err(e.into());
                    }
                    tracing::info!("Stored attachment {} ({} bytes)", candidate, bytes.len());
                    return Ok(candidate);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => suffix += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Delete a stored attachment. Failures are logged and reported in the
    /// returned [`Cleanup`], never raised.
    pub fn remove(&self, stored_filename: &str) -> Cleanup {
        if stored_filename.is_empty()
            || stored_filename.contains(['/', '\\'])
            || stored_filename == ".."
        {
            tracing::warn!("Refusing to remove attachment {:?}", stored_filename);
            return Cleanup::Failed(format!("invalid attachment name {:?}", stored_filename));
        }

        match fs::remove_file(self.dir.join(stored_filename)) {
            Ok(()) => {
                tracing::info!("Removed attachment {}", stored_filename);
                Cleanup::Removed
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("Attachment {} already absent", stored_filename);
                Cleanup::Missing
            }
            Err(e) => {
                tracing::warn!("Failed to remove attachment {}: {}", stored_filename, e);
                Cleanup::Failed(e.to_string())
            }
        }
    }
}
