// Read-only content store backed by a JSON document

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::types::{Subject, Unit};

/// Failure to load the content document.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read content file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("content file {} is not valid: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },
}

#[derive(Deserialize)]
struct ContentDocument {
    subjects: Vec<Subject>,
}

/// Immutable snapshot of all subjects.
///
/// Loaded fresh for every request; there is no cache to invalidate.
#[derive(Debug, Clone)]
pub struct ContentStore {
    subjects: Vec<Subject>,
}

impl ContentStore {
    /// Load and validate the document at `path`.
    pub async fn load(path: &Path) -> Result<Self, ContentError> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ContentError::NotFound(path.to_path_buf()))
            }
            Err(source) => {
                return Err(ContentError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::from_json(&raw).map_err(|reason| ContentError::Invalid {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parse a document already held in memory.
    pub fn from_json(raw: &str) -> Result<Self, String> {
        let document: ContentDocument =
            serde_json::from_str(raw).map_err(|e| e.to_string())?;
        Ok(Self::from_subjects(document.subjects))
    }

    pub fn from_subjects(subjects: Vec<Subject>) -> Self {
        Self { subjects }
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn find_subject(&self, subject_id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == subject_id)
    }

    /// Units of a subject, empty when the subject is unknown.
    pub fn units(&self, subject_id: &str) -> &[Unit] {
        self.find_subject(subject_id)
            .map(|s| s.units.as_slice())
            .unwrap_or(&[])
    }

    pub fn find_unit(&self, subject_id: &str, unit_id: &str) -> Option<&Unit> {
        self.units(subject_id).iter().find(|u| u.id == unit_id)
    }
}
