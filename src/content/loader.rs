use std::collections::HashMap;
use std::path::Path;

use super::model::{ContentError, ContentIndex, Subject, Topic};

// ============================================================================
// ContentLibrary
// ============================================================================

/// The full read-only content tree for a session, one `Subject` per JSON
/// file, with a prebuilt [`ContentIndex`] per subject.
///
/// Files are loaded in sorted file-name order so `subjects()` returns a
/// stable, deterministic ordering across calls within a session.
#[derive(Debug)]
pub struct ContentLibrary {
    subjects: Vec<Subject>,
    indexes: HashMap<String, ContentIndex>,
}

impl ContentLibrary {
    /// Load every `*.json` file in `dir` as a subject.
    ///
    /// Non-JSON files are ignored. A file that fails to parse or violates the
    /// id-uniqueness invariant fails the whole load — partially loaded
    /// content would make progress aggregation meaningless.
    pub fn load_dir(dir: &Path) -> Result<Self, ContentError> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut subjects = Vec::with_capacity(paths.len());
        for path in paths {
            let raw = std::fs::read_to_string(&path)?;
            let subject: Subject =
                serde_json::from_str(&raw).map_err(|source| ContentError::Parse {
                    file: path.display().to_string(),
                    source,
                })?;
            tracing::debug!(
                subject = %subject.id,
                topics = subject.topics.len(),
                file = %path.display(),
                "Loaded subject"
            );
            subjects.push(subject);
        }

        Self::from_subjects(subjects)
    }

    /// Build a library from already-constructed subjects (tests, embedded
    /// content). Validates id uniqueness the same way `load_dir` does.
    pub fn from_subjects(subjects: Vec<Subject>) -> Result<Self, ContentError> {
        let mut indexes = HashMap::with_capacity(subjects.len());
        for subject in &subjects {
            let index = ContentIndex::build(subject)?;
            if indexes.insert(subject.id.clone(), index).is_some() {
                return Err(ContentError::DuplicateSubject(subject.id.clone()));
            }
        }
        Ok(Self { subjects, indexes })
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn subject(&self, subject_id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == subject_id)
    }

    /// The topics (chapters) of a subject, in authored order.
    pub fn topics_for(&self, subject_id: &str) -> Option<&[Topic]> {
        self.subject(subject_id).map(|s| s.topics.as_slice())
    }

    pub fn index(&self, subject_id: &str) -> Option<&ContentIndex> {
        self.indexes.get(subject_id)
    }
}
