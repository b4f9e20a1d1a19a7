use std::collections::{HashMap, HashSet};
use std::path::Path;

use parking_lot::RwLock;

use crate::engine::error::{EngineError, EngineResult};
use crate::engine::types::{QuestionProfile, StudentProfile, MAX_ABILITY, MIN_ABILITY};

/// Read-only source of calibrated questions.
pub trait QuestionCatalog: Send + Sync {
    fn get_unanswered(
        &self,
        subject_scope: Option<&str>,
        answered_ids: &HashSet<String>,
    ) -> Vec<QuestionProfile>;

    fn get(&self, question_id: &str) -> Option<QuestionProfile>;
}

pub trait ProfileStore: Send + Sync {
    fn load(&self, student_id: &str) -> EngineResult<Option<StudentProfile>>;
    fn save(&self, profile: &StudentProfile) -> EngineResult<()>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    questions: Vec<QuestionProfile>,
}

impl InMemoryCatalog {
    pub fn new(questions: Vec<QuestionProfile>) -> EngineResult<Self> {
        let mut seen = HashSet::new();
        for q in &questions {
            if !seen.insert(q.question_id.as_str()) {
                return Err(EngineError::Catalog(format!(
                    "duplicate question id {}",
                    q.question_id
                )));
            }
            let d = q.difficulty_level;
            if !d.is_finite() || !(MIN_ABILITY..=MAX_ABILITY).contains(&d) {
                return Err(EngineError::Catalog(format!(
                    "question {} has difficulty {d} outside [{MIN_ABILITY}, {MAX_ABILITY}]",
                    q.question_id
                )));
            }
        }
        Ok(Self { questions })
    }

    /// Loads a JSON array of questions.
    pub fn from_path(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Catalog(format!("read {}: {e}", path.display())))?;
        let questions: Vec<QuestionProfile> = serde_json::from_str(&raw)
            .map_err(|e| EngineError::Catalog(format!("parse {}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), count = questions.len(), "catalog loaded");
        Self::new(questions)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[QuestionProfile] {
        &self.questions
    }
}

impl QuestionCatalog for InMemoryCatalog {
    fn get_unanswered(
        &self,
        subject_scope: Option<&str>,
        answered_ids: &HashSet<String>,
    ) -> Vec<QuestionProfile> {
        self.questions
            .iter()
            .filter(|q| subject_scope.map_or(true, |s| q.subject == s))
            .filter(|q| !answered_ids.contains(&q.question_id))
            .cloned()
            .collect()
    }

    fn get(&self, question_id: &str) -> Option<QuestionProfile> {
        self.questions
            .iter()
            .find(|q| q.question_id == question_id)
            .cloned()
    }
}

/// Process-local profile store. Reads and writes are individually atomic;
/// callers still serialise read-modify-write cycles per student.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<String, StudentProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.profiles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.read().is_empty()
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn load(&self, student_id: &str) -> EngineResult<Option<StudentProfile>> {
        Ok(self.profiles.read().get(student_id).cloned())
    }

    fn save(&self, profile: &StudentProfile) -> EngineResult<()> {
        self.profiles
            .write()
            .insert(profile.student_id.clone(), profile.clone());
        Ok(())
    }
}
