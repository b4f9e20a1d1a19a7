use std::collections::HashSet;

use crate::engine::catalog::QuestionCatalog;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::types::{AdaptationDecision, AlgorithmUsed, QuestionProfile, StudentProfile};

pub mod expert;
pub mod heuristic;
pub mod hybrid;
pub mod irt;

pub use expert::ExpertRuleStrategy;
pub use heuristic::HeuristicPredictorStrategy;
pub use hybrid::HybridCombiner;
pub use irt::IrtStrategy;

/// Everything a strategy may consult besides the learner profile.
#[derive(Clone, Copy)]
pub struct SelectionContext<'a> {
    pub catalog: &'a dyn QuestionCatalog,
    pub answered_ids: &'a HashSet<String>,
    pub subject_scope: Option<&'a str>,
}

impl<'a> SelectionContext<'a> {
    pub fn new(catalog: &'a dyn QuestionCatalog, answered_ids: &'a HashSet<String>) -> Self {
        Self {
            catalog,
            answered_ids,
            subject_scope: None,
        }
    }

    pub fn with_subject_scope(mut self, subject_scope: Option<&'a str>) -> Self {
        self.subject_scope = subject_scope;
        self
    }

    /// Unanswered questions in scope. Answered ids are filtered again here so
    /// a lax catalog can never cause a repeat.
    pub fn candidates(&self) -> EngineResult<Vec<QuestionProfile>> {
        let candidates: Vec<QuestionProfile> = self
            .catalog
            .get_unanswered(self.subject_scope, self.answered_ids)
            .into_iter()
            .filter(|q| !self.answered_ids.contains(&q.question_id))
            .collect();
        if candidates.is_empty() {
            return Err(EngineError::ExhaustedCatalog);
        }
        Ok(candidates)
    }
}

pub trait SelectionStrategy: Send + Sync {
    fn algorithm(&self) -> AlgorithmUsed;

    fn select(
        &self,
        profile: &StudentProfile,
        ctx: &SelectionContext<'_>,
    ) -> EngineResult<AdaptationDecision>;
}

/// Question whose difficulty is nearest `target`; the earliest wins ties.
pub(crate) fn closest_to(candidates: &[QuestionProfile], target: f64) -> Option<&QuestionProfile> {
    candidates.iter().min_by(|a, b| {
        (a.difficulty_level - target)
            .abs()
            .total_cmp(&(b.difficulty_level - target).abs())
    })
}
