use std::collections::HashSet;
use std::sync::Arc;

use crate::engine::catalog::{ProfileStore, QuestionCatalog};
use crate::engine::config::EngineConfig;
use crate::engine::decision::{HybridCombiner, SelectionContext};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::profile::{ProfileAnalyzer, ProfileUpdater};
use crate::engine::recommendation::{RecommendationGenerator, Recommendations};
use crate::engine::types::{
    AdaptationDecision, AnswerEvent, AnswerRecord, QuestionProfile, StudentProfile,
};

/// Entry point for the assessment session controller.
///
/// The engine holds no per-student state. Answers for one student must be
/// applied one at a time by the caller.
pub struct AdaptiveEngine {
    catalog: Arc<dyn QuestionCatalog>,
    store: Arc<dyn ProfileStore>,
    combiner: HybridCombiner,
    subject_scope: Option<String>,
}

impl AdaptiveEngine {
    pub fn new(
        config: EngineConfig,
        catalog: Arc<dyn QuestionCatalog>,
        store: Arc<dyn ProfileStore>,
    ) -> Self {
        Self {
            combiner: HybridCombiner::new(&config),
            subject_scope: config.subject_scope,
            catalog,
            store,
        }
    }

    pub fn with_combiner(mut self, combiner: HybridCombiner) -> Self {
        self.combiner = combiner;
        self
    }

    pub fn catalog(&self) -> &dyn QuestionCatalog {
        self.catalog.as_ref()
    }

    pub fn start_or_resume(&self, student_id: &str) -> EngineResult<StudentProfile> {
        if let Some(profile) = self.load_profile(student_id)? {
            return Ok(profile);
        }

        let profile = ProfileAnalyzer::analyze(student_id, &[]);
        self.store.save(&profile)?;
        tracing::info!(student_id, "profile created");
        Ok(profile)
    }

    fn load_profile(&self, student_id: &str) -> EngineResult<Option<StudentProfile>> {
        let Some(profile) = self.store.load(student_id)? else {
            return Ok(None);
        };
        profile.validate()?;
        tracing::debug!(student_id, ability = profile.current_ability, "profile resumed");
        Ok(Some(profile))
    }

    /// Rebuilds and stores a profile from answer history kept outside the
    /// engine.
    pub fn rebuild_profile(
        &self,
        student_id: &str,
        history: &[AnswerRecord],
    ) -> EngineResult<StudentProfile> {
        let profile = ProfileAnalyzer::analyze(student_id, history);
        profile.validate()?;
        self.store.save(&profile)?;
        Ok(profile)
    }

    pub fn next_question(
        &self,
        profile: &StudentProfile,
        answered_ids: &HashSet<String>,
    ) -> EngineResult<AdaptationDecision> {
        profile.validate()?;
        let ctx = SelectionContext::new(self.catalog.as_ref(), answered_ids)
            .with_subject_scope(self.subject_scope.as_deref());
        self.combiner.decide(profile, &ctx)
    }

    pub fn apply_answer(
        &self,
        profile: &StudentProfile,
        event: &AnswerEvent,
        question: &QuestionProfile,
    ) -> EngineResult<StudentProfile> {
        ProfileUpdater::apply(profile, event, question)
    }

    /// Resolves the question, applies the answer and persists the result.
    /// Nothing is written when the event is rejected.
    pub fn submit_answer(&self, event: &AnswerEvent) -> EngineResult<StudentProfile> {
        let question = self.catalog.get(&event.question_id).ok_or_else(|| {
            tracing::warn!(
                student_id = %event.student_id,
                question_id = %event.question_id,
                "answer references unknown question"
            );
            EngineError::UnknownQuestion(event.question_id.clone())
        })?;

        let profile = match self.load_profile(&event.student_id)? {
            Some(profile) => profile,
            None => ProfileAnalyzer::analyze(&event.student_id, &[]),
        };
        let updated = self.apply_answer(&profile, event, &question)?;
        self.store.save(&updated)?;
        Ok(updated)
    }

    pub fn recommendations(&self, profile: &StudentProfile) -> Recommendations {
        RecommendationGenerator::generate(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::catalog::{InMemoryCatalog, InMemoryProfileStore};

    fn engine() -> (AdaptiveEngine, Arc<InMemoryProfileStore>) {
        let catalog = InMemoryCatalog::new(vec![
            QuestionProfile::new("m3", 3.0, "math"),
            QuestionProfile::new("m5", 5.0, "math"),
            QuestionProfile::new("p5", 5.0, "physics"),
        ])
        .unwrap();
        let store = Arc::new(InMemoryProfileStore::new());
        let engine = AdaptiveEngine::new(EngineConfig::default(), Arc::new(catalog), store.clone());
        (engine, store)
    }

    #[test]
    fn test_start_creates_and_persists_profile() {
        let (engine, store) = engine();
        let profile = engine.start_or_resume("s1").unwrap();
        assert_eq!(profile.current_ability, 5.0);
        assert_eq!(store.load("s1").unwrap(), Some(profile.clone()));
        assert_eq!(engine.start_or_resume("s1").unwrap(), profile);
    }

    #[test]
    fn test_resume_rejects_corrupt_profile() {
        let (engine, store) = engine();
        let mut profile = StudentProfile::new("s1");
        profile.current_ability = 42.0;
        store.save(&profile).unwrap();
        assert!(matches!(
            engine.start_or_resume("s1"),
            Err(EngineError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_submit_answer_unknown_question() {
        let (engine, store) = engine();
        let event = AnswerEvent {
            student_id: "s1".to_string(),
            question_id: "missing".to_string(),
            is_correct: true,
            response_time: 5.0,
            self_reported_confidence: None,
        };
        assert_eq!(
            engine.submit_answer(&event).unwrap_err(),
            EngineError::UnknownQuestion("missing".to_string())
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_rejected_answer_leaves_store_untouched() {
        let (engine, store) = engine();
        let mut event = AnswerEvent {
            student_id: "new".to_string(),
            question_id: "m5".to_string(),
            is_correct: true,
            response_time: -3.0,
            self_reported_confidence: None,
        };
        assert!(matches!(
            engine.submit_answer(&event),
            Err(EngineError::InvalidProfile(_))
        ));
        assert!(store.is_empty());

        event.response_time = 8.0;
        event.self_reported_confidence = Some(0);
        assert!(engine.submit_answer(&event).is_err());
        assert!(store.is_empty());

        event.self_reported_confidence = Some(3);
        engine.submit_answer(&event).unwrap();
        assert!(store.load("new").unwrap().is_some());
    }

    #[test]
    fn test_rebuild_profile_persists_history() {
        let (engine, store) = engine();
        let record = |id: &str, subject: &str, is_correct: bool| AnswerRecord {
            question_id: id.to_string(),
            subject: subject.to_string(),
            difficulty: 5.0,
            is_correct,
            response_time: 20.0,
        };
        let mut history: Vec<AnswerRecord> = (0..5)
            .map(|i| record(&format!("m{i}"), "math", true))
            .collect();
        history.extend((0..3).map(|i| record(&format!("p{i}"), "physics", false)));

        let profile = engine.rebuild_profile("s9", &history).unwrap();

        assert!((profile.current_ability - 5.0).abs() < 1e-9);
        assert_eq!(profile.learning_patterns["math"].correct_count, 5);
        assert_eq!(profile.learning_patterns["physics"].total_count, 3);
        assert!(profile.is_strong_in("math"));
        assert!(profile.is_weak_in("physics"));
        // 2.0 - 5 * 0.1 - 3 * 0.05
        assert!((profile.interval_width() - 1.35).abs() < 1e-9);
        assert_eq!(store.load("s9").unwrap(), Some(profile));
    }

    #[test]
    fn test_subject_scope_limits_selection() {
        let catalog = InMemoryCatalog::new(vec![
            QuestionProfile::new("m5", 5.0, "math"),
            QuestionProfile::new("p6", 6.0, "physics"),
        ])
        .unwrap();
        let config = EngineConfig {
            subject_scope: Some("physics".to_string()),
            ..Default::default()
        };
        let engine = AdaptiveEngine::new(
            config,
            Arc::new(catalog),
            Arc::new(InMemoryProfileStore::new()),
        );
        let decision = engine
            .next_question(&StudentProfile::new("s1"), &HashSet::new())
            .unwrap();
        assert_eq!(decision.next_question_id, "p6");
    }

    #[test]
    fn test_submit_answer_persists_update() {
        let (engine, store) = engine();
        let event = AnswerEvent {
            student_id: "s1".to_string(),
            question_id: "m5".to_string(),
            is_correct: true,
            response_time: 12.0,
            self_reported_confidence: Some(4),
        };
        let updated = engine.submit_answer(&event).unwrap();
        assert!((updated.current_ability - 5.1).abs() < 1e-9);
        assert_eq!(store.load("s1").unwrap(), Some(updated));
    }
}
