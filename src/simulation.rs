//! Simulated session controller used by the binary and integration tests.
//!
//! A synthetic learner answers according to the three-parameter logistic
//! model, so runs are reproducible for a given seed.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::engine::{
    AbilityModel, AdaptationDecision, AdaptiveEngine, AnswerEvent, EngineError, EngineResult,
    QuestionProfile, Recommendations, StudentProfile, MAX_ABILITY, MIN_ABILITY,
};

const SUBJECTS: [&str; 3] = ["algebra", "geometry", "statistics"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEnd {
    MaxQuestions,
    CatalogExhausted,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub profile: StudentProfile,
    pub decisions: Vec<AdaptationDecision>,
    pub correct_count: usize,
    pub ended_by: SessionEnd,
    pub recommendations: Recommendations,
}

pub struct SimulatedLearner {
    true_ability: f64,
    rng: StdRng,
}

impl SimulatedLearner {
    pub fn new(true_ability: f64, seed: u64) -> Self {
        Self {
            true_ability: true_ability.clamp(MIN_ABILITY, MAX_ABILITY),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn true_ability(&self) -> f64 {
        self.true_ability
    }

    /// Returns (is_correct, response time in seconds).
    pub fn answer(&mut self, question: &QuestionProfile) -> (bool, f64) {
        let p = AbilityModel::probability_correct(self.true_ability, question);
        let is_correct = self.rng.random_bool(p.clamp(0.0, 1.0));
        let gap = (question.difficulty_level - self.true_ability).max(0.0);
        let response_time = self.rng.random_range(4.0..40.0) + gap * 8.0;
        (is_correct, response_time)
    }
}

/// Synthetic bank of `per_subject` questions in each of three subjects.
pub fn generate_bank(per_subject: usize, seed: u64) -> Vec<QuestionProfile> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bank = Vec::with_capacity(per_subject * SUBJECTS.len());

    for subject in SUBJECTS {
        for i in 0..per_subject {
            let difficulty = (rng.random_range(MIN_ABILITY..=MAX_ABILITY) * 2.0).round() / 2.0;
            let mut question =
                QuestionProfile::new(format!("{subject}-{i:03}"), difficulty, subject);
            question.discrimination = rng.random_range(0.8..1.6);
            question.guessing = rng.random_range(0.0..0.25);
            question.topic = format!("{subject} unit {}", i % 4 + 1);
            question.tags = vec![subject.to_string(), format!("level-{}", difficulty.ceil())];
            question.success_rate = (1.0 - (difficulty - MIN_ABILITY) / 9.0 * 0.8).clamp(0.0, 1.0);
            question.avg_response_time = 10.0 + difficulty * 4.0;
            bank.push(question);
        }
    }

    bank
}

/// Runs select → answer → update until `max_questions` answers have been
/// given or no question is left.
pub fn run_session(
    engine: &AdaptiveEngine,
    student_id: &str,
    learner: &mut SimulatedLearner,
    max_questions: usize,
) -> EngineResult<SessionReport> {
    let mut profile = engine.start_or_resume(student_id)?;
    let mut answered: HashSet<String> = HashSet::new();
    let mut decisions = Vec::new();
    let mut correct_count = 0;

    let ended_by = loop {
        if answered.len() >= max_questions {
            break SessionEnd::MaxQuestions;
        }

        let decision = match engine.next_question(&profile, &answered) {
            Ok(decision) => decision,
            Err(EngineError::ExhaustedCatalog) => {
                tracing::info!(
                    student_id,
                    answered = answered.len(),
                    "catalog exhausted, ending assessment"
                );
                break SessionEnd::CatalogExhausted;
            }
            Err(err) => return Err(err),
        };

        let question = engine
            .catalog()
            .get(&decision.next_question_id)
            .ok_or_else(|| EngineError::UnknownQuestion(decision.next_question_id.clone()))?;

        let (is_correct, response_time) = learner.answer(&question);
        if is_correct {
            correct_count += 1;
        }

        let event = AnswerEvent {
            student_id: student_id.to_string(),
            question_id: question.question_id.clone(),
            is_correct,
            response_time,
            self_reported_confidence: None,
        };
        profile = engine.submit_answer(&event)?;
        answered.insert(question.question_id);
        decisions.push(decision);
    };

    let recommendations = engine.recommendations(&profile);
    Ok(SessionReport {
        profile,
        decisions,
        correct_count,
        ended_by,
        recommendations,
    })
}
