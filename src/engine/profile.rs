use crate::engine::ability::AbilityModel;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::types::{
    AnswerEvent, AnswerRecord, ConfidenceInterval, QuestionProfile, StudentProfile,
    DEFAULT_INTERVAL_WIDTH, MAX_ABILITY, MAX_LEARNING_SPEED, MIN_ABILITY, MIN_LEARNING_SPEED,
};

const CORRECT_SPEED_GAIN: f64 = 0.1;
const INCORRECT_SPEED_LOSS: f64 = -0.05;
const QUICK_ANSWER_SECS: f64 = 30.0;
const QUICK_SPEED_GAIN: f64 = 0.05;
const SLOW_SPEED_LOSS: f64 = -0.02;
const HARD_ITEM_THRESHOLD: f64 = 5.0;
const HARD_SPEED_GAIN: f64 = 0.02;
const EASY_SPEED_LOSS: f64 = -0.01;

/// Builds a profile from stored answer history.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileAnalyzer;

impl ProfileAnalyzer {
    pub fn analyze(student_id: &str, history: &[AnswerRecord]) -> StudentProfile {
        Self::analyze_at(student_id, history, chrono::Utc::now().timestamp_millis())
    }

    pub fn analyze_at(student_id: &str, history: &[AnswerRecord], now_ms: i64) -> StudentProfile {
        let mut profile = StudentProfile::new(student_id);
        profile.last_updated = now_ms;

        let usable: Vec<&AnswerRecord> = history
            .iter()
            .filter(|r| {
                let ok = r.difficulty.is_finite() && r.response_time.is_finite();
                if !ok {
                    tracing::warn!(
                        student_id,
                        question_id = %r.question_id,
                        "skipping malformed answer record"
                    );
                }
                ok
            })
            .collect();

        if usable.is_empty() {
            tracing::info!(student_id, "cold start profile");
            return profile;
        }

        let pairs: Vec<(f64, bool)> = usable
            .iter()
            .map(|r| (r.difficulty.clamp(MIN_ABILITY, MAX_ABILITY), r.is_correct))
            .collect();
        profile.current_ability = AbilityModel::estimate_ability(&pairs);

        let mut width = DEFAULT_INTERVAL_WIDTH;
        for r in &usable {
            profile
                .learning_patterns
                .entry(r.subject.clone())
                .or_default()
                .record(r.is_correct, r.response_time.max(0.0));
            profile.learning_speed = ProfileUpdater::next_learning_speed(
                profile.learning_speed,
                r.is_correct,
                r.response_time,
                r.difficulty,
            );
            width = AbilityModel::shrunk_width(width, r.is_correct);
        }
        profile.refresh_subject_classification();
        profile.confidence_interval = ConfidenceInterval::centered(profile.current_ability, width);

        tracing::debug!(
            student_id,
            answers = usable.len(),
            ability = profile.current_ability,
            "profile rebuilt from history"
        );
        profile
    }
}

/// Applies answer events to profiles. Every call returns a new value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileUpdater;

impl ProfileUpdater {
    pub fn apply(
        profile: &StudentProfile,
        event: &AnswerEvent,
        question: &QuestionProfile,
    ) -> EngineResult<StudentProfile> {
        Self::apply_at(profile, event, question, chrono::Utc::now().timestamp_millis())
    }

    pub fn apply_at(
        profile: &StudentProfile,
        event: &AnswerEvent,
        question: &QuestionProfile,
        now_ms: i64,
    ) -> EngineResult<StudentProfile> {
        if let Err(err) = Self::validate_event(profile, event, question) {
            tracing::warn!(
                student_id = %event.student_id,
                question_id = %event.question_id,
                error = %err,
                "answer event rejected"
            );
            return Err(err);
        }

        let mut next = profile.clone();
        next.current_ability = AbilityModel::update_ability(
            profile.current_ability,
            question.difficulty_level,
            event.is_correct,
            event.response_time,
        );

        next.learning_patterns
            .entry(question.subject.clone())
            .or_default()
            .record(event.is_correct, event.response_time);
        next.refresh_subject_classification();

        next.learning_speed = Self::next_learning_speed(
            profile.learning_speed,
            event.is_correct,
            event.response_time,
            question.difficulty_level,
        );

        next.confidence_interval =
            AbilityModel::shrink_confidence_interval(&next, event.is_correct);
        next.last_updated = now_ms;

        next.validate()?;

        tracing::info!(
            student_id = %next.student_id,
            question_id = %question.question_id,
            correct = event.is_correct,
            ability = next.current_ability,
            "answer applied"
        );
        Ok(next)
    }

    pub fn next_learning_speed(
        current: f64,
        is_correct: bool,
        response_time: f64,
        difficulty: f64,
    ) -> f64 {
        let correctness = if is_correct {
            CORRECT_SPEED_GAIN
        } else {
            INCORRECT_SPEED_LOSS
        };
        let timing = if response_time < QUICK_ANSWER_SECS {
            QUICK_SPEED_GAIN
        } else {
            SLOW_SPEED_LOSS
        };
        let challenge = if difficulty > HARD_ITEM_THRESHOLD {
            HARD_SPEED_GAIN
        } else {
            EASY_SPEED_LOSS
        };
        (current + correctness + timing + challenge).clamp(MIN_LEARNING_SPEED, MAX_LEARNING_SPEED)
    }

    fn validate_event(
        profile: &StudentProfile,
        event: &AnswerEvent,
        question: &QuestionProfile,
    ) -> EngineResult<()> {
        if event.student_id != profile.student_id {
            return Err(EngineError::InvalidProfile(format!(
                "answer from {} applied to profile {}",
                event.student_id, profile.student_id
            )));
        }
        if event.question_id != question.question_id {
            return Err(EngineError::UnknownQuestion(event.question_id.clone()));
        }
        if !event.response_time.is_finite() || event.response_time < 0.0 {
            return Err(EngineError::InvalidProfile(format!(
                "response time {} is not a non-negative number of seconds",
                event.response_time
            )));
        }
        if let Some(confidence) = event.self_reported_confidence {
            if !(1..=5).contains(&confidence) {
                return Err(EngineError::InvalidProfile(format!(
                    "self-reported confidence {confidence} outside 1..=5"
                )));
            }
        }
        let d = question.difficulty_level;
        if !d.is_finite() || !(MIN_ABILITY..=MAX_ABILITY).contains(&d) {
            return Err(EngineError::InvalidProfile(format!(
                "question {} has difficulty {d} outside the ability scale",
                question.question_id
            )));
        }
        Ok(())
    }
}
