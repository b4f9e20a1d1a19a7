use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::engine::error::{EngineError, EngineResult};

pub const MIN_ABILITY: f64 = 1.0;
pub const MAX_ABILITY: f64 = 10.0;
pub const DEFAULT_ABILITY: f64 = 5.0;
pub const DEFAULT_INTERVAL_WIDTH: f64 = 2.0;
pub const MIN_INTERVAL_WIDTH: f64 = 0.5;
pub const MIN_LEARNING_SPEED: f64 = 0.5;
pub const MAX_LEARNING_SPEED: f64 = 2.0;

pub const STRENGTH_ACCURACY: f64 = 0.7;
pub const WEAKNESS_ACCURACY: f64 = 0.4;
pub const MIN_SUBJECT_OBSERVATIONS: u32 = 3;

const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlgorithmUsed {
    Irt,
    Heuristic,
    Expert,
    Hybrid,
}

impl AlgorithmUsed {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Irt => "irt",
            Self::Heuristic => "heuristic",
            Self::Expert => "expert",
            Self::Hybrid => "hybrid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl Default for ConfidenceInterval {
    fn default() -> Self {
        Self::centered(DEFAULT_ABILITY, DEFAULT_INTERVAL_WIDTH)
    }
}

impl ConfidenceInterval {
    /// Window of `width` around `center`, shifted (not truncated) so that it
    /// stays inside the ability domain.
    pub fn centered(center: f64, width: f64) -> Self {
        let width = width.clamp(MIN_INTERVAL_WIDTH, MAX_ABILITY - MIN_ABILITY);
        let center = center.clamp(MIN_ABILITY, MAX_ABILITY);
        let mut lower = center - width / 2.0;
        let mut upper = center + width / 2.0;
        if lower < MIN_ABILITY {
            lower = MIN_ABILITY;
            upper = MIN_ABILITY + width;
        } else if upper > MAX_ABILITY {
            upper = MAX_ABILITY;
            lower = MAX_ABILITY - width;
        }
        Self { lower, upper }
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPattern {
    pub correct_count: u32,
    pub total_count: u32,
    pub avg_response_time: f64,
}

impl LearningPattern {
    pub fn record(&mut self, is_correct: bool, response_time: f64) {
        self.total_count += 1;
        if is_correct {
            self.correct_count += 1;
        }
        let n = self.total_count as f64;
        self.avg_response_time += (response_time - self.avg_response_time) / n;
    }

    pub fn accuracy(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        self.correct_count as f64 / self.total_count as f64
    }

    pub fn is_strength(&self) -> bool {
        self.total_count >= MIN_SUBJECT_OBSERVATIONS && self.accuracy() > STRENGTH_ACCURACY
    }

    pub fn is_weakness(&self) -> bool {
        self.total_count >= MIN_SUBJECT_OBSERVATIONS && self.accuracy() < WEAKNESS_ACCURACY
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub student_id: String,
    pub current_ability: f64,
    pub confidence_interval: ConfidenceInterval,
    pub learning_speed: f64,
    #[serde(default)]
    pub strength_subjects: BTreeSet<String>,
    #[serde(default)]
    pub weakness_subjects: BTreeSet<String>,
    #[serde(default)]
    pub learning_patterns: BTreeMap<String, LearningPattern>,
    pub last_updated: i64,
}

impl StudentProfile {
    pub fn new(student_id: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            current_ability: DEFAULT_ABILITY,
            confidence_interval: ConfidenceInterval::default(),
            learning_speed: 1.0,
            strength_subjects: BTreeSet::new(),
            weakness_subjects: BTreeSet::new(),
            learning_patterns: BTreeMap::new(),
            last_updated: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn preferred_difficulty(&self) -> f64 {
        self.current_ability
    }

    pub fn interval_width(&self) -> f64 {
        self.confidence_interval.width()
    }

    pub fn total_answers(&self) -> u32 {
        self.learning_patterns.values().map(|p| p.total_count).sum()
    }

    pub fn is_weak_in(&self, subject: &str) -> bool {
        self.weakness_subjects.contains(subject)
    }

    pub fn is_strong_in(&self, subject: &str) -> bool {
        self.strength_subjects.contains(subject)
    }

    pub fn refresh_subject_classification(&mut self) {
        self.strength_subjects = self
            .learning_patterns
            .iter()
            .filter(|(_, p)| p.is_strength())
            .map(|(s, _)| s.clone())
            .collect();
        self.weakness_subjects = self
            .learning_patterns
            .iter()
            .filter(|(_, p)| p.is_weakness())
            .map(|(s, _)| s.clone())
            .collect();
    }

    pub fn validate(&self) -> EngineResult<()> {
        let ability = self.current_ability;
        if !ability.is_finite() || !(MIN_ABILITY..=MAX_ABILITY).contains(&ability) {
            return Err(EngineError::InvalidProfile(format!(
                "ability {ability} outside [{MIN_ABILITY}, {MAX_ABILITY}]"
            )));
        }

        let ci = self.confidence_interval;
        if !ci.lower.is_finite()
            || !ci.upper.is_finite()
            || ci.lower < MIN_ABILITY
            || ci.upper > MAX_ABILITY
            || ci.width() < MIN_INTERVAL_WIDTH - EPSILON
        {
            return Err(EngineError::InvalidProfile(format!(
                "confidence interval ({}, {}) outside domain",
                ci.lower, ci.upper
            )));
        }

        let speed = self.learning_speed;
        if !speed.is_finite() || !(MIN_LEARNING_SPEED..=MAX_LEARNING_SPEED).contains(&speed) {
            return Err(EngineError::InvalidProfile(format!(
                "learning speed {speed} outside [{MIN_LEARNING_SPEED}, {MAX_LEARNING_SPEED}]"
            )));
        }

        if let Some(subject) = self
            .strength_subjects
            .intersection(&self.weakness_subjects)
            .next()
        {
            return Err(EngineError::InvalidProfile(format!(
                "subject {subject} is both a strength and a weakness"
            )));
        }

        Ok(())
    }
}

fn default_discrimination() -> f64 {
    1.0
}

fn default_success_rate() -> f64 {
    0.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionProfile {
    pub question_id: String,
    pub difficulty_level: f64,
    #[serde(default = "default_discrimination")]
    pub discrimination: f64,
    #[serde(default)]
    pub guessing: f64,
    pub subject: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_success_rate")]
    pub success_rate: f64,
    #[serde(default)]
    pub avg_response_time: f64,
}

impl QuestionProfile {
    pub fn new(
        question_id: impl Into<String>,
        difficulty_level: f64,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            question_id: question_id.into(),
            difficulty_level,
            discrimination: default_discrimination(),
            guessing: 0.0,
            subject: subject.into(),
            topic: String::new(),
            tags: Vec::new(),
            success_rate: default_success_rate(),
            avg_response_time: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptationDecision {
    pub next_question_id: String,
    pub difficulty_adjustment: f64,
    pub confidence_level: f64,
    pub reasoning: String,
    pub algorithm_used: AlgorithmUsed,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEvent {
    pub student_id: String,
    pub question_id: String,
    pub is_correct: bool,
    /// Seconds.
    pub response_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_reported_confidence: Option<u8>,
}

/// One entry of a learner's stored answer history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_id: String,
    pub subject: String,
    pub difficulty: f64,
    pub is_correct: bool,
    pub response_time: f64,
}

impl AnswerRecord {
    pub fn from_event(event: &AnswerEvent, question: &QuestionProfile) -> Self {
        Self {
            question_id: question.question_id.clone(),
            subject: question.subject.clone(),
            difficulty: question.difficulty_level,
            is_correct: event.is_correct,
            response_time: event.response_time,
        }
    }
}
