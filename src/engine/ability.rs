use crate::engine::types::{
    ConfidenceInterval, QuestionProfile, StudentProfile, DEFAULT_ABILITY, MAX_ABILITY,
    MIN_ABILITY, MIN_INTERVAL_WIDTH,
};

const HIGH_SUCCESS_RATE: f64 = 0.8;
const LOW_SUCCESS_RATE: f64 = 0.2;

const HARD_CORRECT_GAIN: f64 = 0.3;
const EASY_CORRECT_GAIN: f64 = 0.1;
const EASY_INCORRECT_LOSS: f64 = -0.3;
const HARD_INCORRECT_LOSS: f64 = -0.1;

const FAST_RESPONSE_SECS: f64 = 10.0;
const SLOW_RESPONSE_SECS: f64 = 60.0;
const TIME_FACTOR: f64 = 0.1;

const CORRECT_SHRINK: f64 = 0.1;
const INCORRECT_SHRINK: f64 = 0.05;

/// IRT-style statistical primitives on the 1–10 ability scale.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbilityModel;

impl AbilityModel {
    /// Monotone proxy for an IRT ability fit over `(difficulty, is_correct)`
    /// pairs.
    pub fn estimate_ability(answers: &[(f64, bool)]) -> f64 {
        if answers.is_empty() {
            return DEFAULT_ABILITY;
        }

        let n = answers.len() as f64;
        let avg_difficulty = answers.iter().map(|(d, _)| d).sum::<f64>() / n;
        let correct = answers.iter().filter(|(_, c)| *c).count();

        if correct == answers.len() {
            return (avg_difficulty + 1.0).clamp(MIN_ABILITY, MAX_ABILITY);
        }
        if correct == 0 {
            return (avg_difficulty - 1.0).clamp(MIN_ABILITY, MAX_ABILITY);
        }

        let success_rate = correct as f64 / n;
        let estimate = if success_rate > HIGH_SUCCESS_RATE {
            avg_difficulty + 1.0
        } else if success_rate < LOW_SUCCESS_RATE {
            avg_difficulty - 1.0
        } else {
            avg_difficulty
        };
        estimate.clamp(MIN_ABILITY, MAX_ABILITY)
    }

    pub fn probability(difficulty: f64, ability: f64) -> f64 {
        let z = (ability - difficulty).clamp(-20.0, 20.0);
        1.0 / (1.0 + (-z).exp())
    }

    /// Rasch item information `p(1-p)`; peaks at 0.25 when ability equals
    /// difficulty.
    pub fn fisher_information(difficulty: f64, ability: f64) -> f64 {
        let p = Self::probability(difficulty, ability);
        p * (1.0 - p)
    }

    /// Three-parameter logistic probability of a correct answer.
    pub fn probability_correct(ability: f64, question: &QuestionProfile) -> f64 {
        let guessing = question.guessing.clamp(0.0, 1.0);
        let z = (question.discrimination * (ability - question.difficulty_level))
            .clamp(-20.0, 20.0);
        guessing + (1.0 - guessing) / (1.0 + (-z).exp())
    }

    pub fn update_ability(
        current: f64,
        item_difficulty: f64,
        is_correct: bool,
        response_time: f64,
    ) -> f64 {
        let learning_factor = match (is_correct, item_difficulty > current) {
            (true, true) => HARD_CORRECT_GAIN,
            (true, false) => EASY_CORRECT_GAIN,
            (false, false) => EASY_INCORRECT_LOSS,
            (false, true) => HARD_INCORRECT_LOSS,
        };

        let time_factor = if response_time < FAST_RESPONSE_SECS {
            TIME_FACTOR
        } else if response_time > SLOW_RESPONSE_SECS {
            -TIME_FACTOR
        } else {
            0.0
        };

        (current + learning_factor + time_factor).clamp(MIN_ABILITY, MAX_ABILITY)
    }

    /// Narrows the interval around the profile's current ability. The width
    /// never drops below [`MIN_INTERVAL_WIDTH`].
    pub fn shrink_confidence_interval(
        profile: &StudentProfile,
        is_correct: bool,
    ) -> ConfidenceInterval {
        let width = Self::shrunk_width(profile.interval_width(), is_correct);
        ConfidenceInterval::centered(profile.current_ability, width)
    }

    pub(crate) fn shrunk_width(width: f64, is_correct: bool) -> f64 {
        let delta = if is_correct {
            CORRECT_SHRINK
        } else {
            INCORRECT_SHRINK
        };
        (width - delta).max(MIN_INTERVAL_WIDTH)
    }
}
