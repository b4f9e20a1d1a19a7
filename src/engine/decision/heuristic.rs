use std::collections::BTreeMap;

use serde_json::json;

use crate::engine::decision::{closest_to, SelectionContext, SelectionStrategy};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::types::{
    AdaptationDecision, AlgorithmUsed, StudentProfile, MAX_ABILITY, MIN_ABILITY,
};

/// Fixed linear difficulty predictor occupying the learned-model slot.
pub struct HeuristicPredictorStrategy {
    speed_weight: f64,
    uncertainty_weight: f64,
    confidence: f64,
}

impl HeuristicPredictorStrategy {
    pub fn new(speed_weight: f64, uncertainty_weight: f64, confidence: f64) -> Self {
        Self {
            speed_weight,
            uncertainty_weight,
            confidence,
        }
    }

    pub fn predicted_difficulty(&self, profile: &StudentProfile) -> f64 {
        let predicted = profile.current_ability
            + (profile.learning_speed - 1.0) * self.speed_weight
            + (profile.interval_width() / 2.0) * self.uncertainty_weight;
        predicted.clamp(MIN_ABILITY, MAX_ABILITY)
    }
}

impl Default for HeuristicPredictorStrategy {
    fn default() -> Self {
        Self::new(0.5, 0.3, 0.85)
    }
}

impl SelectionStrategy for HeuristicPredictorStrategy {
    fn algorithm(&self) -> AlgorithmUsed {
        AlgorithmUsed::Heuristic
    }

    fn select(
        &self,
        profile: &StudentProfile,
        ctx: &SelectionContext<'_>,
    ) -> EngineResult<AdaptationDecision> {
        let candidates = ctx.candidates()?;
        let predicted = self.predicted_difficulty(profile);
        let chosen = closest_to(&candidates, predicted).ok_or(EngineError::ExhaustedCatalog)?;

        let adjustment = (predicted - chosen.difficulty_level).clamp(-1.0, 1.0);

        let mut metadata = BTreeMap::new();
        metadata.insert("predictedDifficulty".to_string(), json!(predicted));
        metadata.insert("learningSpeed".to_string(), json!(profile.learning_speed));
        metadata.insert(
            "intervalWidth".to_string(),
            json!(profile.interval_width()),
        );

        tracing::debug!(
            student_id = %profile.student_id,
            question_id = %chosen.question_id,
            predicted,
            "heuristic selection"
        );

        Ok(AdaptationDecision {
            next_question_id: chosen.question_id.clone(),
            difficulty_adjustment: adjustment,
            confidence_level: self.confidence,
            reasoning: format!(
                "Predicted difficulty {:.2}; closest item is {:.1}",
                predicted, chosen.difficulty_level
            ),
            algorithm_used: AlgorithmUsed::Heuristic,
            metadata,
        })
    }
}
