use std::collections::BTreeMap;

use serde_json::json;

use crate::engine::ability::AbilityModel;
use crate::engine::decision::{SelectionContext, SelectionStrategy};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::types::{AdaptationDecision, AlgorithmUsed, QuestionProfile, StudentProfile};

const WEAKNESS_BOOST: f64 = 1.2;
const MATCH_WEIGHT: f64 = 0.3;
const MAX_CONFIDENCE: f64 = 0.95;

/// Maximum-information item selection at the current ability estimate.
#[derive(Debug, Clone, Copy, Default)]
pub struct IrtStrategy;

impl IrtStrategy {
    pub fn new() -> Self {
        Self
    }

    pub fn difficulty_match(difficulty: f64, ability: f64) -> f64 {
        1.0 - (difficulty - ability).abs() / 10.0
    }

    pub fn score(question: &QuestionProfile, profile: &StudentProfile) -> f64 {
        let ability = profile.current_ability;
        let mut information = AbilityModel::fisher_information(question.difficulty_level, ability);
        if profile.is_weak_in(&question.subject) {
            information *= WEAKNESS_BOOST;
        }
        let matching = Self::difficulty_match(question.difficulty_level, ability);
        information * (1.0 + MATCH_WEIGHT * matching)
    }
}

impl SelectionStrategy for IrtStrategy {
    fn algorithm(&self) -> AlgorithmUsed {
        AlgorithmUsed::Irt
    }

    fn select(
        &self,
        profile: &StudentProfile,
        ctx: &SelectionContext<'_>,
    ) -> EngineResult<AdaptationDecision> {
        let candidates = ctx.candidates()?;

        let mut best: Option<(&QuestionProfile, f64)> = None;
        for q in &candidates {
            let score = Self::score(q, profile);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((q, score));
            }
        }
        let (chosen, information) = best.ok_or(EngineError::ExhaustedCatalog)?;

        let ability = profile.current_ability;
        let matching = Self::difficulty_match(chosen.difficulty_level, ability);
        let adjustment =
            ((chosen.difficulty_level - ability).signum() * (1.0 - matching)).clamp(-1.0, 1.0);
        let weakness_target = profile.is_weak_in(&chosen.subject);

        let mut metadata = BTreeMap::new();
        metadata.insert("information".to_string(), json!(information));
        metadata.insert("difficultyMatch".to_string(), json!(matching));
        metadata.insert("weaknessTarget".to_string(), json!(weakness_target));
        metadata.insert("candidateCount".to_string(), json!(candidates.len()));

        tracing::debug!(
            student_id = %profile.student_id,
            question_id = %chosen.question_id,
            information,
            "irt selection"
        );

        Ok(AdaptationDecision {
            next_question_id: chosen.question_id.clone(),
            difficulty_adjustment: adjustment,
            confidence_level: (information / 10.0).min(MAX_CONFIDENCE),
            reasoning: format!(
                "Maximum information at ability {:.2}: difficulty {:.1} in {}{}",
                ability,
                chosen.difficulty_level,
                chosen.subject,
                if weakness_target { " (weakness)" } else { "" }
            ),
            algorithm_used: AlgorithmUsed::Irt,
            metadata,
        })
    }
}
