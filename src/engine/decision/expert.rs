use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::engine::decision::{closest_to, SelectionContext, SelectionStrategy};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::types::{AdaptationDecision, AlgorithmUsed, QuestionProfile, StudentProfile};

const RULE_MARGIN: f64 = 0.5;
const OVERRIDE_ADJUSTMENT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpertRule {
    BuildConfidence,
    ChallengeStudent,
    OptimalChallenge,
}

impl ExpertRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BuildConfidence => "build_confidence",
            Self::ChallengeStudent => "challenge_student",
            Self::OptimalChallenge => "optimal_challenge",
        }
    }

    fn admits(&self, difficulty: f64, ability: f64) -> bool {
        match self {
            Self::BuildConfidence => difficulty <= ability + RULE_MARGIN,
            Self::ChallengeStudent => difficulty >= ability - RULE_MARGIN,
            Self::OptimalChallenge => true,
        }
    }
}

/// Small decision table keyed on the ability band.
pub struct ExpertRuleStrategy {
    low_ability: f64,
    high_ability: f64,
    confidence: f64,
}

impl ExpertRuleStrategy {
    pub fn new(low_ability: f64, high_ability: f64, confidence: f64) -> Self {
        Self {
            low_ability,
            high_ability,
            confidence,
        }
    }

    pub fn rule_for(&self, ability: f64) -> ExpertRule {
        if ability < self.low_ability {
            ExpertRule::BuildConfidence
        } else if ability > self.high_ability {
            ExpertRule::ChallengeStudent
        } else {
            ExpertRule::OptimalChallenge
        }
    }
}

impl Default for ExpertRuleStrategy {
    fn default() -> Self {
        Self::new(4.0, 7.0, 0.90)
    }
}

impl SelectionStrategy for ExpertRuleStrategy {
    fn algorithm(&self) -> AlgorithmUsed {
        AlgorithmUsed::Expert
    }

    fn select(
        &self,
        profile: &StudentProfile,
        ctx: &SelectionContext<'_>,
    ) -> EngineResult<AdaptationDecision> {
        let candidates = ctx.candidates()?;
        let ability = profile.current_ability;
        let rule = self.rule_for(ability);

        let natural = closest_to(&candidates, ability).ok_or(EngineError::ExhaustedCatalog)?;

        let mut admitted: Vec<QuestionProfile> = candidates
            .iter()
            .filter(|q| rule.admits(q.difficulty_level, ability))
            .cloned()
            .collect();
        let fallback = admitted.is_empty();
        if fallback {
            admitted = candidates.clone();
        }

        // Only the rule filter counts as an override; steering toward a weak
        // subject inside the admitted band carries no adjustment.
        let rule_pick = closest_to(&admitted, ability).ok_or(EngineError::ExhaustedCatalog)?;
        let overridden = rule_pick.question_id != natural.question_id;
        let delta = rule_pick.difficulty_level - natural.difficulty_level;
        let adjustment = if overridden && delta.abs() > f64::EPSILON {
            OVERRIDE_ADJUSTMENT * delta.signum()
        } else {
            0.0
        };

        let weak: Vec<QuestionProfile> = admitted
            .iter()
            .filter(|q| profile.is_weak_in(&q.subject))
            .cloned()
            .collect();
        let chosen = if weak.is_empty() {
            rule_pick
        } else {
            closest_to(&weak, ability).ok_or(EngineError::ExhaustedCatalog)?
        };
        let weakness_target = chosen.question_id != rule_pick.question_id;

        let mut metadata = BTreeMap::new();
        metadata.insert("rule".to_string(), json!(rule.as_str()));
        metadata.insert("overridden".to_string(), json!(overridden));
        metadata.insert("fallback".to_string(), json!(fallback));
        metadata.insert("weaknessTarget".to_string(), json!(weakness_target));
        metadata.insert(
            "naturalQuestionId".to_string(),
            json!(natural.question_id),
        );

        tracing::debug!(
            student_id = %profile.student_id,
            question_id = %chosen.question_id,
            rule = rule.as_str(),
            overridden,
            "expert selection"
        );

        Ok(AdaptationDecision {
            next_question_id: chosen.question_id.clone(),
            difficulty_adjustment: adjustment,
            confidence_level: self.confidence,
            reasoning: format!(
                "Rule {} at ability {:.2}: difficulty {:.1} in {}{}",
                rule.as_str(),
                ability,
                chosen.difficulty_level,
                chosen.subject,
                if weakness_target {
                    " (weak subject)"
                } else {
                    ""
                }
            ),
            algorithm_used: AlgorithmUsed::Expert,
            metadata,
        })
    }
}
