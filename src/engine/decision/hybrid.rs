use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::engine::config::EngineConfig;
use crate::engine::decision::{
    ExpertRuleStrategy, HeuristicPredictorStrategy, IrtStrategy, SelectionContext,
    SelectionStrategy,
};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::types::{AdaptationDecision, AlgorithmUsed, StudentProfile};

const TIE_EPSILON: f64 = 1e-9;

/// One strategy's proposal together with its vote weight.
#[derive(Debug, Clone)]
pub struct DecisionCandidate {
    pub source: AlgorithmUsed,
    pub decision: AdaptationDecision,
    pub weight: f64,
}

struct WeightedStrategy {
    strategy: Box<dyn SelectionStrategy>,
    weight: f64,
}

/// Weighted vote over the selection strategies. Slot order is the tie-break
/// priority.
pub struct HybridCombiner {
    slots: Vec<WeightedStrategy>,
}

impl HybridCombiner {
    pub fn new(config: &EngineConfig) -> Self {
        let flags = &config.feature_flags;
        let weights = &config.weights;
        let mut slots: Vec<(Box<dyn SelectionStrategy>, f64)> = Vec::new();

        if flags.irt_enabled {
            slots.push((Box::new(IrtStrategy::new()), weights.irt));
        }
        if flags.heuristic_enabled {
            slots.push((
                Box::new(HeuristicPredictorStrategy::default()),
                weights.heuristic,
            ));
        }
        if flags.expert_enabled {
            slots.push((Box::new(ExpertRuleStrategy::default()), weights.expert));
        }

        if slots.is_empty() {
            tracing::warn!("all selection strategies disabled, falling back to defaults");
            return Self::new(&EngineConfig {
                weights: weights.clone(),
                ..EngineConfig::default()
            });
        }

        Self::with_strategies(slots)
    }

    /// Custom strategy slots in priority order, e.g. to swap in a calibrated
    /// estimator.
    pub fn with_strategies(strategies: Vec<(Box<dyn SelectionStrategy>, f64)>) -> Self {
        let slots = strategies
            .into_iter()
            .map(|(strategy, weight)| WeightedStrategy {
                strategy,
                weight: weight.max(0.0),
            })
            .collect();
        Self { slots }
    }

    pub fn decide(
        &self,
        profile: &StudentProfile,
        ctx: &SelectionContext<'_>,
    ) -> EngineResult<AdaptationDecision> {
        let mut candidates = Vec::with_capacity(self.slots.len());

        for slot in &self.slots {
            match slot.strategy.select(profile, ctx) {
                Ok(decision) => candidates.push(DecisionCandidate {
                    source: slot.strategy.algorithm(),
                    decision,
                    weight: slot.weight,
                }),
                Err(EngineError::ExhaustedCatalog) => {
                    tracing::debug!(
                        strategy = slot.strategy.algorithm().as_str(),
                        "strategy found no candidate"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        if candidates.is_empty() {
            tracing::warn!(student_id = %profile.student_id, "question catalog exhausted");
            return Err(EngineError::ExhaustedCatalog);
        }

        Self::combine(&candidates)
    }

    /// Fuses candidates listed in priority order.
    pub fn combine(candidates: &[DecisionCandidate]) -> EngineResult<AdaptationDecision> {
        if candidates.is_empty() {
            return Err(EngineError::ExhaustedCatalog);
        }

        let weights = normalized_weights(candidates);

        // (question id, accumulated weight), in first-vote order
        let mut tally: Vec<(&str, f64)> = Vec::new();
        for (c, w) in candidates.iter().zip(&weights) {
            let id = c.decision.next_question_id.as_str();
            match tally.iter_mut().find(|entry| entry.0 == id) {
                Some(entry) => entry.1 += w,
                None => tally.push((id, *w)),
            }
        }

        // First-vote order follows slot priority, so keeping the earlier entry
        // on a tie implements the priority tie-break.
        let mut winner = tally[0];
        for entry in tally.iter().skip(1) {
            if entry.1 > winner.1 + TIE_EPSILON {
                winner = *entry;
            }
        }
        let winner_id = winner.0.to_string();

        let mut adj_sum = 0.0;
        let mut adj_weight = 0.0;
        let mut confidence = 0.0;
        let mut voters = Vec::new();
        for (c, w) in candidates.iter().zip(&weights) {
            confidence += w * c.decision.confidence_level;
            if c.decision.next_question_id == winner_id {
                adj_sum += w * c.decision.difficulty_adjustment;
                adj_weight += w;
                voters.push(c.source.as_str());
            }
        }
        let adjustment = if adj_weight > TIE_EPSILON {
            (adj_sum / adj_weight).clamp(-1.0, 1.0)
        } else {
            0.0
        };

        let mut votes = Map::new();
        let mut weight_table = Map::new();
        for (c, w) in candidates.iter().zip(&weights) {
            votes.insert(
                c.source.as_str().to_string(),
                json!({
                    "questionId": c.decision.next_question_id,
                    "confidence": c.decision.confidence_level,
                    "adjustment": c.decision.difficulty_adjustment,
                }),
            );
            weight_table.insert(c.source.as_str().to_string(), json!(w));
        }
        let tally_map: Map<String, Value> = tally
            .iter()
            .map(|(id, w)| (id.to_string(), json!(w)))
            .collect();

        let mut metadata = BTreeMap::new();
        metadata.insert("votes".to_string(), Value::Object(votes));
        metadata.insert("weights".to_string(), Value::Object(weight_table));
        metadata.insert("tally".to_string(), Value::Object(tally_map));

        tracing::debug!(
            question_id = %winner_id,
            vote_weight = winner.1,
            confidence,
            "hybrid decision"
        );

        Ok(AdaptationDecision {
            reasoning: format!(
                "Hybrid vote: {} carried {:.2} of the weight ({})",
                winner_id,
                winner.1,
                voters.join(", ")
            ),
            next_question_id: winner_id,
            difficulty_adjustment: adjustment,
            confidence_level: confidence.clamp(0.0, 1.0),
            algorithm_used: AlgorithmUsed::Hybrid,
            metadata,
        })
    }
}

impl Default for HybridCombiner {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

fn normalized_weights(candidates: &[DecisionCandidate]) -> Vec<f64> {
    let total: f64 = candidates.iter().map(|c| c.weight).sum();
    if total > 1e-6 {
        candidates.iter().map(|c| c.weight / total).collect()
    } else {
        vec![1.0 / candidates.len() as f64; candidates.len()]
    }
}
