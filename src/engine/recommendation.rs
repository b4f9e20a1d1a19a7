use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::types::StudentProfile;

const GOAL_ABILITY_THRESHOLD: f64 = 6.0;
const GOAL_HORIZON_DAYS: u32 = 7;
const GOAL_ABILITY_STEP: f64 = 1.0;
const STRENGTH_DELTA: f64 = 0.5;
const WEAKNESS_DELTA: f64 = -0.5;

const LONG_TERM_STRATEGY: &str = "Practise a little every day, revisit mistakes within 48 hours, \
and let the assessment raise difficulty as your accuracy stabilises.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedAction {
    pub subject: String,
    pub action: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyGoal {
    pub description: String,
    pub horizon_days: u32,
    pub target_ability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub immediate_actions: Vec<RecommendedAction>,
    pub short_term_goals: Vec<StudyGoal>,
    pub long_term_strategy: String,
    pub resource_suggestions: BTreeMap<String, Vec<String>>,
    pub difficulty_adjustments: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationGenerator;

impl RecommendationGenerator {
    pub fn generate(profile: &StudentProfile) -> Recommendations {
        let immediate_actions = profile
            .weakness_subjects
            .iter()
            .map(|subject| RecommendedAction {
                subject: subject.clone(),
                action: format!("Review the fundamentals of {subject} before the next session"),
                priority: Priority::High,
            })
            .collect();

        let mut short_term_goals = Vec::new();
        if profile.current_ability < GOAL_ABILITY_THRESHOLD {
            let target = (profile.current_ability + GOAL_ABILITY_STEP).min(GOAL_ABILITY_THRESHOLD);
            short_term_goals.push(StudyGoal {
                description: format!(
                    "Raise your ability estimate from {:.1} to {:.1}",
                    profile.current_ability, target
                ),
                horizon_days: GOAL_HORIZON_DAYS,
                target_ability: target,
            });
        }

        let resource_suggestions = profile
            .weakness_subjects
            .iter()
            .map(|subject| (subject.clone(), resources_for(subject)))
            .collect();

        let difficulty_adjustments = profile
            .learning_patterns
            .keys()
            .map(|subject| {
                let delta = if profile.is_strong_in(subject) {
                    STRENGTH_DELTA
                } else if profile.is_weak_in(subject) {
                    WEAKNESS_DELTA
                } else {
                    0.0
                };
                (subject.clone(), delta)
            })
            .collect();

        Recommendations {
            immediate_actions,
            short_term_goals,
            long_term_strategy: LONG_TERM_STRATEGY.to_string(),
            resource_suggestions,
            difficulty_adjustments,
        }
    }
}

fn resources_for(subject: &str) -> Vec<String> {
    vec![
        format!("Worked examples covering core {subject} concepts"),
        format!("Short practice set of easier {subject} questions"),
        format!("Video walkthrough of common {subject} mistakes"),
    ]
}
