#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use adaptive_assessment::engine::{
    AdaptiveEngine, AnswerEvent, EngineConfig, InMemoryCatalog, InMemoryProfileStore,
    QuestionProfile,
};

pub fn math_bank() -> Vec<QuestionProfile> {
    vec![
        QuestionProfile::new("q3", 3.0, "math"),
        QuestionProfile::new("q5", 5.0, "math"),
        QuestionProfile::new("q7", 7.0, "math"),
    ]
}

pub fn mixed_bank() -> Vec<QuestionProfile> {
    let mut bank = Vec::new();
    for (subject, offset) in [("math", 0.0), ("history", 0.25), ("physics", 0.5)] {
        for level in 1..=9 {
            let difficulty = level as f64 + offset;
            bank.push(QuestionProfile::new(
                format!("{subject}-{level}"),
                difficulty,
                subject,
            ));
        }
    }
    bank
}

pub fn build_engine(bank: Vec<QuestionProfile>) -> AdaptiveEngine {
    AdaptiveEngine::new(
        EngineConfig::default(),
        Arc::new(InMemoryCatalog::new(bank).expect("valid bank")),
        Arc::new(InMemoryProfileStore::new()),
    )
}

pub fn answer(student_id: &str, question_id: &str, is_correct: bool, secs: f64) -> AnswerEvent {
    AnswerEvent {
        student_id: student_id.to_string(),
        question_id: question_id.to_string(),
        is_correct,
        response_time: secs,
        self_reported_confidence: None,
    }
}

pub fn ids(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}
