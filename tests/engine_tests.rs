//! End-to-end behaviour of the adaptive engine through its public API.

mod common;

use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::sync::Arc;

use adaptive_assessment::engine::decision::hybrid::DecisionCandidate;
use adaptive_assessment::engine::decision::{IrtStrategy, SelectionContext, SelectionStrategy};
use adaptive_assessment::engine::{
    AbilityModel, AdaptationDecision, AdaptiveEngine, AlgorithmUsed, EngineConfig, EngineError,
    HybridCombiner, InMemoryCatalog, InMemoryProfileStore, QuestionCatalog, StudentProfile,
};
use adaptive_assessment::simulation::{generate_bank, run_session, SessionEnd, SimulatedLearner};

use common::{answer, build_engine, ids, math_bank, mixed_bank};

fn proposal(source: AlgorithmUsed, id: &str, confidence: f64, weight: f64) -> DecisionCandidate {
    DecisionCandidate {
        source,
        decision: AdaptationDecision {
            next_question_id: id.to_string(),
            difficulty_adjustment: 0.0,
            confidence_level: confidence,
            reasoning: String::new(),
            algorithm_used: source,
            metadata: BTreeMap::new(),
        },
        weight,
    }
}

#[test]
fn irt_prefers_item_matching_ability() {
    let catalog = InMemoryCatalog::new(math_bank()).unwrap();
    let answered = HashSet::new();
    let ctx = SelectionContext::new(&catalog, &answered);
    let decision = IrtStrategy::new()
        .select(&StudentProfile::new("s1"), &ctx)
        .unwrap();
    assert_eq!(decision.next_question_id, "q5");
}

#[test]
fn five_correct_at_five_estimates_six() {
    let answers = vec![(5.0, true); 5];
    assert_eq!(AbilityModel::estimate_ability(&answers), 6.0);
}

#[test]
fn hybrid_vote_scenario() {
    let decision = HybridCombiner::combine(&[
        proposal(AlgorithmUsed::Irt, "Q1", 0.9, 0.40),
        proposal(AlgorithmUsed::Heuristic, "Q1", 0.85, 0.35),
        proposal(AlgorithmUsed::Expert, "Q2", 0.90, 0.25),
    ])
    .unwrap();

    assert_eq!(decision.next_question_id, "Q1");
    assert!((decision.confidence_level - 0.8825).abs() < 1e-9);
    let tally = decision.metadata["tally"].as_object().unwrap();
    assert!((tally["Q1"].as_f64().unwrap() - 0.75).abs() < 1e-9);
    assert!((tally["Q2"].as_f64().unwrap() - 0.25).abs() < 1e-9);
}

#[test]
fn exhausted_catalog_is_an_error() {
    let engine = build_engine(math_bank());
    let profile = engine.start_or_resume("s1").unwrap();
    let err = engine
        .next_question(&profile, &ids(&["q3", "q5", "q7"]))
        .unwrap_err();
    assert_eq!(err, EngineError::ExhaustedCatalog);
}

#[test]
fn answered_question_is_never_reselected() {
    let engine = build_engine(mixed_bank());
    let mut profile = engine.start_or_resume("s1").unwrap();
    let mut answered = HashSet::new();

    for i in 0..27 {
        let decision = engine.next_question(&profile, &answered).unwrap();
        assert!(
            !answered.contains(&decision.next_question_id),
            "step {i} reselected {}",
            decision.next_question_id
        );
        assert_eq!(decision.algorithm_used, AlgorithmUsed::Hybrid);
        assert!((-1.0..=1.0).contains(&decision.difficulty_adjustment));
        assert!((0.0..=1.0).contains(&decision.confidence_level));

        let event = answer("s1", &decision.next_question_id, i % 3 != 0, 15.0);
        profile = engine.submit_answer(&event).unwrap();
        answered.insert(decision.next_question_id);
    }

    assert_eq!(
        engine.next_question(&profile, &answered).unwrap_err(),
        EngineError::ExhaustedCatalog
    );
}

#[test]
fn ability_tracks_consistent_success() {
    let engine = build_engine(mixed_bank());
    let mut profile = engine.start_or_resume("s1").unwrap();
    let mut answered = HashSet::new();

    for _ in 0..8 {
        let decision = engine.next_question(&profile, &answered).unwrap();
        profile = engine
            .submit_answer(&answer("s1", &decision.next_question_id, true, 8.0))
            .unwrap();
        answered.insert(decision.next_question_id);
    }

    assert!(profile.current_ability > 6.0);
    assert!(profile.interval_width() < 2.0);
    assert!(profile.learning_speed > 1.0);
}

#[test]
fn recommendations_follow_profile() {
    let engine = build_engine(mixed_bank());
    let mut profile = engine.start_or_resume("s1").unwrap();
    for id in ["history-2", "history-3", "history-4"] {
        profile = engine.submit_answer(&answer("s1", id, false, 50.0)).unwrap();
    }

    let recs = engine.recommendations(&profile);
    assert!(profile.is_weak_in("history"));
    assert_eq!(recs.immediate_actions.len(), 1);
    assert_eq!(recs.resource_suggestions["history"].len(), 3);
    assert_eq!(recs.difficulty_adjustments["history"], -0.5);
    assert_eq!(recs, engine.recommendations(&profile));
}

#[test]
fn catalog_loads_from_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"questionId": "a", "difficultyLevel": 2.5, "subject": "math", "discrimination": 1.3}},
            {{"questionId": "b", "difficultyLevel": 6.0, "subject": "physics", "tags": ["optics"]}}
        ]"#
    )
    .unwrap();

    let catalog = InMemoryCatalog::from_path(file.path()).unwrap();
    assert_eq!(catalog.len(), 2);
    let b = catalog.get("b").unwrap();
    assert_eq!(b.tags, vec!["optics".to_string()]);
    assert_eq!(catalog.get("a").unwrap().discrimination, 1.3);
}

#[test]
fn catalog_rejects_malformed_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();
    assert!(matches!(
        InMemoryCatalog::from_path(file.path()),
        Err(EngineError::Catalog(_))
    ));
}

#[test]
fn simulated_session_ends_gracefully() {
    let bank = generate_bank(2, 3);
    let engine = AdaptiveEngine::new(
        EngineConfig::default(),
        Arc::new(InMemoryCatalog::new(bank).unwrap()),
        Arc::new(InMemoryProfileStore::new()),
    );
    let mut learner = SimulatedLearner::new(7.0, 11);

    let report = run_session(&engine, "sim", &mut learner, 50).unwrap();
    assert_eq!(report.ended_by, SessionEnd::CatalogExhausted);
    assert_eq!(report.decisions.len(), 6);
    assert!(report.profile.validate().is_ok());

    let mut learner = SimulatedLearner::new(7.0, 11);
    let short = run_session(&engine, "sim-2", &mut learner, 3).unwrap();
    assert_eq!(short.ended_by, SessionEnd::MaxQuestions);
    assert_eq!(short.decisions.len(), 3);
}

#[test]
fn strategy_slots_are_replaceable() {
    let combiner = HybridCombiner::with_strategies(vec![(Box::new(IrtStrategy::new()), 1.0)]);
    let engine = build_engine(math_bank()).with_combiner(combiner);
    let decision = engine
        .next_question(&StudentProfile::new("s1"), &HashSet::new())
        .unwrap();

    assert_eq!(decision.next_question_id, "q5");
    let weights = decision.metadata["weights"].as_object().unwrap();
    assert_eq!(weights.len(), 1);
    assert_eq!(weights["irt"].as_f64(), Some(1.0));
}
