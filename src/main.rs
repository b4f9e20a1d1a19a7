use std::process::ExitCode;
use std::sync::Arc;

use uuid::Uuid;

use adaptive_assessment::config::Config;
use adaptive_assessment::engine::{AdaptiveEngine, InMemoryCatalog, InMemoryProfileStore};
use adaptive_assessment::logging::init_tracing;
use adaptive_assessment::simulation::{generate_bank, run_session, SimulatedLearner};

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = init_tracing(&config.logging);

    let catalog = match &config.catalog_path {
        Some(path) => InMemoryCatalog::from_path(path),
        None => InMemoryCatalog::new(generate_bank(15, config.simulation_seed)),
    };
    let catalog = match catalog {
        Ok(catalog) => catalog,
        Err(err) => {
            tracing::error!(error = %err, "failed to load question catalog");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(questions = catalog.len(), "question catalog ready");

    let engine = AdaptiveEngine::new(
        config.engine.clone(),
        Arc::new(catalog),
        Arc::new(InMemoryProfileStore::new()),
    );

    let student_id = Uuid::new_v4().to_string();
    let mut learner = SimulatedLearner::new(config.simulated_ability, config.simulation_seed);

    let report = match run_session(&engine, &student_id, &mut learner, config.max_questions) {
        Ok(report) => report,
        Err(err) => {
            tracing::error!(error = %err, %student_id, "assessment session failed");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        %student_id,
        true_ability = learner.true_ability(),
        estimated_ability = report.profile.current_ability,
        answered = report.decisions.len(),
        correct = report.correct_count,
        "assessment finished"
    );

    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to serialize session report");
            ExitCode::FAILURE
        }
    }
}
