use std::path::PathBuf;

use crate::engine::config::{parse_flag, EngineConfig};
use crate::logging::LogSettings;

#[derive(Debug, Clone)]
pub struct Config {
    pub logging: LogSettings,
    pub catalog_path: Option<PathBuf>,
    pub max_questions: usize,
    pub simulated_ability: f64,
    pub simulation_seed: u64,
    pub engine: EngineConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = LogSettings::default();

        let logging = LogSettings {
            filter: non_empty("RUST_LOG").unwrap_or(defaults.filter),
            file_enabled: lookup("ENABLE_FILE_LOGS")
                .as_deref()
                .and_then(parse_flag)
                .unwrap_or(defaults.file_enabled),
            dir: non_empty("LOG_DIR").map(PathBuf::from).unwrap_or(defaults.dir),
            file_prefix: non_empty("LOG_FILE_PREFIX").unwrap_or(defaults.file_prefix),
        };

        let catalog_path = non_empty("CATALOG_PATH").map(PathBuf::from);

        let max_questions = lookup("MAX_QUESTIONS")
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(20);

        let simulated_ability = lookup("SIMULATED_ABILITY")
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(6.5);

        let simulation_seed = lookup("SIMULATION_SEED")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(42);

        Self {
            logging,
            catalog_path,
            max_questions,
            simulated_ability,
            simulation_seed,
            engine: EngineConfig::from_lookup(&lookup),
        }
    }
}
