pub mod ability;
pub mod catalog;
pub mod config;
pub mod decision;
pub mod error;
pub mod profile;
pub mod recommendation;
pub mod service;
pub mod types;

pub use ability::AbilityModel;
pub use catalog::{InMemoryCatalog, InMemoryProfileStore, ProfileStore, QuestionCatalog};
pub use config::EngineConfig;
pub use decision::{HybridCombiner, SelectionContext, SelectionStrategy};
pub use error::{EngineError, EngineResult};
pub use profile::{ProfileAnalyzer, ProfileUpdater};
pub use recommendation::{RecommendationGenerator, Recommendations};
pub use service::AdaptiveEngine;
pub use types::*;
