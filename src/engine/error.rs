use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("no unanswered question is available for selection")]
    ExhaustedCatalog,
    #[error("invalid profile: {0}")]
    InvalidProfile(String),
    #[error("unknown question: {0}")]
    UnknownQuestion(String),
    #[error("profile store error: {0}")]
    Storage(String),
    #[error("catalog error: {0}")]
    Catalog(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
