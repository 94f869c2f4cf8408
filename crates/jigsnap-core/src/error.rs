//! Engine error types.

use thiserror::Error;

/// Errors surfaced by the engine.
///
/// Only puzzle loading and configuration/serialization can fail. Lookups
/// that find nothing (no snap candidate, no connection, unknown id) return
/// `Option` instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Puzzle load failed: {0}")]
    LoadFailed(String),
    #[error("Puzzle load superseded by a newer load")]
    Superseded,
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
