//! Error types for PLA.
//!
//! The suggestion core itself never fails: a missing trigger, an empty
//! candidate list, or a malformed note all degrade to empty results. Errors
//! only come from the layers that touch the outside world (vault loading,
//! settings persistence, file watching).

use thiserror::Error;

/// Top-level result type for PLA operations.
pub type Result<T> = std::result::Result<T, PlaError>;

/// Top-level error type for PLA.
#[derive(Debug, Error)]
pub enum PlaError {
    #[error("vault error: {0}")]
    Vault(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}
