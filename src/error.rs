//! Error types for configuration loading
//!
//! The terrain core itself never fails; every runtime failure mode is
//! absorbed as policy. Only reading and validating tuning can error.

use thiserror::Error;

/// Errors raised while loading a [`crate::TerrainConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
