// SPDX-License-Identifier: MIT

//! Typed error handling for chain-let
//!
//! Evaluation itself never fails with a `ChainError`: a short-circuit is an
//! ordinary value. These errors cover loading definitions, parsing
//! conditions and reading settings.

use thiserror::Error;

/// Top-level error type for chain-let
#[derive(Debug, Error)]
pub enum ChainError {
    /// Condition expression could not be parsed
    #[error("Invalid condition '{input}': {message}")]
    InvalidCondition { input: String, message: String },

    /// Chain definition is structurally wrong
    #[error("Invalid chain definition: {0}")]
    InvalidDefinition(String),

    /// Configuration errors (bad env vars, bad overrides)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl ChainError {
    /// Create a condition parse error
    pub fn invalid_condition(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidCondition {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Create a definition error
    pub fn invalid_definition(message: impl Into<String>) -> Self {
        Self::InvalidDefinition(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result alias for fallible non-evaluation operations
pub type Result<T> = std::result::Result<T, ChainError>;
