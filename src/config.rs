// SPDX-License-Identifier: MIT

//! Runtime settings shared by chain definitions and the CLI

use crate::chain::{FailurePredicate, DEFAULT_SENTINEL_KEY};
use crate::error::{ChainError, Result};

/// Environment variable overriding the default sentinel key
pub const SENTINEL_ENV_VAR: &str = "CHAIN_SENTINEL_KEY";

/// Settings applied when a definition does not say otherwise
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Key whose presence in a mapping marks a failure
    pub sentinel_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sentinel_key: DEFAULT_SENTINEL_KEY.to_string(),
        }
    }
}

impl Settings {
    /// Read settings from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through a variable lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(SENTINEL_ENV_VAR) {
            Some(key) => Self::default().with_sentinel(key),
            None => Ok(Self::default()),
        }
    }

    /// Override the sentinel key
    pub fn with_sentinel(mut self, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ChainError::config("sentinel key must not be empty"));
        }
        self.sentinel_key = key;
        Ok(self)
    }

    /// Default predicate under these settings
    pub fn predicate(&self) -> FailurePredicate<'static> {
        FailurePredicate::sentinel(self.sentinel_key.clone())
    }
}
