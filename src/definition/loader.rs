//! Chain loader - YAML file loading and parsing
//!
//! JSON files load too, since YAML is a superset.

use super::types::ChainDefinition;
use crate::error::Result;
use std::fs;
use std::path::Path;

/// Loads chain definitions from YAML files
pub struct ChainLoader;

impl ChainLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a chain definition from a file
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<ChainDefinition> {
        let path = path.as_ref();
        log::debug!("Loading chain definition from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Parse a chain definition from a YAML string
    pub fn parse_yaml(content: &str) -> Result<ChainDefinition> {
        let def: ChainDefinition = serde_yaml::from_str(content)?;
        def.validate()?;
        Ok(def)
    }
}

impl Default for ChainLoader {
    fn default() -> Self {
        Self::new()
    }
}
