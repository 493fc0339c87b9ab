// SPDX-License-Identifier: MIT

//! Chains described as data and loaded from YAML

pub mod loader;
pub mod template;
pub mod types;

pub use loader::ChainLoader;
pub use types::{ChainDefinition, StepDefinition};
