// SPDX-License-Identifier: MIT

pub mod chain;
pub mod condition;
pub mod config;
pub mod definition;
pub mod error;

pub use chain::{evaluate, Chain, Environment, FailurePredicate, Outcome, Step};
pub use error::ChainError;
