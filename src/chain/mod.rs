// SPDX-License-Identifier: MIT

//! Short-circuiting sequential binding
//!
//! This module provides:
//! - `Chain` / `evaluate` - run named steps in order, stopping at the first failure
//! - `Environment` - bindings visible to later steps and the final expression
//! - `FailurePredicate` - decides which non-null values count as failures

pub mod environment;
mod evaluator;
mod predicate;

pub use environment::Environment;
pub use evaluator::{evaluate, evaluate_outcome, Chain, Outcome, Step, StepFn};
pub use predicate::{is_short_circuit, FailurePredicate, DEFAULT_SENTINEL_KEY};
