// SPDX-License-Identifier: MIT

//! Condition expressions for failure predicates
//!
//! Conditions are simple expressions like:
//! - `status == 'error'`
//! - `code >= 500 and not exists data`
//! - `_ == null or tags contains 'fatal'`

mod ast;
mod evaluator;
mod parser;

pub use ast::{CompareOp, Expression, Literal};
pub use evaluator::{evaluate, Resolve};
pub use parser::parse;
