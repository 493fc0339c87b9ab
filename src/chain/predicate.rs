// SPDX-License-Identifier: MIT

//! Failure predicates deciding when a step value short-circuits a chain

use crate::condition::{self, Expression};
use crate::error::Result;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Sentinel key checked by the default predicate
pub const DEFAULT_SENTINEL_KEY: &str = "break";

/// Decides whether a non-null step value is a failure.
///
/// `'a` bounds what a custom closure may borrow, as with [`Step`](super::Step).
#[derive(Clone)]
pub enum FailurePredicate<'a> {
    /// Value is a mapping containing this key
    SentinelKey(String),
    /// Condition expression holds for the value
    Condition(Expression),
    /// Caller-supplied test
    Custom(Arc<dyn Fn(&Value) -> bool + 'a>),
    /// Nothing fails; only null short-circuits
    Never,
}

impl<'a> FailurePredicate<'a> {
    /// Predicate checking for a sentinel key
    pub fn sentinel(key: impl Into<String>) -> Self {
        Self::SentinelKey(key.into())
    }

    /// Parse a condition expression into a predicate
    pub fn condition(input: &str) -> Result<Self> {
        Ok(Self::Condition(condition::parse(input)?))
    }

    /// Wrap a closure as a predicate
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + 'a,
    {
        Self::Custom(Arc::new(f))
    }

    /// Test a value against this predicate
    pub fn is_failure(&self, value: &Value) -> bool {
        match self {
            Self::SentinelKey(key) => value
                .as_object()
                .is_some_and(|obj| obj.contains_key(key)),
            Self::Condition(expr) => condition::evaluate(expr, value),
            Self::Custom(f) => f(value),
            Self::Never => false,
        }
    }
}

impl Default for FailurePredicate<'_> {
    fn default() -> Self {
        Self::sentinel(DEFAULT_SENTINEL_KEY)
    }
}

impl fmt::Debug for FailurePredicate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SentinelKey(key) => f.debug_tuple("SentinelKey").field(key).finish(),
            Self::Condition(expr) => f.debug_tuple("Condition").field(&expr.to_string()).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
            Self::Never => f.write_str("Never"),
        }
    }
}

/// True when `value` stops a chain: null, or a failure under `predicate`
pub fn is_short_circuit(value: &Value, predicate: &FailurePredicate<'_>) -> bool {
    value.is_null() || predicate.is_failure(value)
}
