//! Chain evaluator
//!
//! Runs named steps in order, binding each value into an [`Environment`].
//! The first step whose value is null or fails the [`FailurePredicate`]
//! stops the chain and becomes the result. Otherwise the final expression
//! runs against every binding.

use super::environment::Environment;
use super::predicate::{is_short_circuit, FailurePredicate};
use serde_json::Value;
use std::convert::Infallible;
use std::fmt;

/// Boxed step body
pub type StepFn<'a, E> = Box<dyn FnOnce(&Environment) -> Result<Value, E> + 'a>;

/// A named computation in a chain
pub struct Step<'a, E = Infallible> {
    name: String,
    expr: StepFn<'a, E>,
}

impl<'a, E> Step<'a, E> {
    /// Create a step that cannot fail
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(&Environment) -> Value + 'a,
    {
        Self {
            name: name.into(),
            expr: Box::new(move |env: &Environment| Ok(f(env))),
        }
    }

    /// Create a step whose body may return an error
    pub fn fallible<F>(name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(&Environment) -> Result<Value, E> + 'a,
    {
        Self {
            name: name.into(),
            expr: Box::new(f),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<E> fmt::Debug for Step<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step").field("name", &self.name).finish()
    }
}

/// How a chain ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Every step passed; holds the final expression's value
    Completed(Value),
    /// A step stopped the chain; holds the culprit value
    ShortCircuited {
        step: String,
        index: usize,
        value: Value,
    },
}

impl Outcome {
    /// The returned value, whichever way the chain ended
    pub fn value(&self) -> &Value {
        match self {
            Outcome::Completed(value) | Outcome::ShortCircuited { value, .. } => value,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Outcome::Completed(value) | Outcome::ShortCircuited { value, .. } => value,
        }
    }

    pub fn is_short_circuit(&self) -> bool {
        matches!(self, Outcome::ShortCircuited { .. })
    }
}

/// Evaluate `steps` in order, then `final_expr`.
///
/// Returns the first short-circuiting step value, or the final value.
/// Errors from step bodies or the final expression are returned as-is.
pub fn evaluate<'a, E, I, F>(
    steps: I,
    final_expr: F,
    predicate: &FailurePredicate<'_>,
    environment: Environment,
) -> Result<Value, E>
where
    I: IntoIterator<Item = Step<'a, E>>,
    F: FnOnce(&Environment) -> Result<Value, E>,
{
    evaluate_outcome(steps, final_expr, predicate, environment).map(Outcome::into_value)
}

/// Like [`evaluate`], but reports which step short-circuited
pub fn evaluate_outcome<'a, E, I, F>(
    steps: I,
    final_expr: F,
    predicate: &FailurePredicate<'_>,
    mut environment: Environment,
) -> Result<Outcome, E>
where
    I: IntoIterator<Item = Step<'a, E>>,
    F: FnOnce(&Environment) -> Result<Value, E>,
{
    for (index, Step { name, expr }) in steps.into_iter().enumerate() {
        let value = expr(&environment)?;

        if is_short_circuit(&value, predicate) {
            log::info!("Chain short-circuited at step {} ({})", index, name);
            return Ok(Outcome::ShortCircuited {
                step: name,
                index,
                value,
            });
        }

        log::debug!("Step {} ({}) bound", index, name);
        environment.bind(name, value);
    }

    let value = final_expr(&environment)?;
    log::debug!("Chain completed with {} bindings", environment.len());
    Ok(Outcome::Completed(value))
}

/// Builder for a chain of steps
pub struct Chain<'a, E = Infallible> {
    steps: Vec<Step<'a, E>>,
    predicate: FailurePredicate<'a>,
    bindings: Environment,
}

impl<'a> Chain<'a, Infallible> {
    /// Create a chain whose steps cannot fail
    pub fn new() -> Self {
        Self::fallible()
    }

    /// Evaluate the chain, returning the culprit or the final value
    pub fn run<F>(self, final_expr: F) -> Value
    where
        F: FnOnce(&Environment) -> Value,
    {
        self.outcome(final_expr).into_value()
    }

    /// Evaluate the chain, reporting how it ended
    pub fn outcome<F>(self, final_expr: F) -> Outcome
    where
        F: FnOnce(&Environment) -> Value,
    {
        match self.try_outcome(|env| Ok(final_expr(env))) {
            Ok(outcome) => outcome,
            Err(never) => match never {},
        }
    }
}

impl Default for Chain<'_, Infallible> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, E> Chain<'a, E> {
    /// Create a chain whose steps may return `E`
    pub fn fallible() -> Self {
        Self {
            steps: Vec::new(),
            predicate: FailurePredicate::default(),
            bindings: Environment::empty(),
        }
    }

    /// Start from existing bindings instead of an empty environment
    pub fn with_bindings(mut self, bindings: Environment) -> Self {
        self.bindings = bindings;
        self
    }

    /// Replace the failure predicate
    pub fn predicate(mut self, predicate: FailurePredicate<'a>) -> Self {
        self.predicate = predicate;
        self
    }

    /// Use a sentinel-key predicate with `key`
    pub fn sentinel(self, key: impl Into<String>) -> Self {
        self.predicate(FailurePredicate::sentinel(key))
    }

    /// Append a step that cannot fail
    pub fn step<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(&Environment) -> Value + 'a,
    {
        self.steps.push(Step::new(name, f));
        self
    }

    /// Append a step whose body may return an error
    pub fn try_step<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(&Environment) -> Result<Value, E> + 'a,
    {
        self.steps.push(Step::fallible(name, f));
        self
    }

    /// Append a prepared step
    pub fn push(&mut self, step: Step<'a, E>) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step names in evaluation order
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(Step::name).collect()
    }

    /// Evaluate with a fallible final expression
    pub fn try_run<F>(self, final_expr: F) -> Result<Value, E>
    where
        F: FnOnce(&Environment) -> Result<Value, E>,
    {
        self.try_outcome(final_expr).map(Outcome::into_value)
    }

    /// Evaluate with a fallible final expression, reporting how it ended
    pub fn try_outcome<F>(self, final_expr: F) -> Result<Outcome, E>
    where
        F: FnOnce(&Environment) -> Result<Value, E>,
    {
        evaluate_outcome(self.steps, final_expr, &self.predicate, self.bindings)
    }
}

impl<E> fmt::Debug for Chain<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("steps", &self.steps)
            .field("predicate", &self.predicate)
            .field("bindings", &self.bindings)
            .finish()
    }
}
