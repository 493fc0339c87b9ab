// SPDX-License-Identifier: MIT

//! Declarative chain definitions
//!
//! A definition names its steps, each with a value template, plus an
//! optional result template and failure condition.

use super::template;
use crate::chain::{Chain, Environment, FailurePredicate, Outcome, Step};
use crate::config::Settings;
use crate::error::{ChainError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Top-level chain definition
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ChainDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Condition under which a step value counts as a failure
    pub fail_when: Option<String>,
    /// Sentinel key override; cannot be combined with `fail_when`
    pub sentinel: Option<String>,
    /// Initial bindings
    #[serde(default)]
    pub bindings: Map<String, Value>,
    /// Steps in evaluation order
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
    /// Final expression; the whole environment when absent
    pub result: Option<Value>,
}

/// A named step producing a value template
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StepDefinition {
    pub name: String,
    pub value: Value,
}

impl ChainDefinition {
    /// Check structural rules: step names are non-empty and dot-free, a
    /// `sentinel` is non-blank, and `fail_when` and `sentinel` are not both set
    pub fn validate(&self) -> Result<()> {
        for (index, step) in self.steps.iter().enumerate() {
            if step.name.trim().is_empty() {
                return Err(ChainError::invalid_definition(format!(
                    "step {} has an empty name",
                    index
                )));
            }
            if step.name.contains('.') {
                return Err(ChainError::invalid_definition(format!(
                    "step name '{}' must not contain '.'",
                    step.name
                )));
            }
        }

        if self.sentinel.as_deref().is_some_and(|key| key.trim().is_empty()) {
            return Err(ChainError::invalid_definition("sentinel must not be empty"));
        }

        if self.fail_when.is_some() && self.sentinel.is_some() {
            return Err(ChainError::invalid_definition(
                "set either fail_when or sentinel, not both",
            ));
        }

        Ok(())
    }

    /// Name followed by the description, when there is one
    pub fn summary(&self) -> String {
        match self.description.trim() {
            "" => self.name.clone(),
            description => format!("{}: {}", self.name, description),
        }
    }

    /// Build the failure predicate for this definition
    pub fn predicate(&self, settings: &Settings) -> Result<FailurePredicate<'static>> {
        match (&self.fail_when, &self.sentinel) {
            (Some(condition), _) => FailurePredicate::condition(condition),
            (None, Some(key)) => Ok(settings.clone().with_sentinel(key.clone())?.predicate()),
            (None, None) => Ok(settings.predicate()),
        }
    }

    /// References to names not bound before the template that uses them.
    ///
    /// Bindings supplied at run time may still satisfy these.
    pub fn unbound_references(&self) -> Vec<String> {
        let mut known: HashSet<&str> = self.bindings.keys().map(String::as_str).collect();
        let mut unbound = Vec::new();

        let mut check = |template: &Value, known: &HashSet<&str>, owner: &str| {
            for path in template::references(template) {
                let root = path.split('.').next().unwrap_or_default();
                if !known.contains(root) {
                    unbound.push(format!("{} references unbound '{}'", owner, path));
                }
            }
        };

        for step in &self.steps {
            check(&step.value, &known, &format!("step '{}'", step.name));
            known.insert(step.name.as_str());
        }
        if let Some(result) = &self.result {
            check(result, &known, "result");
        }

        unbound
    }

    /// Run the definition through the chain evaluator.
    ///
    /// `extra` bindings are layered over the definition's own bindings.
    pub fn evaluate(&self, settings: &Settings, extra: &Environment) -> Result<Outcome> {
        self.validate()?;
        let predicate = self.predicate(settings)?;

        let mut bindings: Environment = self
            .bindings
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        bindings.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));

        log::debug!(
            "Evaluating chain '{}' with {} steps",
            self.name,
            self.steps.len()
        );

        let mut chain = Chain::new().predicate(predicate).with_bindings(bindings);
        for step in &self.steps {
            let value = &step.value;
            chain.push(Step::new(step.name.as_str(), move |env| {
                template::render(value, env)
            }));
        }

        Ok(chain.outcome(|env| match &self.result {
            Some(result) => template::render(result, env),
            None => env.to_json(),
        }))
    }
}
