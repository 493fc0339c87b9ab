//! Condition expression evaluator

use super::ast::{CompareOp, Expression, Literal};
use crate::chain::environment::{lookup, Environment};
use serde_json::Value;

/// Something field paths can be resolved against
pub trait Resolve {
    /// Resolve a dot-notation path
    fn resolve(&self, path: &str) -> Option<&Value>;
}

impl Resolve for Environment {
    fn resolve(&self, path: &str) -> Option<&Value> {
        self.get_path(path)
    }
}

/// Paths walk into the value; `_` names the value itself.
impl Resolve for Value {
    fn resolve(&self, path: &str) -> Option<&Value> {
        if path == "_" {
            return Some(self);
        }
        path.split('.')
            .try_fold(self, |current, segment| lookup(current, segment))
    }
}

/// Evaluate a condition expression against a value or environment
pub fn evaluate<R: Resolve + ?Sized>(expr: &Expression, subject: &R) -> bool {
    match expr {
        Expression::True => true,
        Expression::False => false,
        Expression::Compare { left, op, right } => {
            evaluate_compare(subject.resolve(left), *op, right)
        }
        Expression::Exists(path) => subject.resolve(path).is_some_and(|v| !v.is_null()),
        Expression::And(left, right) => evaluate(left, subject) && evaluate(right, subject),
        Expression::Or(left, right) => evaluate(left, subject) || evaluate(right, subject),
        Expression::Not(inner) => !evaluate(inner, subject),
    }
}

fn evaluate_compare(left: Option<&Value>, op: CompareOp, right: &Literal) -> bool {
    match op {
        CompareOp::Eq => values_equal(left, right),
        CompareOp::NotEq => !values_equal(left, right),
        CompareOp::Gt => compare_numbers(left, right, |a, b| a > b),
        CompareOp::Gte => compare_numbers(left, right, |a, b| a >= b),
        CompareOp::Lt => compare_numbers(left, right, |a, b| a < b),
        CompareOp::Lte => compare_numbers(left, right, |a, b| a <= b),
        CompareOp::Contains => check_contains(left, right),
    }
}

fn values_equal(left: Option<&Value>, right: &Literal) -> bool {
    match (left, right) {
        (None, Literal::Null) | (Some(Value::Null), Literal::Null) => true,
        (Some(Value::String(s)), Literal::String(rs)) => s == rs,
        (Some(Value::Number(n)), Literal::Number(rn)) => {
            n.as_f64().is_some_and(|f| (f - rn).abs() < f64::EPSILON)
        }
        (Some(Value::Bool(b)), Literal::Boolean(rb)) => b == rb,
        _ => false,
    }
}

fn compare_numbers<F>(left: Option<&Value>, right: &Literal, cmp: F) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    match (left, right) {
        (Some(Value::Number(n)), Literal::Number(rn)) => n.as_f64().is_some_and(|f| cmp(f, *rn)),
        _ => false,
    }
}

fn check_contains(left: Option<&Value>, right: &Literal) -> bool {
    match (left, right) {
        (Some(Value::String(s)), Literal::String(substr)) => s.contains(substr.as_str()),
        // Object contains key
        (Some(Value::Object(obj)), Literal::String(key)) => obj.contains_key(key),
        (Some(Value::Array(arr)), literal) => arr
            .iter()
            .any(|item| values_equal(Some(item), literal)),
        _ => false,
    }
}
