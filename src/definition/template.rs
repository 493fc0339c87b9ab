//! Value templates with `${path}` references into the environment

use crate::chain::Environment;
use serde_json::Value;

/// Render a template against the environment.
///
/// A string that is exactly `${path}` becomes the bound value (null when
/// unbound). References inside longer strings are interpolated as text.
pub fn render(template: &Value, env: &Environment) -> Value {
    match template {
        Value::String(s) => render_string(s, env),
        Value::Array(items) => Value::Array(items.iter().map(|v| render(v, env)).collect()),
        Value::Object(obj) => Value::Object(
            obj.iter()
                .map(|(k, v)| (k.clone(), render(v, env)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Every path referenced by a template, in order of appearance
pub fn references(template: &Value) -> Vec<String> {
    let mut out = Vec::new();
    collect_references(template, &mut out);
    out
}

fn collect_references(template: &Value, out: &mut Vec<String>) {
    match template {
        Value::String(s) => {
            let mut rest = s.as_str();
            while let Some((path, after)) = next_reference(rest) {
                out.push(path.to_string());
                rest = after;
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_references(v, out)),
        Value::Object(obj) => obj.values().for_each(|v| collect_references(v, out)),
        _ => {}
    }
}

fn render_string(s: &str, env: &Environment) -> Value {
    if let Some(path) = whole_reference(s) {
        return env.get_path(path).cloned().unwrap_or(Value::Null);
    }

    let mut result = String::new();
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        match next_reference(&rest[start..]) {
            Some((path, after)) => {
                if let Some(value) = env.get_path(path) {
                    result.push_str(&value_to_text(value));
                }
                rest = after;
            }
            None => {
                // Unterminated reference, keep the text as written
                result.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    result.push_str(rest);
    Value::String(result)
}

/// `Some(path)` when the whole string is a single `${path}`
fn whole_reference(s: &str) -> Option<&str> {
    let inner = s.strip_prefix("${")?.strip_suffix('}')?;
    if inner.contains('}') || inner.contains("${") {
        return None;
    }
    Some(inner.trim())
}

/// First reference in `s` and the text after it
fn next_reference(s: &str) -> Option<(&str, &str)> {
    let start = s.find("${")? + 2;
    let len = s[start..].find('}')?;
    Some((s[start..start + len].trim(), &s[start + len + 1..]))
}

/// Convert a JSON value to text for interpolation
fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
