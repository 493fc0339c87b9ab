//! Condition expression parser
//!
//! Parses expressions like:
//! - `status == 'error'`
//! - `retries > 3`
//! - `not exists data and code >= 500`
//!
//! `or` binds loosest, then `and`, then `not`. Parentheses group.

use super::ast::{CompareOp, Expression, Literal};
use crate::error::{ChainError, Result};

/// Parse a condition expression string into an AST
pub fn parse(input: &str) -> Result<Expression> {
    let input = input.trim();

    if input.is_empty() {
        return Err(ChainError::invalid_condition(input, "empty expression"));
    }

    if let Some(inner) = strip_parens(input) {
        return parse(inner);
    }

    if let Some(pos) = find_top_level(input, " or ") {
        let left = parse(&input[..pos])?;
        let right = parse(&input[pos + 4..])?;
        return Ok(Expression::Or(Box::new(left), Box::new(right)));
    }

    if let Some(pos) = find_top_level(input, " and ") {
        let left = parse(&input[..pos])?;
        let right = parse(&input[pos + 5..])?;
        return Ok(Expression::And(Box::new(left), Box::new(right)));
    }

    if let Some(rest) = input
        .strip_prefix("not")
        .filter(|rest| rest.starts_with([' ', '(']))
    {
        return Ok(Expression::Not(Box::new(parse(rest)?)));
    }

    match input {
        "true" => return Ok(Expression::True),
        "false" => return Ok(Expression::False),
        _ => {}
    }

    if let Some(rest) = input.strip_prefix("exists ") {
        let path = rest.trim();
        validate_path(input, path)?;
        return Ok(Expression::Exists(path.to_string()));
    }

    parse_comparison(input)
}

fn parse_comparison(input: &str) -> Result<Expression> {
    // Longest first so `>=` is not read as `>`
    let operators = [
        ("!=", CompareOp::NotEq),
        (">=", CompareOp::Gte),
        ("<=", CompareOp::Lte),
        ("==", CompareOp::Eq),
        (">", CompareOp::Gt),
        ("<", CompareOp::Lt),
        (" contains ", CompareOp::Contains),
    ];

    for (op_str, op) in operators {
        if let Some(pos) = find_top_level(input, op_str) {
            let left = input[..pos].trim();
            validate_path(input, left)?;
            let right = parse_literal(input, &input[pos + op_str.len()..])?;
            return Ok(Expression::Compare {
                left: left.to_string(),
                op,
                right,
            });
        }
    }

    Err(ChainError::invalid_condition(input, "no operator found"))
}

/// Byte offset of `needle` outside quotes and parentheses
fn find_top_level(input: &str, needle: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (i, c) in input.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                _ if depth == 0 && input[i..].starts_with(needle) => return Some(i),
                _ => {}
            },
        }
    }
    None
}

/// Inner text when the whole input is one parenthesized group
fn strip_parens(input: &str) -> Option<&str> {
    if !input.starts_with('(') || !input.ends_with(')') {
        return None;
    }

    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in input.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return (i == input.len() - 1).then(|| &input[1..i]);
                    }
                }
                _ => {}
            },
        }
    }
    None
}

fn validate_path(input: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ChainError::invalid_condition(input, "missing field path"));
    }
    if path.split('.').any(|seg| seg.is_empty()) || path.contains(char::is_whitespace) {
        return Err(ChainError::invalid_condition(
            input,
            format!("invalid field path '{}'", path),
        ));
    }
    Ok(())
}

fn parse_literal(input: &str, literal: &str) -> Result<Literal> {
    let literal = literal.trim();

    match literal {
        "null" => return Ok(Literal::Null),
        "true" => return Ok(Literal::Boolean(true)),
        "false" => return Ok(Literal::Boolean(false)),
        _ => {}
    }

    // String (single or double quotes)
    if literal.len() >= 2
        && ((literal.starts_with('\'') && literal.ends_with('\''))
            || (literal.starts_with('"') && literal.ends_with('"')))
    {
        return Ok(Literal::String(literal[1..literal.len() - 1].to_string()));
    }

    if let Ok(n) = literal.parse::<f64>() {
        if !n.is_finite() {
            return Err(ChainError::invalid_condition(
                input,
                format!("number literal '{}' is not finite", literal),
            ));
        }
        return Ok(Literal::Number(n));
    }

    Err(ChainError::invalid_condition(
        input,
        format!("could not parse literal '{}'", literal),
    ))
}
