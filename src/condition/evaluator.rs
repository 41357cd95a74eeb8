//! Condition evaluator

use crate::error::ConditionError;
use crate::questionnaire::{Condition, Operator};
use crate::state::Responses;
use regex::Regex;
use serde_json::Value;

/// Evaluate one condition against a response snapshot.
///
/// Type mismatches never fail: numeric and length operators resolve to
/// `false`, negated operators to `true`. The only error is a `matches` /
/// `notMatches` pattern that does not compile.
pub fn evaluate(condition: &Condition, responses: &Responses) -> Result<bool, ConditionError> {
    let response = responses.get(&condition.question_id);
    let value = condition.value.as_ref();

    let result = match condition.operator {
        Operator::Equals => strict_equals(response, value),
        Operator::NotEquals => !strict_equals(response, value),
        Operator::GreaterThan => compare_numbers(response, value, |a, b| a > b),
        Operator::LessThan => compare_numbers(response, value, |a, b| a < b),
        Operator::GreaterThanOrEqual => compare_numbers(response, value, |a, b| a >= b),
        Operator::LessThanOrEqual => compare_numbers(response, value, |a, b| a <= b),
        Operator::Contains => array_contains(response, value).unwrap_or(false),
        Operator::NotContains => array_contains(response, value) != Some(true),
        Operator::In => one_of(response, condition.values.as_deref()).unwrap_or(false),
        Operator::NotIn => one_of(response, condition.values.as_deref()) != Some(true),
        Operator::Matches => pattern_matches(condition, response, value)?.unwrap_or(false),
        Operator::NotMatches => pattern_matches(condition, response, value)? != Some(true),
        Operator::IsEmpty => is_empty(response),
        Operator::IsNotEmpty => !is_empty(response),
        Operator::HasLength => compare_length(response, value, |len, n| len == n),
        Operator::HasMinLength => compare_length(response, value, |len, n| len >= n),
        Operator::HasMaxLength => compare_length(response, value, |len, n| len <= n),
    };

    log::trace!(
        "Condition {} {} -> {}",
        condition.question_id,
        condition.operator,
        result
    );
    Ok(result)
}

/// Equality without cross-type coercion. Numbers compare by value at any
/// depth, so an answer of `1` equals a literal `1.0`.
pub(crate) fn strict_equals(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        (Some(Value::Array(a)), Some(Value::Array(b))) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| strict_equals(Some(x), Some(y)))
        }
        (Some(Value::Object(a)), Some(Value::Object(b))) => {
            a.len() == b.len() && a.iter().all(|(key, x)| strict_equals(Some(x), b.get(key)))
        }
        (a, b) => a == b,
    }
}

fn compare_numbers<F>(left: Option<&Value>, right: Option<&Value>, cmp: F) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    match (left.and_then(Value::as_f64), right.and_then(Value::as_f64)) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

/// `None` when the answer is not an array
fn array_contains(response: Option<&Value>, needle: Option<&Value>) -> Option<bool> {
    match response {
        Some(Value::Array(items)) => Some(items.iter().any(|item| strict_equals(Some(item), needle))),
        _ => None,
    }
}

/// `None` when the condition has no candidate set
fn one_of(response: Option<&Value>, candidates: Option<&[Value]>) -> Option<bool> {
    candidates.map(|values| values.iter().any(|v| strict_equals(response, Some(v))))
}

/// `Ok(None)` when either side is not a string
fn pattern_matches(
    condition: &Condition,
    response: Option<&Value>,
    pattern: Option<&Value>,
) -> Result<Option<bool>, ConditionError> {
    let (Some(Value::String(text)), Some(Value::String(pattern))) = (response, pattern) else {
        return Ok(None);
    };
    let regex = Regex::new(pattern).map_err(|source| ConditionError::InvalidPattern {
        condition: Box::new(condition.clone()),
        source,
    })?;
    Ok(Some(regex.is_match(text)))
}

pub(crate) fn is_empty(response: Option<&Value>) -> bool {
    match response {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(_) => false,
    }
}

/// Length of a string (in chars) or array answer
pub(crate) fn answer_length(response: Option<&Value>) -> Option<usize> {
    match response {
        Some(Value::String(s)) => Some(s.chars().count()),
        Some(Value::Array(a)) => Some(a.len()),
        _ => None,
    }
}

fn compare_length<F>(response: Option<&Value>, expected: Option<&Value>, cmp: F) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    match (answer_length(response), expected.and_then(Value::as_f64)) {
        (Some(len), Some(n)) => cmp(len as f64, n),
        _ => false,
    }
}
