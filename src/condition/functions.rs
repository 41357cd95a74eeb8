// SPDX-License-Identifier: MIT

//! Named functions over the response snapshot (`count`, `sum`, `avg`, ...)
//!
//! The registry is an explicit object: engines own one and custom functions
//! are registered on it. Registering an existing name replaces it.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::evaluator::{answer_length, is_empty};
use crate::error::FunctionError;
use crate::state::Responses;

/// What a function can read while executing
pub struct FunctionContext<'a> {
    pub responses: &'a Responses,
    pub now: DateTime<Utc>,
}

impl<'a> FunctionContext<'a> {
    pub fn new(responses: &'a Responses) -> Self {
        Self {
            responses,
            now: Utc::now(),
        }
    }

    fn answers<'b>(&'b self, args: &'b [String]) -> impl Iterator<Item = &'a Value> + 'b {
        args.iter().filter_map(|id| self.responses.get(id))
    }

    /// Numeric answers among `args`, with numbers inside array answers included
    fn numbers(&self, args: &[String]) -> Vec<f64> {
        let mut out = Vec::new();
        for answer in self.answers(args) {
            match answer {
                Value::Array(items) => out.extend(items.iter().filter_map(Value::as_f64)),
                other => out.extend(other.as_f64()),
            }
        }
        out
    }
}

/// A function callable by name from advanced conditionals
pub trait ConditionalFunction: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// `args` are question ids
    fn call(&self, args: &[String], context: &FunctionContext<'_>) -> Value;
}

type NativeFn = fn(&[String], &FunctionContext<'_>) -> Value;

/// A function backed by a plain fn pointer
pub struct NativeFunction {
    name: String,
    description: String,
    func: NativeFn,
}

impl NativeFunction {
    pub fn new(name: &str, description: &str, func: NativeFn) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            func,
        }
    }
}

impl ConditionalFunction for NativeFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn call(&self, args: &[String], context: &FunctionContext<'_>) -> Value {
        (self.func)(args, context)
    }
}

#[derive(Clone)]
pub struct FunctionRegistry {
    functions: Arc<RwLock<HashMap<String, Arc<dyn ConditionalFunction>>>>,
}

impl FunctionRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            functions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// A registry preloaded with the built-in functions
    pub fn with_builtins() -> Self {
        let builtins: Vec<Arc<dyn ConditionalFunction>> = vec![
            Arc::new(NativeFunction::new("count", "Number of answered items", count)),
            Arc::new(NativeFunction::new("sum", "Sum of numeric answers", sum)),
            Arc::new(NativeFunction::new("avg", "Mean of numeric answers", avg)),
            Arc::new(NativeFunction::new("min", "Smallest numeric answer", min)),
            Arc::new(NativeFunction::new("max", "Largest numeric answer", max)),
            Arc::new(NativeFunction::new("length", "Length of a text or list answer", length)),
            Arc::new(NativeFunction::new("daysAgo", "Whole days since a date answer", days_ago)),
            Arc::new(NativeFunction::new(
                "answeredCount",
                "Number of answered questions",
                answered_count,
            )),
        ];
        let map: HashMap<String, Arc<dyn ConditionalFunction>> = builtins
            .into_iter()
            .map(|f| (f.name().to_string(), f))
            .collect();
        Self {
            functions: Arc::new(RwLock::new(map)),
        }
    }

    pub async fn register(&self, function: Arc<dyn ConditionalFunction>) {
        let mut functions = self.functions.write().await;
        if functions
            .insert(function.name().to_string(), function)
            .is_some()
        {
            log::debug!("Replaced conditional function");
        }
    }

    pub async fn get(&self, name: &str) -> Option<Arc<dyn ConditionalFunction>> {
        let functions = self.functions.read().await;
        functions.get(name).cloned()
    }

    pub async fn names(&self) -> Vec<String> {
        let functions = self.functions.read().await;
        let mut names: Vec<String> = functions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Run a registered function
    pub async fn execute(
        &self,
        name: &str,
        args: &[String],
        context: &FunctionContext<'_>,
    ) -> Result<Value, FunctionError> {
        let function = self
            .get(name)
            .await
            .ok_or_else(|| FunctionError::NotRegistered(name.to_string()))?;
        Ok(function.call(args, context))
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn count(args: &[String], ctx: &FunctionContext<'_>) -> Value {
    let total: usize = ctx
        .answers(args)
        .map(|answer| match answer {
            Value::Array(items) => items.len(),
            other if is_empty(Some(other)) => 0,
            _ => 1,
        })
        .sum();
    json!(total)
}

fn sum(args: &[String], ctx: &FunctionContext<'_>) -> Value {
    json!(ctx.numbers(args).iter().sum::<f64>())
}

fn avg(args: &[String], ctx: &FunctionContext<'_>) -> Value {
    let numbers = ctx.numbers(args);
    if numbers.is_empty() {
        return json!(0);
    }
    json!(numbers.iter().sum::<f64>() / numbers.len() as f64)
}

fn min(args: &[String], ctx: &FunctionContext<'_>) -> Value {
    ctx.numbers(args)
        .into_iter()
        .reduce(f64::min)
        .map_or(Value::Null, |n| json!(n))
}

fn max(args: &[String], ctx: &FunctionContext<'_>) -> Value {
    ctx.numbers(args)
        .into_iter()
        .reduce(f64::max)
        .map_or(Value::Null, |n| json!(n))
}

fn length(args: &[String], ctx: &FunctionContext<'_>) -> Value {
    let len = args
        .first()
        .and_then(|id| answer_length(ctx.responses.get(id)))
        .unwrap_or(0);
    json!(len)
}

fn days_ago(args: &[String], ctx: &FunctionContext<'_>) -> Value {
    let Some(Value::String(raw)) = args.first().and_then(|id| ctx.responses.get(id)) else {
        return Value::Null;
    };
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        });
    match parsed {
        Some(date) => json!((ctx.now - date).num_days()),
        None => Value::Null,
    }
}

fn answered_count(args: &[String], ctx: &FunctionContext<'_>) -> Value {
    if args.is_empty() {
        return json!(ctx.responses.len());
    }
    json!(ctx.answers(args).filter(|a| !is_empty(Some(*a))).count())
}
