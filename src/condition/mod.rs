// SPDX-License-Identifier: MIT

//! Condition evaluation for conditional navigation
//!
//! This module provides evaluation of atomic conditions such as:
//! - `{questionId: has_pets, operator: equals, value: true}`
//! - `{questionId: age, operator: greaterThanOrEqual, value: 18}`
//! - `{questionId: country, operator: in, values: [DE, AT, CH]}`
//!
//! and the registry of named functions (`sum`, `daysAgo`, ...) used by
//! advanced conditionals.

mod evaluator;
mod functions;

pub use evaluator::evaluate;
pub use functions::{ConditionalFunction, FunctionContext, FunctionRegistry, NativeFunction};
