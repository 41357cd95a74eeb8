// SPDX-License-Identifier: MIT

//! Conditional logic coordination
//!
//! Combines atomic conditions into per-question decisions and validates the
//! conditional structure of a whole questionnaire.

mod rules;
mod validation;

pub use rules::{
    evaluate_condition_group, extract_dependencies, is_question_required, should_show_question,
    should_skip_question,
};
pub use validation::{
    build_dependency_graph, validate_conditional_logic, LogicIssue, ValidationReport,
};
