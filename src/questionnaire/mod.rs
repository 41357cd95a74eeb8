// SPDX-License-Identifier: MIT

//! Questionnaire definitions
//!
//! A questionnaire is an ordered list of questions. Each question may carry a
//! `Conditional` block with up to four rule slots (`showIf`, `hideIf`,
//! `skipIf`, `requiredIf`), each a single condition or an AND-list.

mod loader;
mod types;

pub use loader::QuestionnaireLoader;
pub use types::{
    Condition, ConditionGroup, Conditional, Operator, Question, QuestionKind, Questionnaire,
};
