// SPDX-License-Identifier: MIT

//! Flow result types

use serde::Serialize;

use crate::questionnaire::Question;
use crate::state::Responses;

/// Outcome of `FlowEngine::next`
#[derive(Debug, Clone, PartialEq)]
pub enum FlowStep {
    /// The next visible question
    Question(Question),
    /// No visible question remains; carries every recorded answer
    Completed { responses: Responses },
}

impl FlowStep {
    pub fn is_completed(&self) -> bool {
        matches!(self, FlowStep::Completed { .. })
    }

    pub fn question(&self) -> Option<&Question> {
        match self {
            FlowStep::Question(q) => Some(q),
            FlowStep::Completed { .. } => None,
        }
    }
}

/// Position and completion of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// 1-based position of the current question
    pub current_question: usize,
    pub total_questions: usize,
    pub answered_questions: usize,
    pub percent_complete: u32,
    pub is_completed: bool,
}

impl Progress {
    pub fn new(index: usize, total: usize, answered: usize, is_completed: bool) -> Self {
        let percent_complete = if total == 0 {
            0
        } else {
            (answered as f64 / total as f64 * 100.0).round() as u32
        };
        Self {
            current_question: index + 1,
            total_questions: total,
            answered_questions: answered,
            percent_complete,
            is_completed,
        }
    }
}
