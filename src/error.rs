// SPDX-License-Identifier: MIT

//! Typed error handling for questflow
//!
//! Each subsystem has its own error family; `QuestflowError` collects them
//! for callers (such as the binary) that want a single type.

use std::fmt;

use thiserror::Error;

use crate::questionnaire::Condition;

/// Top-level error type for questflow
#[derive(Debug, Error)]
pub enum QuestflowError {
    /// Configuration errors (invalid env vars)
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Condition(#[from] ConditionError),

    #[error(transparent)]
    Function(#[from] FunctionError),
}

impl QuestflowError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Errors raised while parsing or evaluating a single condition
#[derive(Debug, Error)]
pub enum ConditionError {
    /// Operator name outside the supported set
    #[error("Unknown condition operator: {0}")]
    UnknownOperator(String),

    /// The `value` of a `matches`/`notMatches` condition is not a valid regex
    #[error("Invalid pattern in condition on '{question}': {source}", question = .condition.question_id)]
    InvalidPattern {
        condition: Box<Condition>,
        #[source]
        source: regex::Error,
    },
}

impl ConditionError {
    /// The condition that failed, when the error carries one
    pub fn condition(&self) -> Option<&Condition> {
        match self {
            ConditionError::UnknownOperator(_) => None,
            ConditionError::InvalidPattern { condition, .. } => Some(condition),
        }
    }
}

/// Stable codes for flow failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowErrorCode {
    QuestionNotFound,
    InvalidNavigation,
    SessionError,
    StateCorruption,
    NoCurrentQuestion,
    QuestionnaireNotLoaded,
}

impl fmt::Display for FlowErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            FlowErrorCode::QuestionNotFound => "QUESTION_NOT_FOUND",
            FlowErrorCode::InvalidNavigation => "INVALID_NAVIGATION",
            FlowErrorCode::SessionError => "SESSION_ERROR",
            FlowErrorCode::StateCorruption => "STATE_CORRUPTION",
            FlowErrorCode::NoCurrentQuestion => "NO_CURRENT_QUESTION",
            FlowErrorCode::QuestionnaireNotLoaded => "QUESTIONNAIRE_NOT_LOADED",
        };
        f.write_str(code)
    }
}

/// Errors raised by the flow state machine
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Question not found: {0}")]
    QuestionNotFound(String),

    #[error("Invalid navigation: {0}")]
    InvalidNavigation(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Flow state corrupted: {0}")]
    StateCorruption(String),

    #[error("No current question")]
    NoCurrentQuestion,

    #[error("No questionnaire loaded")]
    QuestionnaireNotLoaded,

    /// Condition evaluation failed while deciding visibility
    #[error(transparent)]
    Condition(#[from] ConditionError),

    /// The storage collaborator rejected an operation
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl FlowError {
    /// The flow code for this error; `None` for wrapped collaborator errors
    pub fn code(&self) -> Option<FlowErrorCode> {
        match self {
            FlowError::QuestionNotFound(_) => Some(FlowErrorCode::QuestionNotFound),
            FlowError::InvalidNavigation(_) => Some(FlowErrorCode::InvalidNavigation),
            FlowError::Session(_) => Some(FlowErrorCode::SessionError),
            FlowError::StateCorruption(_) => Some(FlowErrorCode::StateCorruption),
            FlowError::NoCurrentQuestion => Some(FlowErrorCode::NoCurrentQuestion),
            FlowError::QuestionnaireNotLoaded => Some(FlowErrorCode::QuestionnaireNotLoaded),
            FlowError::Condition(_) | FlowError::Storage(_) => None,
        }
    }
}

/// Errors from the storage collaborator
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Questionnaire not found: {id}")]
    QuestionnaireNotFound { id: String },

    #[error("Invalid questionnaire {id}: {message}")]
    InvalidQuestionnaire { id: String, message: String },

    #[error("Session not found: {session_id}")]
    SessionNotFound { session_id: String },

    #[error("Response record not found for session: {session_id}")]
    ResponseNotFound { session_id: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Errors raised while loading questionnaire definitions
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error("Questionnaire '{0}' has an empty question id")]
    EmptyQuestionId(String),

    #[error("Questionnaire '{questionnaire}' defines question '{question}' more than once")]
    DuplicateQuestion {
        questionnaire: String,
        question: String,
    },
}

/// Errors from the conditional function registry
#[derive(Debug, Error)]
pub enum FunctionError {
    #[error("Function '{0}' is not registered")]
    NotRegistered(String),
}
