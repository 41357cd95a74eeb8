// SPDX-License-Identifier: MIT

//! Session-scoped traversal state and its persisted snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use super::responses::Responses;
use crate::error::FlowError;

/// Snapshot keys that must be present for a snapshot to load
const SNAPSHOT_FIELDS: [&str; 11] = [
    "questionnaireId",
    "sessionId",
    "currentQuestionIndex",
    "currentQuestionId",
    "responses",
    "visitedQuestions",
    "skippedQuestions",
    "questionHistory",
    "isCompleted",
    "startTime",
    "lastUpdateTime",
];

/// Traversal state of one flow session
#[derive(Debug, Clone, PartialEq)]
pub struct FlowState {
    pub questionnaire_id: String,
    pub session_id: String,
    pub current_question_index: usize,
    pub current_question_id: Option<String>,
    pub responses: Responses,
    pub visited_questions: HashSet<String>,
    pub skipped_questions: HashSet<String>,
    /// Stack of questions shown; the top is the current question
    pub question_history: Vec<String>,
    pub is_completed: bool,
    pub start_time: DateTime<Utc>,
    pub last_update_time: DateTime<Utc>,
}

impl FlowState {
    /// Fresh state positioned on the first question
    pub fn new(questionnaire_id: &str, session_id: &str, first_question_id: &str) -> Self {
        let now = Utc::now();
        Self {
            questionnaire_id: questionnaire_id.to_string(),
            session_id: session_id.to_string(),
            current_question_index: 0,
            current_question_id: Some(first_question_id.to_string()),
            responses: Responses::new(),
            visited_questions: HashSet::new(),
            skipped_questions: HashSet::new(),
            question_history: vec![first_question_id.to_string()],
            is_completed: false,
            start_time: now,
            last_update_time: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_update_time = Utc::now();
    }

    pub fn to_snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            questionnaire_id: self.questionnaire_id.clone(),
            session_id: self.session_id.clone(),
            current_question_index: self.current_question_index,
            current_question_id: self.current_question_id.clone(),
            responses: self.responses.to_pairs(),
            visited_questions: sorted(&self.visited_questions),
            skipped_questions: sorted(&self.skipped_questions),
            question_history: self.question_history.clone(),
            is_completed: self.is_completed,
            start_time: self.start_time,
            last_update_time: self.last_update_time,
        }
    }

    pub fn from_snapshot(snapshot: FlowSnapshot) -> Self {
        Self {
            questionnaire_id: snapshot.questionnaire_id,
            session_id: snapshot.session_id,
            current_question_index: snapshot.current_question_index,
            current_question_id: snapshot.current_question_id,
            responses: snapshot.responses.into_iter().collect(),
            visited_questions: snapshot.visited_questions.into_iter().collect(),
            skipped_questions: snapshot.skipped_questions.into_iter().collect(),
            question_history: snapshot.question_history,
            is_completed: snapshot.is_completed,
            start_time: snapshot.start_time,
            last_update_time: snapshot.last_update_time,
        }
    }

    /// Serialize for the storage collaborator
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self.to_snapshot())
    }

    /// Rebuild from stored JSON. Missing fields and an inconsistent history
    /// are rejected rather than defaulted.
    pub fn from_json(value: &Value) -> Result<Self, FlowError> {
        let object = value
            .as_object()
            .ok_or_else(|| FlowError::StateCorruption("state is not an object".to_string()))?;
        if let Some(missing) = SNAPSHOT_FIELDS.iter().find(|f| !object.contains_key(**f)) {
            return Err(FlowError::StateCorruption(format!(
                "missing field '{}'",
                missing
            )));
        }

        let snapshot: FlowSnapshot = serde_json::from_value(value.clone())
            .map_err(|e| FlowError::StateCorruption(e.to_string()))?;
        let state = Self::from_snapshot(snapshot);

        if let Some(current) = &state.current_question_id {
            if state.question_history.last() != Some(current) {
                return Err(FlowError::StateCorruption(format!(
                    "history does not end at current question '{}'",
                    current
                )));
            }
        }
        Ok(state)
    }
}

fn sorted(set: &HashSet<String>) -> Vec<String> {
    let mut items: Vec<String> = set.iter().cloned().collect();
    items.sort();
    items
}

/// Persisted form of `FlowState`: sets and maps become plain arrays
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlowSnapshot {
    pub questionnaire_id: String,
    pub session_id: String,
    pub current_question_index: usize,
    pub current_question_id: Option<String>,
    /// `[questionId, answer]` pairs
    pub responses: Vec<(String, Value)>,
    pub visited_questions: Vec<String>,
    pub skipped_questions: Vec<String>,
    pub question_history: Vec<String>,
    pub is_completed: bool,
    pub start_time: DateTime<Utc>,
    pub last_update_time: DateTime<Utc>,
}
