// SPDX-License-Identifier: MIT

//! Question flow state machine
//!
//! `FlowEngine` owns one traversal session: `start` (or `load_state`) makes
//! it active, `next` walks forward through visible questions until the
//! questionnaire is completed. Every transition is persisted through the
//! storage collaborator.
//!
//! Mutating methods take `&mut self`, so one engine cannot be driven by two
//! calls at once. Callers sharing a session across tasks must serialize
//! access themselves (for example behind a `tokio::sync::Mutex`).

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

use super::types::{FlowStep, Progress};
use crate::condition::{FunctionContext, FunctionRegistry};
use crate::error::{FlowError, QuestflowError, StorageError};
use crate::logic;
use crate::questionnaire::{Question, Questionnaire};
use crate::state::FlowState;
use crate::storage::{AnswerRecord, ResponseRecord, SessionStatus, SessionUpdate, Storage};

pub struct FlowEngine {
    storage: Arc<dyn Storage>,
    functions: FunctionRegistry,
    questionnaire: Option<Questionnaire>,
    state: Option<FlowState>,
}

impl FlowEngine {
    /// Create an engine with the built-in conditional functions
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_functions(storage, FunctionRegistry::with_builtins())
    }

    pub fn with_functions(storage: Arc<dyn Storage>, functions: FunctionRegistry) -> Self {
        Self {
            storage,
            functions,
            questionnaire: None,
            state: None,
        }
    }

    /// Open a new session positioned on the first question
    pub async fn start(&mut self, questionnaire_id: &str) -> Result<Question, FlowError> {
        let questionnaire = self.storage.load_questionnaire(questionnaire_id).await?;
        let first = questionnaire.questions.first().cloned().ok_or_else(|| {
            FlowError::InvalidNavigation(format!(
                "questionnaire '{}' has no questions",
                questionnaire_id
            ))
        })?;

        let report = logic::validate_conditional_logic(&questionnaire);
        for issue in report.errors.iter().chain(&report.warnings) {
            log::warn!("{}: {}", questionnaire_id, issue);
        }

        let session_id = self.storage.create_session(questionnaire_id).await?;
        self.storage
            .save_response(&ResponseRecord::new(&session_id, questionnaire_id))
            .await?;

        let state = FlowState::new(questionnaire_id, &session_id, &first.id);
        self.persist(&state).await?;
        self.questionnaire = Some(questionnaire);
        self.state = Some(state);

        log::info!(
            "Started session {} on questionnaire {}",
            session_id,
            questionnaire_id
        );
        Ok(first)
    }

    /// Move to the next visible question, or complete the session
    pub async fn next(&mut self) -> Result<FlowStep, FlowError> {
        let (questionnaire, state) = self.active()?;
        ensure_not_completed(state)?;
        let current = state
            .current_question_id
            .clone()
            .ok_or(FlowError::NoCurrentQuestion)?;

        let mut skipped = Vec::new();
        let mut found = None;
        for (index, candidate) in questionnaire
            .questions
            .iter()
            .enumerate()
            .skip(state.current_question_index + 1)
        {
            let visible = !logic::should_skip_question(candidate, &state.responses)?
                && logic::should_show_question(candidate, &state.responses)?;
            if visible {
                found = Some((index, candidate));
                break;
            }
            log::debug!("Skipping question {}", candidate.id);
            skipped.push(candidate.id.clone());
        }

        let mut updated = state.clone();
        updated.visited_questions.insert(current);
        updated.skipped_questions.extend(skipped);
        updated.touch();

        let step = match found {
            Some((index, question)) => {
                updated.current_question_index = index;
                updated.current_question_id = Some(question.id.clone());
                updated.skipped_questions.remove(&question.id);
                updated.question_history.push(question.id.clone());
                FlowStep::Question(question.clone())
            }
            None => {
                updated.is_completed = true;
                FlowStep::Completed {
                    responses: updated.responses.clone(),
                }
            }
        };

        if step.is_completed() {
            self.stamp_completion(&updated).await?;
        }
        self.commit(updated).await?;

        match &step {
            FlowStep::Question(question) => log::debug!("Moved to question {}", question.id),
            FlowStep::Completed { .. } => {
                log::info!("Session {} completed", self.session_id().unwrap_or_default())
            }
        }
        Ok(step)
    }

    /// Return to the previously shown question. `None` when already at the
    /// first entry of the history.
    pub async fn previous(&mut self) -> Result<Option<Question>, FlowError> {
        let (questionnaire, state) = self.active()?;
        ensure_not_completed(state)?;
        if state.question_history.len() <= 1 {
            return Ok(None);
        }

        let mut updated = state.clone();
        updated.question_history.pop();
        updated.touch();
        let target = updated.question_history.last().cloned();
        let resolved = target.and_then(|id| questionnaire.position(&id).map(|index| (index, id)));
        let question = match resolved {
            Some((index, id)) => {
                updated.current_question_index = index;
                updated.current_question_id = Some(id);
                Some(questionnaire.questions[index].clone())
            }
            None => {
                log::warn!(
                    "History of session {} names an unknown question",
                    updated.session_id
                );
                updated.current_question_id = None;
                None
            }
        };

        self.commit(updated).await?;
        Ok(question)
    }

    /// Make `question_id` current, pushing it onto the history
    pub async fn jump_to(&mut self, question_id: &str) -> Result<Question, FlowError> {
        let (questionnaire, state) = self.active()?;
        ensure_not_completed(state)?;
        let index = questionnaire
            .position(question_id)
            .ok_or_else(|| FlowError::QuestionNotFound(question_id.to_string()))?;
        let question = questionnaire.questions[index].clone();

        let mut updated = state.clone();
        updated.current_question_index = index;
        updated.current_question_id = Some(question_id.to_string());
        updated.question_history.push(question_id.to_string());
        updated.touch();

        self.commit(updated).await?;
        log::debug!("Jumped to question {}", question_id);
        Ok(question)
    }

    /// Record (or replace) the answer to a question
    pub async fn record_response(
        &mut self,
        question_id: &str,
        answer: Value,
    ) -> Result<(), FlowError> {
        let (questionnaire, state) = self.active()?;
        ensure_not_completed(state)?;
        if !questionnaire.contains(question_id) {
            return Err(FlowError::QuestionNotFound(question_id.to_string()));
        }

        let mut updated = state.clone();
        updated.responses.record(question_id, answer.clone());
        updated.touch();

        let mut record = self.storage.load_response(&updated.session_id).await?;
        record.answers.push(AnswerRecord {
            question_id: question_id.to_string(),
            value: answer,
            answered_at: Utc::now(),
        });
        record.answered_count = updated.responses.len();
        self.storage.save_response(&record).await?;

        self.commit(updated).await
    }

    pub fn progress(&self) -> Result<Progress, FlowError> {
        let (questionnaire, state) = self.active()?;
        Ok(Progress::new(
            state.current_question_index,
            questionnaire.len(),
            state.responses.len(),
            state.is_completed,
        ))
    }

    /// Persist the current flow state
    pub async fn save_state(&self) -> Result<(), FlowError> {
        let state = self.state.as_ref().ok_or(FlowError::QuestionnaireNotLoaded)?;
        self.persist(state).await
    }

    /// Restore a previously saved session into this engine
    pub async fn load_state(&mut self, session_id: &str) -> Result<(), FlowError> {
        let record = self
            .storage
            .load_session(session_id)
            .await
            .map_err(|e| match e {
                StorageError::SessionNotFound { .. } => FlowError::Session(e.to_string()),
                other => other.into(),
            })?;
        let raw = record.state.as_ref().ok_or_else(|| {
            FlowError::StateCorruption(format!("session {} has no saved state", session_id))
        })?;

        let state = FlowState::from_json(raw)?;
        if state.session_id != session_id || state.questionnaire_id != record.questionnaire_id {
            return Err(FlowError::StateCorruption(format!(
                "saved state does not belong to session {}",
                session_id
            )));
        }

        let questionnaire = self
            .storage
            .load_questionnaire(&state.questionnaire_id)
            .await?;
        check_state_against(&questionnaire, &state)?;

        log::info!(
            "Loaded session {} at question {:?}",
            session_id,
            state.current_question_id
        );
        self.questionnaire = Some(questionnaire);
        self.state = Some(state);
        Ok(())
    }

    pub fn state(&self) -> Option<&FlowState> {
        self.state.as_ref()
    }

    pub fn questionnaire(&self) -> Option<&Questionnaire> {
        self.questionnaire.as_ref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.state.as_ref().map(|s| s.session_id.as_str())
    }

    pub fn current_question(&self) -> Option<&Question> {
        let (questionnaire, state) = self.active().ok()?;
        questionnaire.question(state.current_question_id.as_deref()?)
    }

    /// Whether the current question must be answered given the answers so far
    pub fn is_current_question_required(&self) -> Result<bool, FlowError> {
        let (_, state) = self.active()?;
        let question = self.current_question().ok_or(FlowError::NoCurrentQuestion)?;
        Ok(logic::is_question_required(question, &state.responses)?)
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Run a registered conditional function against the live responses
    pub async fn call_function(&self, name: &str, args: &[String]) -> Result<Value, QuestflowError> {
        let (_, state) = self.active()?;
        let context = FunctionContext::new(&state.responses);
        Ok(self.functions.execute(name, args, &context).await?)
    }

    fn active(&self) -> Result<(&Questionnaire, &FlowState), FlowError> {
        match (&self.questionnaire, &self.state) {
            (Some(questionnaire), Some(state)) => Ok((questionnaire, state)),
            _ => Err(FlowError::QuestionnaireNotLoaded),
        }
    }

    async fn persist(&self, state: &FlowState) -> Result<(), FlowError> {
        let snapshot = state.to_json().map_err(StorageError::from)?;
        let status = if state.is_completed {
            SessionStatus::Completed
        } else {
            SessionStatus::Active
        };

        self.storage
            .update_session(
                &state.session_id,
                SessionUpdate {
                    status: Some(status),
                    state: Some(snapshot),
                },
            )
            .await?;
        log::debug!("Saved state of session {}", state.session_id);
        Ok(())
    }

    /// Persist `updated`, then make it the live state. The live state is
    /// left untouched when persisting fails.
    async fn commit(&mut self, updated: FlowState) -> Result<(), FlowError> {
        self.persist(&updated).await?;
        self.state = Some(updated);
        Ok(())
    }

    async fn stamp_completion(&self, state: &FlowState) -> Result<(), FlowError> {
        let mut record = self.storage.load_response(&state.session_id).await?;
        record.completed_at = Some(Utc::now());
        record.answered_count = state.responses.len();
        self.storage.save_response(&record).await?;
        Ok(())
    }
}

fn ensure_not_completed(state: &FlowState) -> Result<(), FlowError> {
    if state.is_completed {
        return Err(FlowError::InvalidNavigation(format!(
            "session {} is already completed",
            state.session_id
        )));
    }
    Ok(())
}

/// Every id in a restored state must resolve in the questionnaire
fn check_state_against(questionnaire: &Questionnaire, state: &FlowState) -> Result<(), FlowError> {
    if state.current_question_index >= questionnaire.len() {
        return Err(FlowError::StateCorruption(format!(
            "question index {} out of range",
            state.current_question_index
        )));
    }
    if let Some(current) = &state.current_question_id {
        if questionnaire.position(current) != Some(state.current_question_index) {
            return Err(FlowError::StateCorruption(format!(
                "current question '{}' does not match index {}",
                current, state.current_question_index
            )));
        }
    }
    if let Some(unknown) = state
        .question_history
        .iter()
        .find(|id| !questionnaire.contains(id))
    {
        return Err(FlowError::StateCorruption(format!(
            "history names unknown question '{}'",
            unknown
        )));
    }
    Ok(())
}
