// SPDX-License-Identifier: MIT

//! Storage collaborator for questionnaires, sessions and responses.
//!
//! The flow engine only talks to the `Storage` trait; persistence formats
//! belong to implementations.

mod memory;

pub use memory::InMemoryStorage;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StorageError;
use crate::questionnaire::Questionnaire;

pub type StorageResult<T> = Result<T, StorageError>;

/// Lifecycle of a stored session
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Active,
    Completed,
}

/// A stored flow session
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub questionnaire_id: String,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Serialized flow state, written by `FlowEngine::save_state`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
}

/// Partial update applied by `Storage::update_session`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionUpdate {
    pub status: Option<SessionStatus>,
    pub state: Option<Value>,
}

/// One recorded answer
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_id: String,
    pub value: Value,
    pub answered_at: DateTime<Utc>,
}

/// Everything answered during a session, in recording order
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    pub session_id: String,
    pub questionnaire_id: String,
    pub answers: Vec<AnswerRecord>,
    pub answered_count: usize,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ResponseRecord {
    pub fn new(session_id: &str, questionnaire_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            questionnaire_id: questionnaire_id.to_string(),
            answers: Vec::new(),
            answered_count: 0,
            started_at: Utc::now(),
            completed_at: None,
        }
    }
}

/// Storage trait consumed by the flow engine.
///
/// Implementations perform their own retries, if any; errors are surfaced
/// to the engine's caller unchanged.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn save_questionnaire(&self, questionnaire: &Questionnaire) -> StorageResult<()>;
    /// Fails if the questionnaire is absent or invalid
    async fn load_questionnaire(&self, id: &str) -> StorageResult<Questionnaire>;

    /// Open a session and return its id
    async fn create_session(&self, questionnaire_id: &str) -> StorageResult<String>;
    async fn load_session(&self, session_id: &str) -> StorageResult<SessionRecord>;
    async fn update_session(&self, session_id: &str, update: SessionUpdate) -> StorageResult<()>;
    async fn delete_session(&self, session_id: &str) -> StorageResult<()>;

    async fn load_response(&self, session_id: &str) -> StorageResult<ResponseRecord>;
    async fn save_response(&self, record: &ResponseRecord) -> StorageResult<()>;
}
