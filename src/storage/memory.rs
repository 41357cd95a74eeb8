// SPDX-License-Identifier: MIT

//! In-process storage backed by hash maps

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    ResponseRecord, SessionRecord, SessionStatus, SessionUpdate, Storage, StorageResult,
};
use crate::error::StorageError;
use crate::questionnaire::Questionnaire;

/// Cheap to clone; clones share the same underlying maps
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    questionnaires: Arc<RwLock<HashMap<String, Questionnaire>>>,
    sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
    responses: Arc<RwLock<HashMap<String, ResponseRecord>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with questionnaires
    pub async fn with_questionnaires(questionnaires: Vec<Questionnaire>) -> Self {
        let storage = Self::new();
        {
            let mut map = storage.questionnaires.write().await;
            for questionnaire in questionnaires {
                map.insert(questionnaire.id.clone(), questionnaire);
            }
        }
        storage
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn check_questionnaire(questionnaire: &Questionnaire) -> StorageResult<()> {
    let mut seen = HashSet::new();
    for question in &questionnaire.questions {
        if !seen.insert(question.id.as_str()) {
            return Err(StorageError::InvalidQuestionnaire {
                id: questionnaire.id.clone(),
                message: format!("duplicate question id '{}'", question.id),
            });
        }
    }
    Ok(())
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn save_questionnaire(&self, questionnaire: &Questionnaire) -> StorageResult<()> {
        let mut questionnaires = self.questionnaires.write().await;
        questionnaires.insert(questionnaire.id.clone(), questionnaire.clone());
        Ok(())
    }

    async fn load_questionnaire(&self, id: &str) -> StorageResult<Questionnaire> {
        let questionnaires = self.questionnaires.read().await;
        let questionnaire = questionnaires
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::QuestionnaireNotFound { id: id.to_string() })?;
        check_questionnaire(&questionnaire)?;
        Ok(questionnaire)
    }

    async fn create_session(&self, questionnaire_id: &str) -> StorageResult<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let record = SessionRecord {
            id: id.clone(),
            questionnaire_id: questionnaire_id.to_string(),
            status: SessionStatus::Active,
            created_at: now,
            updated_at: now,
            state: None,
        };
        self.sessions.write().await.insert(id.clone(), record);
        log::debug!("Created session {} for {}", id, questionnaire_id);
        Ok(id)
    }

    async fn load_session(&self, session_id: &str) -> StorageResult<SessionRecord> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| StorageError::SessionNotFound {
                session_id: session_id.to_string(),
            })
    }

    async fn update_session(&self, session_id: &str, update: SessionUpdate) -> StorageResult<()> {
        let mut sessions = self.sessions.write().await;
        let record = sessions
            .get_mut(session_id)
            .ok_or_else(|| StorageError::SessionNotFound {
                session_id: session_id.to_string(),
            })?;
        if let Some(status) = update.status {
            record.status = status;
        }
        if let Some(state) = update.state {
            record.state = Some(state);
        }
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_session(&self, session_id: &str) -> StorageResult<()> {
        let removed = self.sessions.write().await.remove(session_id);
        self.responses.write().await.remove(session_id);
        match removed {
            Some(_) => Ok(()),
            None => Err(StorageError::SessionNotFound {
                session_id: session_id.to_string(),
            }),
        }
    }

    async fn load_response(&self, session_id: &str) -> StorageResult<ResponseRecord> {
        let responses = self.responses.read().await;
        responses
            .get(session_id)
            .cloned()
            .ok_or_else(|| StorageError::ResponseNotFound {
                session_id: session_id.to_string(),
            })
    }

    async fn save_response(&self, record: &ResponseRecord) -> StorageResult<()> {
        let mut responses = self.responses.write().await;
        responses.insert(record.session_id.clone(), record.clone());
        Ok(())
    }
}
