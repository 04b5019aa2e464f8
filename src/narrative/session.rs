//! Chat sessions: one analysis plus an append-only message history

use super::client::{NarrativeClient, NarrativeRequest};
use super::prompt::{chat_system_instruction, commentary_prompt};
use crate::error::{RatioError, RatioResult};
use crate::types::Analysis;
use crate::writer::render_context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Ordered message log; entries are never edited or removed
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// State owned by one user: the current analysis and the conversation about it
#[derive(Debug, Clone, Serialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub analysis: Option<Analysis>,
    pub history: ChatHistory,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            analysis: None,
            history: ChatHistory::new(),
        }
    }

    pub fn with_analysis(analysis: Analysis) -> Self {
        let mut session = Self::new();
        session.load_analysis(analysis);
        session
    }

    /// Replace the analysis; history is kept across uploads
    pub fn load_analysis(&mut self, analysis: Analysis) {
        self.analysis = Some(analysis);
    }

    fn context(&self) -> RatioResult<String> {
        self.analysis
            .as_ref()
            .map(render_context)
            .ok_or_else(|| RatioError::Narrative("no table has been analyzed in this session".to_string()))
    }

    /// Request for a standalone commentary (not recorded in the history)
    pub fn commentary_request(&self) -> RatioResult<NarrativeRequest> {
        let context = self.context()?;
        Ok(NarrativeRequest {
            system_instruction: None,
            messages: vec![ChatMessage::user(commentary_prompt(&context))],
        })
    }

    /// Request carrying the full history followed by `question`
    pub fn question_request(&self, question: &str) -> RatioResult<NarrativeRequest> {
        let context = self.context()?;
        if question.trim().is_empty() {
            return Err(RatioError::Narrative("question must not be empty".to_string()));
        }
        let mut messages = self.history.messages().to_vec();
        messages.push(ChatMessage::user(question));
        Ok(NarrativeRequest {
            system_instruction: Some(chat_system_instruction(&context)),
            messages,
        })
    }

    /// Append a completed question/answer pair
    pub fn record_exchange(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.history.append(ChatMessage::user(question));
        self.history.append(ChatMessage::model(answer));
    }

    pub async fn commentary(&self, client: &dyn NarrativeClient) -> RatioResult<String> {
        let request = self.commentary_request()?;
        client.generate(&request).await
    }

    /// Ask a follow-up question; history only grows when the call succeeds
    pub async fn ask(&mut self, client: &dyn NarrativeClient, question: &str) -> RatioResult<String> {
        let request = self.question_request(question)?;
        let answer = client.generate(&request).await?;
        self.record_exchange(question, answer.clone());
        debug!(session = %self.id, messages = self.history.len(), "recorded chat exchange");
        Ok(answer)
    }
}
