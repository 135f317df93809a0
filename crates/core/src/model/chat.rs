use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::ChatId;

//
// ─── MESSAGES ──────────────────────────────────────────────────────────────────
//

/// Who produced a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "ai")]
    Assistant,
}

/// A citation into the document corpus backing an assistant answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub filename: String,
    pub chunk_index: u32,
}

/// One message of a chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceRef>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    #[must_use]
    pub fn user(content: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            sources: Vec::new(),
            timestamp: at,
        }
    }

    #[must_use]
    pub fn assistant(
        content: impl Into<String>,
        sources: Vec<SourceRef>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            sources,
            timestamp: at,
        }
    }
}

/// Answer payload of the question-answering call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AskAnswer {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

//
// ─── PERSISTED CHATS ───────────────────────────────────────────────────────────
//

/// A full chat transcript as stored remotely, keyed by chat id.
///
/// Saves are idempotent upserts: writing the same id twice overwrites the
/// earlier record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub chat_id: ChatId,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub selected_documents: Vec<String>,
}

/// One entry of the saved-chat listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatSummary {
    pub id: ChatId,
    pub title: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
