//! Chat session service: exchanges, transcript state, and debounced
//! autosave.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use study_core::Clock;
use study_core::model::{ChatId, ChatMessage, ChatRecord, ChatSummary, SelectionSet, UserId};

use crate::error::ApiError;
use crate::gateway::ChatApi;

/// Assistant message appended when the question-answering call fails.
pub const ASK_FALLBACK: &str = "Sorry, I encountered an error. Please try again.";

/// Delay between a completed exchange and its automatic save.
pub const AUTOSAVE_DELAY: Duration = Duration::from_secs(1);

/// One chat conversation: its transcript, document scope, and persistence.
///
/// The transcript lives in memory; saves are idempotent upserts keyed by a
/// chat id generated on first save and reused thereafter. Autosave is
/// debounced by a fixed delay and never re-armed: a pending save superseded
/// by a later one just overwrites the same record.
pub struct ChatService {
    api: Arc<dyn ChatApi>,
    user: UserId,
    clock: Clock,
    chat_id: Option<ChatId>,
    messages: Vec<ChatMessage>,
    selection: SelectionSet,
    autosave_delay: Duration,
}

impl ChatService {
    #[must_use]
    pub fn new(api: Arc<dyn ChatApi>, user: UserId, clock: Clock) -> Self {
        Self {
            api,
            user,
            clock,
            chat_id: None,
            messages: Vec::new(),
            selection: SelectionSet::new(None),
            autosave_delay: AUTOSAVE_DELAY,
        }
    }

    /// Overrides the autosave debounce delay (tests use a short one).
    #[must_use]
    pub fn with_autosave_delay(mut self, delay: Duration) -> Self {
        self.autosave_delay = delay;
        self
    }

    #[must_use]
    pub fn chat_id(&self) -> Option<&ChatId> {
        self.chat_id.as_ref()
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Documents the next question is scoped to. No quota applies here.
    #[must_use]
    pub fn selected_documents(&self) -> &[String] {
        self.selection.selected()
    }

    pub fn set_selected_documents(&mut self, filenames: Vec<String>) {
        self.selection.clear();
        for filename in &filenames {
            self.selection.toggle(filename);
        }
    }

    pub fn toggle_document(&mut self, filename: &str) {
        self.selection.toggle(filename);
    }

    /// Runs one exchange: appends the user message, asks the remote service
    /// with the prior transcript as context, and appends the answer.
    ///
    /// A failed call appends a fixed fallback message instead of an answer,
    /// so the transcript always reflects what the user saw; the failure is
    /// logged, not surfaced. Returns the appended assistant message.
    pub async fn ask(&mut self, query: &str) -> ChatMessage {
        let history = self.messages.clone();
        self.messages
            .push(ChatMessage::user(query, self.clock.now()));

        let reply = match self
            .api
            .ask(&self.user, query, self.selection.selected(), &history)
            .await
        {
            Ok(answer) => {
                ChatMessage::assistant(answer.answer, answer.sources, self.clock.now())
            }
            Err(err) => {
                warn!(%err, "question answering failed");
                ChatMessage::assistant(ASK_FALLBACK, Vec::new(), self.clock.now())
            }
        };
        self.messages.push(reply.clone());
        reply
    }

    /// Schedules the debounced save that follows an exchange.
    ///
    /// Returns `None` when there is nothing to save yet. Otherwise assigns
    /// the chat id on first use and returns a future that sleeps for the
    /// debounce delay and then upserts the transcript; the caller spawns it.
    /// A save failure is logged and swallowed.
    pub fn autosave(&mut self) -> Option<impl Future<Output = ()> + Send + 'static> {
        if self.messages.is_empty() {
            return None;
        }
        let record = self.current_record();
        let api = Arc::clone(&self.api);
        let user = self.user.clone();
        let delay = self.autosave_delay;
        Some(async move {
            tokio::time::sleep(delay).await;
            match api.save_chat(&user, &record).await {
                Ok(()) => debug!(chat_id = %record.chat_id, "chat autosaved"),
                Err(err) => warn!(chat_id = %record.chat_id, %err, "chat autosave failed"),
            }
        })
    }

    /// Saves the transcript immediately.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on request failure.
    pub async fn save_now(&mut self) -> Result<(), ApiError> {
        let record = self.current_record();
        self.api.save_chat(&self.user, &record).await
    }

    /// Lists the user's saved chats.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on request failure.
    pub async fn list_saved(&self) -> Result<Vec<ChatSummary>, ApiError> {
        self.api.list_chats(&self.user).await
    }

    /// Replaces the current conversation with a saved transcript.
    ///
    /// Applied only on success; a failed load leaves the current
    /// conversation untouched.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the chat is unknown or the request fails.
    pub async fn load(&mut self, id: &ChatId) -> Result<(), ApiError> {
        let record = self.api.load_chat(&self.user, id).await?;
        self.chat_id = Some(record.chat_id);
        self.messages = record.messages;
        self.set_selected_documents(record.selected_documents);
        Ok(())
    }

    /// Deletes a saved chat. If it is the one currently open, the
    /// conversation resets to a fresh chat.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on request failure.
    pub async fn delete(&mut self, id: &ChatId) -> Result<(), ApiError> {
        self.api.delete_chat(&self.user, id).await?;
        if self.chat_id.as_ref() == Some(id) {
            self.new_chat();
        }
        Ok(())
    }

    /// Starts a fresh, unsaved conversation.
    pub fn new_chat(&mut self) {
        self.chat_id = None;
        self.messages.clear();
    }

    /// Title derived from the first message, truncated to 50 characters.
    #[must_use]
    pub fn title(&self) -> String {
        self.messages
            .first()
            .map(|msg| msg.content.chars().take(50).collect())
            .unwrap_or_else(|| "New Chat".to_string())
    }

    fn current_record(&mut self) -> ChatRecord {
        let chat_id = self
            .chat_id
            .get_or_insert_with(ChatId::generate)
            .clone();
        ChatRecord {
            chat_id,
            title: self.title(),
            messages: self.messages.clone(),
            selected_documents: self.selection.selected().to_vec(),
        }
    }
}
