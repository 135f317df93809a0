//! Port traits for the remote learning service.
//!
//! The workflow services only see these contracts; the reqwest-backed
//! [`HttpApi`](crate::client::HttpApi) implements all of them, and tests swap
//! in in-memory fakes.

use async_trait::async_trait;

use study_core::model::{
    AskAnswer, ChatId, ChatMessage, ChatRecord, ChatSummary, DocumentGroups, Quiz, QuizAttempt,
    QuizId, QuizResult, StoredQuiz, UserId,
};

use crate::error::ApiError;

/// Document listing and summarization endpoints.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Fetch the grouped document listing for a user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the service rejects it.
    async fn fetch_documents(&self, user: &UserId) -> Result<DocumentGroups, ApiError>;

    /// Generate (or fetch) the detailed summary for one document.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if summarization fails remotely.
    async fn generate_summary(&self, user: &UserId, filename: &str) -> Result<String, ApiError>;
}

/// Quiz generation and stored-quiz endpoints.
#[async_trait]
pub trait QuizApi: Send + Sync {
    /// Generate a quiz over the selected documents.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if generation fails; callers must keep their
    /// previous quiz state in that case.
    async fn generate_quiz(
        &self,
        user: &UserId,
        selected_documents: &[String],
        num_questions: u32,
    ) -> Result<Quiz, ApiError>;

    /// Regenerate a stored quiz by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the quiz is unknown or generation fails.
    async fn retake_quiz(
        &self,
        quiz_id: &QuizId,
        user: &UserId,
        num_questions: u32,
    ) -> Result<Quiz, ApiError>;

    /// List saved quiz definitions, optionally filtered by topic.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on request failure.
    async fn stored_quizzes(
        &self,
        user: &UserId,
        topic: Option<&str>,
    ) -> Result<Vec<StoredQuiz>, ApiError>;
}

/// Progress-tracking endpoints.
#[async_trait]
pub trait ProgressApi: Send + Sync {
    /// Persist a completed quiz result.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on request failure. The quiz workflow treats this
    /// call as fire-and-forget and only logs the failure.
    async fn save_quiz_result(&self, result: &QuizResult) -> Result<(), ApiError>;

    /// Fetch the most recent quiz attempts.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on request failure.
    async fn quiz_attempts(&self, user: &UserId, limit: u32) -> Result<Vec<QuizAttempt>, ApiError>;
}

/// Question answering and chat persistence endpoints.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Ask a question against the selected documents with prior exchanges as
    /// context.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on request failure.
    async fn ask(
        &self,
        user: &UserId,
        query: &str,
        selected_documents: &[String],
        history: &[ChatMessage],
    ) -> Result<AskAnswer, ApiError>;

    /// List saved chats for the user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on request failure.
    async fn list_chats(&self, user: &UserId) -> Result<Vec<ChatSummary>, ApiError>;

    /// Upsert a chat transcript, keyed by its chat id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on request failure.
    async fn save_chat(&self, user: &UserId, record: &ChatRecord) -> Result<(), ApiError>;

    /// Load a chat transcript by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the chat is unknown or the request fails.
    async fn load_chat(&self, user: &UserId, id: &ChatId) -> Result<ChatRecord, ApiError>;

    /// Delete a chat transcript by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on request failure.
    async fn delete_chat(&self, user: &UserId, id: &ChatId) -> Result<(), ApiError>;
}
