//! reqwest-backed adapter for the remote learning service.

use std::env;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use study_core::model::{
    AskAnswer, ChatId, ChatMessage, ChatRecord, ChatSummary, DocumentGroups, Quiz, QuizAttempt,
    QuizId, QuizResult, StoredQuiz, UserId,
};

use crate::error::ApiError;
use crate::gateway::{ChatApi, DocumentApi, ProgressApi, QuizApi};

//
// ─── CONFIG & SESSION ──────────────────────────────────────────────────────────
//

/// Where the remote service lives.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    /// Reads the base URL from `STUDY_API_BASE_URL`, defaulting to the local
    /// development server.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url =
            env::var("STUDY_API_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".into());
        Self { base_url }
    }
}

/// Explicit session context for outgoing requests.
///
/// Holds the active user and bearer token instead of reading them from any
/// ambient storage. Built once at startup, cleared on logout.
#[derive(Clone, Debug)]
pub struct Session {
    user_id: UserId,
    token: Option<String>,
}

impl Session {
    /// Session for a signed-in user with a bearer credential.
    #[must_use]
    pub fn authenticated(user_id: UserId, token: impl Into<String>) -> Self {
        Self {
            user_id,
            token: Some(token.into()),
        }
    }

    /// Session for the anonymous fallback identity.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            user_id: UserId::default_user(),
            token: None,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Drops the credential and falls back to the anonymous identity.
    pub fn clear(&mut self) {
        *self = Self::anonymous();
    }
}

//
// ─── HTTP ADAPTER ──────────────────────────────────────────────────────────────
//

/// Implements all gateway traits over JSON-over-HTTP.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    session: Session,
}

impl HttpApi {
    #[must_use]
    pub fn new(config: ApiConfig, session: Session) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        debug!(path, "GET");
        let request = self.authorize(self.client.get(self.url(path)).query(query));
        Self::decode(request.send().await?).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!(path, "POST");
        let request = self.authorize(self.client.post(self.url(path)).json(body));
        Self::decode(request.send().await?).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        debug!(path, "DELETE");
        let request = self.authorize(self.client.delete(self.url(path)));
        let response = request.send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Maps a non-2xx response to `ApiError`, surfacing the body's `error`
    /// field when present.
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let error_body = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error);
        Err(ApiError::from_status(status.as_u16(), error_body))
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

//
// ─── REQUEST & RESPONSE BODIES ─────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
struct GenerateQuizBody<'a> {
    user_id: &'a UserId,
    selected_documents: &'a [String],
    num_questions: u32,
}

#[derive(Debug, Serialize)]
struct RetakeQuizBody<'a> {
    user_id: &'a UserId,
    num_questions: u32,
}

#[derive(Debug, Serialize)]
struct AskBody<'a> {
    query: &'a str,
    user_id: &'a UserId,
    selected_documents: &'a [String],
    chat_history: &'a [ChatMessage],
}

#[derive(Debug, Serialize)]
struct GenerateSummaryBody<'a> {
    user_id: &'a UserId,
    filename: &'a str,
}

#[derive(Debug, Deserialize)]
struct DetailedSummaryResponse {
    detailed_summary: String,
}

#[derive(Debug, Serialize)]
struct SaveChatBody<'a> {
    user_id: &'a UserId,
    #[serde(flatten)]
    record: &'a ChatRecord,
}

//
// ─── GATEWAY IMPLEMENTATIONS ───────────────────────────────────────────────────
//

#[async_trait]
impl DocumentApi for HttpApi {
    async fn fetch_documents(&self, user: &UserId) -> Result<DocumentGroups, ApiError> {
        self.get_json("/api/documents", &[("user_id", user.as_str())])
            .await
    }

    async fn generate_summary(&self, user: &UserId, filename: &str) -> Result<String, ApiError> {
        let response: DetailedSummaryResponse = self
            .post_json(
                "/api/generate-summary",
                &GenerateSummaryBody {
                    user_id: user,
                    filename,
                },
            )
            .await?;
        Ok(response.detailed_summary)
    }
}

#[async_trait]
impl QuizApi for HttpApi {
    async fn generate_quiz(
        &self,
        user: &UserId,
        selected_documents: &[String],
        num_questions: u32,
    ) -> Result<Quiz, ApiError> {
        self.post_json(
            "/api/generate-quiz",
            &GenerateQuizBody {
                user_id: user,
                selected_documents,
                num_questions,
            },
        )
        .await
    }

    async fn retake_quiz(
        &self,
        quiz_id: &QuizId,
        user: &UserId,
        num_questions: u32,
    ) -> Result<Quiz, ApiError> {
        self.post_json(
            &format!("/api/retake-quiz/{quiz_id}"),
            &RetakeQuizBody {
                user_id: user,
                num_questions,
            },
        )
        .await
    }

    async fn stored_quizzes(
        &self,
        user: &UserId,
        topic: Option<&str>,
    ) -> Result<Vec<StoredQuiz>, ApiError> {
        let mut query = vec![("user_id", user.as_str())];
        if let Some(topic) = topic {
            query.push(("topic", topic));
        }
        self.get_json("/api/stored-quizzes", &query).await
    }
}

#[async_trait]
impl ProgressApi for HttpApi {
    async fn save_quiz_result(&self, result: &QuizResult) -> Result<(), ApiError> {
        let _: serde_json::Value = self.post_json("/api/progress/quiz-result", result).await?;
        Ok(())
    }

    async fn quiz_attempts(&self, user: &UserId, limit: u32) -> Result<Vec<QuizAttempt>, ApiError> {
        let limit = limit.to_string();
        self.get_json(
            "/api/quiz-attempts",
            &[("user_id", user.as_str()), ("limit", &limit)],
        )
        .await
    }
}

#[async_trait]
impl ChatApi for HttpApi {
    async fn ask(
        &self,
        user: &UserId,
        query: &str,
        selected_documents: &[String],
        history: &[ChatMessage],
    ) -> Result<AskAnswer, ApiError> {
        self.post_json(
            "/api/ask",
            &AskBody {
                query,
                user_id: user,
                selected_documents,
                chat_history: history,
            },
        )
        .await
    }

    async fn list_chats(&self, user: &UserId) -> Result<Vec<ChatSummary>, ApiError> {
        self.get_json("/api/chats", &[("user_id", user.as_str())])
            .await
    }

    async fn save_chat(&self, user: &UserId, record: &ChatRecord) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .post_json(
                "/api/chats",
                &SaveChatBody {
                    user_id: user,
                    record,
                },
            )
            .await?;
        Ok(())
    }

    async fn load_chat(&self, user: &UserId, id: &ChatId) -> Result<ChatRecord, ApiError> {
        self.get_json(&format!("/api/chats/{id}"), &[("user_id", user.as_str())])
            .await
    }

    async fn delete_chat(&self, _user: &UserId, id: &ChatId) -> Result<(), ApiError> {
        self.delete(&format!("/api/chats/{id}")).await
    }
}
