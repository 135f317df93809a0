//! Progress persistence gateway.

use std::sync::Arc;

use tracing::{debug, warn};

use study_core::model::{QuizAttempt, QuizResult, UserId};

use crate::error::ApiError;
use crate::gateway::ProgressApi;

/// Sends quiz results to the remote service and refreshes history views.
#[derive(Clone)]
pub struct ProgressGateway {
    api: Arc<dyn ProgressApi>,
    user: UserId,
}

impl ProgressGateway {
    #[must_use]
    pub fn new(api: Arc<dyn ProgressApi>, user: UserId) -> Self {
        Self { api, user }
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user
    }

    /// Persists a quiz result, fire-and-forget.
    ///
    /// A failed save is logged and swallowed: the results view must render
    /// the computed score whether or not the record made it to the server.
    pub async fn record_quiz(&self, result: &QuizResult) {
        match self.api.save_quiz_result(result).await {
            Ok(()) => debug!(quiz_id = %result.quiz_id, "quiz result saved"),
            Err(err) => warn!(quiz_id = %result.quiz_id, %err, "failed to save quiz result"),
        }
    }

    /// Fetches the most recent quiz attempts for the history view.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on request failure.
    pub async fn recent_attempts(&self, limit: u32) -> Result<Vec<QuizAttempt>, ApiError> {
        self.api.quiz_attempts(&self.user, limit).await
    }
}
