use std::sync::Arc;

use tracing::debug;

use study_core::Clock;
use study_core::model::{QuizId, QuizResult, StoredQuiz, UserId};

use crate::error::ApiError;
use crate::gateway::QuizApi;
use crate::progress::ProgressGateway;

use super::session::QuizSession;

/// Final result of a completed quiz session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOutcome {
    pub quiz_id: QuizId,
    pub topic: String,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u8,
}

/// Orchestrates quiz generation, regeneration, retakes, and result
/// persistence around [`QuizSession`].
#[derive(Clone)]
pub struct QuizWorkflow {
    clock: Clock,
    quizzes: Arc<dyn QuizApi>,
    progress: ProgressGateway,
    user: UserId,
}

impl QuizWorkflow {
    #[must_use]
    pub fn new(
        clock: Clock,
        quizzes: Arc<dyn QuizApi>,
        progress: ProgressGateway,
        user: UserId,
    ) -> Self {
        Self {
            clock,
            quizzes,
            progress,
            user,
        }
    }

    /// Generates a quiz over the selected documents and starts a session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if generation fails. No session is created in that
    /// case, so the caller's previous quiz (if any) stays intact.
    pub async fn start(
        &self,
        selected_documents: &[String],
        num_questions: u32,
    ) -> Result<QuizSession, ApiError> {
        let quiz = self
            .quizzes
            .generate_quiz(&self.user, selected_documents, num_questions)
            .await?;
        debug!(questions = quiz.len(), "quiz generated");
        Ok(QuizSession::new(quiz))
    }

    /// Regenerates the session's quiz with different settings.
    ///
    /// Documents default to the current quiz's `documents_used` when the
    /// caller does not override them. The session is only touched once a new
    /// quiz has actually arrived; a failed generation leaves it exactly as it
    /// was.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if generation fails.
    pub async fn regenerate(
        &self,
        session: &mut QuizSession,
        documents: Option<&[String]>,
        num_questions: u32,
    ) -> Result<(), ApiError> {
        let documents = match documents {
            Some(docs) => docs.to_vec(),
            None => session.quiz().documents_used.clone(),
        };
        let quiz = self
            .quizzes
            .generate_quiz(&self.user, &documents, num_questions)
            .await?;
        session.replace_quiz(quiz);
        Ok(())
    }

    /// Starts a fresh session from a stored quiz.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the stored quiz is unknown or regeneration
    /// fails.
    pub async fn retake_stored(
        &self,
        quiz_id: &QuizId,
        num_questions: u32,
    ) -> Result<QuizSession, ApiError> {
        let quiz = self
            .quizzes
            .retake_quiz(quiz_id, &self.user, num_questions)
            .await?;
        Ok(QuizSession::new(quiz))
    }

    /// Completes the session, computes the outcome, and persists the result.
    ///
    /// Persistence is fire-and-forget: a failed save is logged by the
    /// progress gateway and the outcome is returned regardless, so the
    /// results view always renders the score. An unavailable session (zero
    /// questions) produces an outcome but records no attempt.
    pub async fn finish(&self, session: &mut QuizSession) -> QuizOutcome {
        session.finish();

        let quiz = session.quiz();
        let outcome = QuizOutcome {
            quiz_id: quiz.id_or_generated(self.clock.now()),
            topic: quiz.topic_label().to_string(),
            score: session.score(),
            total_questions: session.total_questions() as u32,
            percentage: session.percentage(),
        };

        if session.is_unavailable() {
            debug!("no questions ran, skipping result save");
            return outcome;
        }

        let result = QuizResult {
            user_id: self.user.clone(),
            quiz_id: outcome.quiz_id.clone(),
            topic: outcome.topic.clone(),
            score: outcome.score,
            total_questions: outcome.total_questions,
            documents_used: quiz.documents_used.clone(),
        };
        self.progress.record_quiz(&result).await;

        outcome
    }

    /// Lists saved quiz definitions, optionally filtered by topic.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on request failure.
    pub async fn stored(&self, topic: Option<&str>) -> Result<Vec<StoredQuiz>, ApiError> {
        self.quizzes.stored_quizzes(&self.user, topic).await
    }

    /// The progress gateway backing this workflow, for history views.
    #[must_use]
    pub fn progress(&self) -> &ProgressGateway {
        &self.progress
    }
}
