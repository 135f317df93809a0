use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use services::{ApiError, ProgressGateway, QuizApi, QuizWorkflow};
use services::gateway::ProgressApi;
use study_core::model::{
    Quiz, QuizAttempt, QuizId, QuizQuestion, QuizResult, StoredQuiz, UserId,
};
use study_core::time::fixed_clock;

fn question(correct: char) -> QuizQuestion {
    QuizQuestion {
        question: "Which organelle synthesizes proteins?".to_string(),
        options: vec![
            "A) Nucleus".to_string(),
            "B) Ribosome".to_string(),
            "C) Golgi".to_string(),
            "D) Lysosome".to_string(),
        ],
        correct_answer: correct,
        explanation: None,
        difficulty: None,
    }
}

fn quiz(correct: &[char]) -> Quiz {
    Quiz {
        questions: correct.iter().map(|c| question(*c)).collect(),
        topic: Some("Biology".to_string()),
        quiz_id: Some(QuizId::new("u1_Biology_cells.pdf")),
        documents_used: vec!["cells.pdf".to_string()],
        created_at: None,
    }
}

#[derive(Default)]
struct FakeBackend {
    next_quiz: Mutex<Option<Quiz>>,
    fail_generation: Mutex<bool>,
    fail_saves: Mutex<bool>,
    saved_results: Mutex<Vec<QuizResult>>,
    generate_calls: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl QuizApi for FakeBackend {
    async fn generate_quiz(
        &self,
        _user: &UserId,
        selected_documents: &[String],
        _num_questions: u32,
    ) -> Result<Quiz, ApiError> {
        self.generate_calls
            .lock()
            .unwrap()
            .push(selected_documents.to_vec());
        if *self.fail_generation.lock().unwrap() {
            return Err(ApiError::from_status(500, Some("generation failed".into())));
        }
        Ok(self.next_quiz.lock().unwrap().clone().unwrap_or_default())
    }

    async fn retake_quiz(
        &self,
        _quiz_id: &QuizId,
        user: &UserId,
        num_questions: u32,
    ) -> Result<Quiz, ApiError> {
        self.generate_quiz(user, &[], num_questions).await
    }

    async fn stored_quizzes(
        &self,
        _user: &UserId,
        _topic: Option<&str>,
    ) -> Result<Vec<StoredQuiz>, ApiError> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl ProgressApi for FakeBackend {
    async fn save_quiz_result(&self, result: &QuizResult) -> Result<(), ApiError> {
        if *self.fail_saves.lock().unwrap() {
            return Err(ApiError::from_status(503, None));
        }
        self.saved_results.lock().unwrap().push(result.clone());
        Ok(())
    }

    async fn quiz_attempts(
        &self,
        _user: &UserId,
        _limit: u32,
    ) -> Result<Vec<QuizAttempt>, ApiError> {
        Ok(Vec::new())
    }
}

fn workflow(backend: &Arc<FakeBackend>) -> QuizWorkflow {
    let user = UserId::new("u1");
    QuizWorkflow::new(
        fixed_clock(),
        backend.clone(),
        ProgressGateway::new(backend.clone(), user.clone()),
        user,
    )
}

#[tokio::test]
async fn full_session_persists_the_result() {
    let backend = Arc::new(FakeBackend::default());
    *backend.next_quiz.lock().unwrap() = Some(quiz(&['B', 'A']));
    let workflow = workflow(&backend);

    let mut session = workflow
        .start(&["cells.pdf".to_string()], 5)
        .await
        .unwrap();
    session.select_answer(0, 'B');
    assert!(session.next());
    session.select_answer(1, 'C');
    assert!(session.next());
    assert!(session.is_complete());

    let outcome = workflow.finish(&mut session).await;
    assert_eq!(outcome.score, 1);
    assert_eq!(outcome.percentage, 50);
    assert_eq!(outcome.topic, "Biology");

    let saved = backend.saved_results.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].quiz_id, QuizId::new("u1_Biology_cells.pdf"));
    assert_eq!(saved[0].score, 1);
    assert_eq!(saved[0].total_questions, 2);
    assert_eq!(saved[0].documents_used, ["cells.pdf"]);
}

#[tokio::test]
async fn failed_save_still_returns_the_outcome() {
    let backend = Arc::new(FakeBackend::default());
    *backend.next_quiz.lock().unwrap() = Some(quiz(&['B']));
    *backend.fail_saves.lock().unwrap() = true;
    let workflow = workflow(&backend);

    let mut session = workflow.start(&[], 5).await.unwrap();
    session.select_answer(0, 'B');

    let outcome = workflow.finish(&mut session).await;
    assert_eq!(outcome.score, 1);
    assert_eq!(outcome.percentage, 100);
    assert!(backend.saved_results.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_regeneration_keeps_the_previous_quiz() {
    let backend = Arc::new(FakeBackend::default());
    *backend.next_quiz.lock().unwrap() = Some(quiz(&['B', 'A']));
    let workflow = workflow(&backend);

    let mut session = workflow.start(&[], 5).await.unwrap();
    session.select_answer(0, 'B');
    session.next();

    *backend.fail_generation.lock().unwrap() = true;
    let err = workflow.regenerate(&mut session, None, 3).await.unwrap_err();
    assert_eq!(err.to_string(), "generation failed");

    // session untouched: same quiz, same position, same answers
    assert_eq!(session.total_questions(), 2);
    assert_eq!(session.current_index(), 1);
    assert_eq!(session.answer_for(0), Some('B'));
}

#[tokio::test]
async fn regeneration_defaults_to_the_quiz_documents() {
    let backend = Arc::new(FakeBackend::default());
    *backend.next_quiz.lock().unwrap() = Some(quiz(&['B']));
    let workflow = workflow(&backend);

    let mut session = workflow.start(&["other.pdf".to_string()], 5).await.unwrap();
    session.select_answer(0, 'B');

    workflow.regenerate(&mut session, None, 3).await.unwrap();
    assert!(!session.is_complete());
    assert_eq!(session.answered_count(), 0);

    let calls = backend.generate_calls.lock().unwrap();
    // second call reused the generated quiz's documents_used
    assert_eq!(calls[1], ["cells.pdf"]);
}

#[tokio::test]
async fn retake_of_a_stored_quiz_starts_a_fresh_session() {
    let backend = Arc::new(FakeBackend::default());
    *backend.next_quiz.lock().unwrap() = Some(quiz(&['B']));
    let workflow = workflow(&backend);

    let session = workflow
        .retake_stored(&QuizId::new("u1_Biology_cells.pdf"), 5)
        .await
        .unwrap();
    assert!(!session.is_complete());
    assert_eq!(session.current_index(), 0);
    assert_eq!(session.total_questions(), 1);
}

#[tokio::test]
async fn empty_generated_quiz_is_reported_unavailable() {
    let backend = Arc::new(FakeBackend::default());
    *backend.next_quiz.lock().unwrap() = Some(Quiz::default());
    let workflow = workflow(&backend);

    let mut session = workflow.start(&[], 5).await.unwrap();
    assert!(session.is_unavailable());

    let outcome = workflow.finish(&mut session).await;
    assert_eq!(outcome.percentage, 0);
    assert_eq!(outcome.total_questions, 0);

    // a quiz with no questions leaves no attempt in the history
    assert!(backend.saved_results.lock().unwrap().is_empty());
}
