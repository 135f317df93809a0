use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use study_core::model::{Quiz, QuizQuestion};

use super::progress::QuizProgress;

//
// ─── QUIZ SESSION ──────────────────────────────────────────────────────────────
//

/// In-memory state machine for one pass through a quiz.
///
/// The session is either in progress at some question index or completed.
/// It starts at question 0, captures at most one answer per question, and
/// derives the score once completed. The quiz value itself is immutable;
/// regenerating swaps in a whole new quiz and resets the session.
pub struct QuizSession {
    quiz: Quiz,
    current: usize,
    answers: BTreeMap<usize, char>,
    completed: bool,
}

impl QuizSession {
    /// Starts a session at the first question.
    ///
    /// A quiz with no questions is accepted but immediately reports
    /// [`is_unavailable`](Self::is_unavailable); callers short-circuit to an
    /// "unavailable" display instead of running the question loop.
    #[must_use]
    pub fn new(quiz: Quiz) -> Self {
        Self {
            quiz,
            current: 0,
            answers: BTreeMap::new(),
            completed: false,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.quiz.len()
    }

    /// True when there is nothing to run (zero questions).
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        self.quiz.is_empty()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.quiz.questions.get(self.current)
    }

    #[must_use]
    pub fn answer_for(&self, index: usize) -> Option<char> {
        self.answers.get(&index).copied()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress {
            total: self.total_questions(),
            current: self.current,
            answered: self.answered_count(),
            is_complete: self.completed,
        }
    }

    /// Records (or overwrites) the answer for a question.
    ///
    /// Only valid while in progress and for a real question index; anything
    /// else is ignored. Does not advance the session. Returns whether the
    /// answer was recorded.
    pub fn select_answer(&mut self, index: usize, letter: char) -> bool {
        if self.completed || index >= self.quiz.len() {
            return false;
        }
        self.answers.insert(index, letter);
        true
    }

    /// Advances to the next question, or completes on the last one.
    ///
    /// Mirrors the disabled "Next"/"Finish" button: a no-op unless the
    /// current question has a recorded answer. Returns whether the session
    /// moved.
    pub fn next(&mut self) -> bool {
        if self.completed || !self.answers.contains_key(&self.current) {
            return false;
        }
        if self.current + 1 >= self.quiz.len() {
            debug!("quiz session completed");
            self.completed = true;
        } else {
            self.current += 1;
        }
        true
    }

    /// Steps back one question. Previously recorded answers are kept.
    pub fn previous(&mut self) -> bool {
        if self.completed || self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Forces completion regardless of whether the current question is
    /// answered (the explicit "Finish Quiz" action).
    pub fn finish(&mut self) {
        self.completed = true;
    }

    /// Number of questions whose recorded answer matches the correct letter.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.quiz
            .questions
            .iter()
            .enumerate()
            .filter(|(index, question)| self.answers.get(index) == Some(&question.correct_answer))
            .count() as u32
    }

    /// Score as a rounded percentage. A zero-question quiz reports 0 rather
    /// than dividing by zero.
    #[must_use]
    pub fn percentage(&self) -> u8 {
        let total = self.quiz.len();
        if total == 0 {
            return 0;
        }
        (f64::from(self.score()) * 100.0 / total as f64).round() as u8
    }

    /// Returns to the first question with all answers cleared, for "Retake
    /// Quiz" or ahead of a regeneration.
    pub fn reset(&mut self) {
        self.current = 0;
        self.answers.clear();
        self.completed = false;
    }

    /// Swaps in a freshly generated quiz and resets the session.
    pub(crate) fn replace_quiz(&mut self, quiz: Quiz) {
        self.quiz = quiz;
        self.reset();
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("questions", &self.quiz.len())
            .field("current", &self.current)
            .field("answered", &self.answers.len())
            .field("completed", &self.completed)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
