use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{QuizId, UserId};

//
// ─── QUESTIONS ─────────────────────────────────────────────────────────────────
//

/// Difficulty tag attached to generated questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A single multiple-choice question.
///
/// Options carry their label letter as a prefix ("A) ..."); the correct
/// answer is just the letter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: char,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

impl QuizQuestion {
    /// The label letter of an option string ("B) ..." → 'B').
    #[must_use]
    pub fn option_letter(option: &str) -> Option<char> {
        option.chars().next()
    }
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// An ordered set of questions returned by the generation call.
///
/// Immutable once received; a "regenerate" produces a whole new value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Quiz {
    #[serde(rename = "quiz", default)]
    pub questions: Vec<QuizQuestion>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub quiz_id: Option<QuizId>,
    #[serde(default)]
    pub documents_used: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Quiz {
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Topic label for history displays and result records.
    #[must_use]
    pub fn topic_label(&self) -> &str {
        self.topic.as_deref().unwrap_or("General")
    }

    /// The quiz id, or a fallback derived from `at` when the remote service
    /// did not assign one.
    #[must_use]
    pub fn id_or_generated(&self, at: DateTime<Utc>) -> QuizId {
        self.quiz_id
            .clone()
            .unwrap_or_else(|| QuizId::generated_at(at))
    }
}

//
// ─── RESULTS & HISTORY ─────────────────────────────────────────────────────────
//

/// Body of the quiz-result persistence call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizResult {
    pub user_id: UserId,
    pub quiz_id: QuizId,
    pub topic: String,
    pub score: u32,
    pub total_questions: u32,
    pub documents_used: Vec<String>,
}

/// One entry of the quiz-attempt history listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuizAttempt {
    pub quiz_id: QuizId,
    #[serde(default)]
    pub topic: Option<String>,
    pub score: u32,
    pub total_questions: u32,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// A saved quiz definition that can be retaken.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoredQuiz {
    pub id: QuizId,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub documents: Vec<String>,
    #[serde(default)]
    pub num_questions: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
