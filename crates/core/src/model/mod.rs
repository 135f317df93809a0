mod chat;
mod document;
mod ids;
mod quiz;
mod selection;

pub use chat::{AskAnswer, ChatMessage, ChatRecord, ChatSummary, MessageRole, SourceRef};
pub use document::{Document, DocumentGroup, DocumentGroups, SimilarityGroup};
pub use ids::{ChatId, QuizId, UserId};
pub use quiz::{Difficulty, Quiz, QuizAttempt, QuizQuestion, QuizResult, StoredQuiz};
pub use selection::SelectionSet;
