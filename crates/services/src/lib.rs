#![forbid(unsafe_code)]

pub mod chat;
pub mod client;
pub mod documents;
pub mod error;
pub mod gateway;
pub mod progress;
pub mod quiz;

pub use study_core::Clock;

pub use chat::ChatService;
pub use client::{ApiConfig, HttpApi, Session};
pub use documents::DocumentService;
pub use error::ApiError;
pub use gateway::{ChatApi, DocumentApi, ProgressApi, QuizApi};
pub use progress::ProgressGateway;
pub use quiz::{QuizOutcome, QuizProgress, QuizSession, QuizWorkflow};
