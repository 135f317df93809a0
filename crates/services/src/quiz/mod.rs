mod progress;
mod session;
mod workflow;

pub use progress::QuizProgress;
pub use session::QuizSession;
pub use workflow::{QuizOutcome, QuizWorkflow};
