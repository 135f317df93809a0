/// Aggregated view of quiz session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizProgress {
    pub total: usize,
    pub current: usize,
    pub answered: usize,
    pub is_complete: bool,
}
