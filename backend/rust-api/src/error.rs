use thiserror::Error;

use crate::models::Tier;

/// Errors raised by the question engine. Running out of unused questions is
/// not one of them: selection always returns something.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),
}

/// Errors raised while loading or validating a question bank.
#[derive(Debug, Error)]
pub enum BankError {
    #[error("Duplicate question id: {0}")]
    DuplicateId(String),

    #[error("Question {id} is tagged {declared} but listed under {listed}")]
    TierMismatch {
        id: String,
        declared: Tier,
        listed: Tier,
    },

    #[error("Question {id} has correct_answer {index} but only {options} options")]
    InvalidAnswerIndex {
        id: String,
        index: usize,
        options: usize,
    },

    #[error("Question bank contains no questions")]
    Empty,

    #[error("Failed to parse question bank: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read question bank: {0}")]
    Io(#[from] std::io::Error),
}
