// src/error.rs

use std::fmt;

/// Global engine error enum.
/// Centralizes error handling; the (external) API layer maps each variant
/// to a distinct, stable error code so clients can tell "try again" from
/// "this attempt is over".
#[derive(Debug)]
pub enum ExamError {
    // Exam, attempt or question bank reference does not exist
    NotFound(String),

    // Attempt does not belong to the caller
    Forbidden(String),

    // Operation attempted on an attempt/exam not in the required status
    InvalidState(String),

    // Max attempts reached at start time
    AttemptLimitExceeded(String),

    // Time limit exceeded at submission time; the attempt has been
    // persisted as EXPIRED as a side effect of raising this
    AttemptExpired(String),

    // Uniqueness violation (e.g., second exam for the same course)
    Conflict(String),

    // Rejected input (blueprint or DTO validation)
    Validation(String),

    // Persistence failure, propagated unchanged; retries belong to the
    // storage adapter, not the engine
    Storage(String),
}

impl fmt::Display for ExamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for ExamError {}

/// Converts `sqlx::Error` into `ExamError::Storage`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for ExamError {
    fn from(err: sqlx::Error) -> Self {
        ExamError::Storage(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ExamError {
    fn from(err: validator::ValidationErrors) -> Self {
        ExamError::Validation(err.to_string())
    }
}
