// src/store/mod.rs

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::ExamError;
use crate::models::attempt::{AttemptAnswer, AttemptStatus, ExamAttempt};
use crate::models::exam::{ExamConfig, ExamQuestionRef, ExamStatus, NewExam, OptionKey};
use crate::models::question::QuestionBank;

pub use memory::{MemoryCompletionLog, MemoryStore};
pub use postgres::PostgresStore;

/// Persistence seam of the exam engine.
///
/// The engine assumes a reliable, transactional store beneath this trait
/// and never retries; storage failures propagate unchanged. Attempts are
/// never deleted, so the trait deliberately exposes no delete.
///
/// Concurrency contract: `finalize_attempt` and `update_exam_status` are
/// conditional writes (compare-and-swap on the current status). They return
/// `Ok(false)` when zero rows matched, which callers treat as a losing
/// race, not a storage error.
#[async_trait]
pub trait ExamStore: Send + Sync {
    // -- exam configuration --

    /// Inserts a DRAFT exam. Fails with `Conflict` if the course already
    /// has one (one exam per course).
    async fn insert_exam(&self, exam: &NewExam) -> Result<ExamConfig, ExamError>;

    async fn exam_by_id(&self, exam_id: i64) -> Result<Option<ExamConfig>, ExamError>;

    /// Conditional status transition: only applies when the exam currently
    /// has status `from`.
    async fn update_exam_status(
        &self,
        exam_id: i64,
        from: ExamStatus,
        to: ExamStatus,
    ) -> Result<bool, ExamError>;

    // -- authored content (read-only during attempts) --

    /// Question refs of an exam, ordered by display_order.
    async fn questions_ordered(&self, exam_id: i64) -> Result<Vec<ExamQuestionRef>, ExamError>;

    /// Answer keys of every option belonging to the exam's questions.
    async fn option_keys(&self, exam_id: i64) -> Result<Vec<OptionKey>, ExamError>;

    /// The course's question bank, for feasibility evaluation/selection.
    async fn question_bank(&self, course_id: i64) -> Result<QuestionBank, ExamError>;

    // -- attempts --

    /// Persists a new attempt and returns its id.
    async fn insert_attempt(&self, attempt: &ExamAttempt) -> Result<i64, ExamError>;

    async fn attempt_by_id(&self, attempt_id: i64) -> Result<Option<ExamAttempt>, ExamError>;

    async fn attempts_by_status(
        &self,
        status: AttemptStatus,
    ) -> Result<Vec<ExamAttempt>, ExamError>;

    /// Number of attempts for (exam, user), all statuses included.
    async fn count_attempts(&self, exam_id: i64, user_id: i64) -> Result<u32, ExamError>;

    /// Persists submitted answers, one row per question per attempt.
    async fn insert_answers(&self, answers: &[AttemptAnswer]) -> Result<(), ExamError>;

    async fn answers_for_attempt(
        &self,
        attempt_id: i64,
    ) -> Result<Vec<AttemptAnswer>, ExamError>;

    /// Writes the attempt's terminal fields, conditional on the stored row
    /// still being IN_PROGRESS. `Ok(false)` means another writer finalized
    /// the attempt first.
    async fn finalize_attempt(&self, attempt: &ExamAttempt) -> Result<bool, ExamError>;
}

/// Downstream completion/certificate pipeline boundary.
///
/// The attempt lifecycle invokes it at most once per passing evaluation,
/// but the sink must tolerate at-least-once delivery (exactly-once is a
/// best-effort guarantee of the caller, not a cross-boundary transaction).
#[async_trait]
pub trait CompletionSink: Send + Sync {
    async fn record_completion(
        &self,
        course_id: i64,
        user_id: i64,
        attempt_id: i64,
    ) -> Result<(), ExamError>;
}
