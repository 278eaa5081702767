// src/lifecycle.rs

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::Duration;
use rand::rngs::StdRng;
use rand::{SeedableRng, seq::SliceRandom};

use crate::clock::Clock;
use crate::error::ExamError;
use crate::models::attempt::{AttemptAnswer, AttemptStatus, ExamAttempt, SubmittedAnswer};
use crate::models::exam::ExamConfig;
use crate::store::{CompletionSink, ExamStore};

/// Integer-floor score: 3 correct of 5 is exactly 60, and anything short
/// of a percentage point truncates down (59.99% scores 59). This is the
/// boundary compared against the exam's pass percentage, so the floor
/// must never be replaced with rounding.
pub fn score_percentage(correct_answers: u32, total_questions: u32) -> u32 {
    if total_questions == 0 {
        return 0;
    }
    correct_answers * 100 / total_questions
}

/// Drives an attempt through its state machine:
/// IN_PROGRESS -> EVALUATED (submit and evaluate are one atomic step) or
/// IN_PROGRESS -> EXPIRED. Both transitions are conditional writes on the
/// persisted status, so the submission path and the background sweep can
/// race safely; the loser's precondition fails and nothing is overwritten.
pub struct AttemptLifecycle {
    store: Arc<dyn ExamStore>,
    completions: Arc<dyn CompletionSink>,
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
}

impl AttemptLifecycle {
    pub fn new(
        store: Arc<dyn ExamStore>,
        completions: Arc<dyn CompletionSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            completions,
            clock,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Replaces the shuffle rng with a seeded one, for deterministic tests.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Starts a new attempt for (exam, user).
    ///
    /// The question presentation order is frozen here, shuffled or not,
    /// and never recomputed for the life of the attempt. Attempt counting
    /// includes every status — an expired attempt still spends one of the
    /// learner's limited attempts; that is stated product policy.
    pub async fn start_attempt(
        &self,
        exam_id: i64,
        user_id: i64,
    ) -> Result<ExamAttempt, ExamError> {
        let exam = self
            .store
            .exam_by_id(exam_id)
            .await?
            .ok_or_else(|| ExamError::NotFound(format!("exam {} not found", exam_id)))?;

        if let Some(max_attempts) = exam.max_attempts {
            let used = self.store.count_attempts(exam_id, user_id).await?;
            if used >= max_attempts {
                return Err(ExamError::AttemptLimitExceeded(format!(
                    "user {} has used {} of {} attempts on exam {}",
                    user_id, used, max_attempts, exam_id
                )));
            }
        }

        let mut question_order: Vec<i64> = self
            .store
            .questions_ordered(exam_id)
            .await?
            .into_iter()
            .map(|q| q.id)
            .collect();
        if exam.shuffle_questions {
            let mut rng = self.rng.lock().unwrap();
            question_order.shuffle(&mut *rng);
        }

        let mut attempt = ExamAttempt {
            id: 0,
            exam_id,
            user_id,
            status: AttemptStatus::InProgress,
            started_at: self.clock.now(),
            submitted_at: None,
            evaluated_at: None,
            total_questions: 0,
            correct_answers: 0,
            score_percentage: 0,
            passed: false,
            question_order,
        };
        attempt.id = self.store.insert_attempt(&attempt).await?;

        tracing::info!(
            "Started attempt {} on exam {} for user {}",
            attempt.id,
            exam_id,
            user_id
        );
        Ok(attempt)
    }

    /// Accepts a learner's answers, scores them and finalizes the attempt,
    /// all in one operation.
    ///
    /// The time-limit check runs before any answer processing: a late
    /// submission expires the attempt and discards the answers rather than
    /// scoring them, so a learner cannot race the deadline to bank a late
    /// high score. Calling this again on a finalized attempt fails with
    /// `InvalidState` before any re-scoring, which is also what guarantees
    /// the completion fact fires at most once.
    pub async fn submit_and_evaluate(
        &self,
        attempt_id: i64,
        user_id: i64,
        answers: &[SubmittedAnswer],
    ) -> Result<ExamAttempt, ExamError> {
        let mut attempt = self
            .store
            .attempt_by_id(attempt_id)
            .await?
            .ok_or_else(|| ExamError::NotFound(format!("attempt {} not found", attempt_id)))?;

        if attempt.user_id != user_id {
            return Err(ExamError::Forbidden(format!(
                "attempt {} does not belong to user {}",
                attempt_id, user_id
            )));
        }
        if attempt.status != AttemptStatus::InProgress {
            return Err(ExamError::InvalidState(format!(
                "attempt {} is {}, expected IN_PROGRESS",
                attempt_id,
                attempt.status.as_str()
            )));
        }

        let exam = self
            .store
            .exam_by_id(attempt.exam_id)
            .await?
            .ok_or_else(|| ExamError::NotFound(format!("exam {} not found", attempt.exam_id)))?;

        let now = self.clock.now();
        if self.is_overdue(&exam, &attempt) {
            attempt.status = AttemptStatus::Expired;
            attempt.submitted_at = Some(now);
            attempt.evaluated_at = Some(now);
            if !self.store.finalize_attempt(&attempt).await? {
                // The sweep got there first; the outcome is the same.
                tracing::debug!("Attempt {} was expired concurrently", attempt_id);
            }
            return Err(ExamError::AttemptExpired(format!(
                "attempt {} exceeded the {} minute time limit",
                attempt_id,
                exam.time_limit_minutes.unwrap_or_default()
            )));
        }

        // One answer per question; a resubmitted question id keeps the
        // last selection.
        let mut by_question: HashMap<i64, i64> = HashMap::new();
        for answer in answers {
            by_question.insert(answer.question_id, answer.selected_option_id);
        }
        let mut rows: Vec<AttemptAnswer> = by_question
            .iter()
            .map(|(&question_id, &selected_option_id)| AttemptAnswer {
                attempt_id,
                question_id,
                selected_option_id,
            })
            .collect();
        rows.sort_by_key(|a| a.question_id);
        self.store.insert_answers(&rows).await?;

        // Score against the authoritative answer key of the whole exam,
        // not just the questions the learner answered.
        let keys = self.store.option_keys(attempt.exam_id).await?;
        let question_ids: HashSet<i64> = keys.iter().map(|k| k.question_id).collect();
        let correct_option_ids: HashSet<i64> =
            keys.iter().filter(|k| k.is_correct).map(|k| k.id).collect();

        let total_questions = question_ids.len() as u32;
        let correct_answers = rows
            .iter()
            .filter(|a| correct_option_ids.contains(&a.selected_option_id))
            .count() as u32;
        let score = score_percentage(correct_answers, total_questions);

        attempt.status = AttemptStatus::Evaluated;
        attempt.submitted_at = Some(now);
        attempt.evaluated_at = Some(now);
        attempt.total_questions = total_questions;
        attempt.correct_answers = correct_answers;
        attempt.score_percentage = score;
        attempt.passed = score >= exam.pass_percentage;

        if !self.store.finalize_attempt(&attempt).await? {
            // Lost the race against another writer (the expiry sweep).
            return Err(ExamError::InvalidState(format!(
                "attempt {} was finalized concurrently",
                attempt_id
            )));
        }

        tracing::info!(
            "Evaluated attempt {}: {}/{} correct, score {}, passed={}",
            attempt_id,
            correct_answers,
            total_questions,
            score,
            attempt.passed
        );

        if attempt.passed {
            self.completions
                .record_completion(exam.course_id, user_id, attempt_id)
                .await?;
        }

        Ok(attempt)
    }

    /// Periodic sweep over all in-progress attempts; expires those past
    /// their exam's time limit and returns how many were transitioned.
    ///
    /// Expiry is a derived state: nothing fires at the deadline itself, an
    /// attempt stays IN_PROGRESS until this sweep or a submission touches
    /// it. A lost conditional write here just means the submission path
    /// finalized the attempt first, and is skipped.
    pub async fn expire_timed_out_attempts(&self) -> Result<usize, ExamError> {
        let in_progress = self
            .store
            .attempts_by_status(AttemptStatus::InProgress)
            .await?;

        let mut expired = 0;
        for mut attempt in in_progress {
            let Some(exam) = self.store.exam_by_id(attempt.exam_id).await? else {
                tracing::warn!(
                    "Attempt {} references missing exam {}",
                    attempt.id,
                    attempt.exam_id
                );
                continue;
            };
            if !self.is_overdue(&exam, &attempt) {
                continue;
            }

            let now = self.clock.now();
            attempt.status = AttemptStatus::Expired;
            attempt.submitted_at = Some(now);
            attempt.evaluated_at = Some(now);
            if self.store.finalize_attempt(&attempt).await? {
                tracing::info!("Expired attempt {} (started {})", attempt.id, attempt.started_at);
                expired += 1;
            }
        }
        Ok(expired)
    }

    /// True when the exam has a time limit and the attempt has outlived it.
    fn is_overdue(&self, exam: &ExamConfig, attempt: &ExamAttempt) -> bool {
        match exam.time_limit_minutes {
            Some(limit) => {
                self.clock.now() - attempt.started_at > Duration::minutes(limit)
            }
            None => false,
        }
    }
}
