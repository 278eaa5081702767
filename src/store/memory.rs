// src/store/memory.rs

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ExamError;
use crate::models::attempt::{AttemptAnswer, AttemptStatus, ExamAttempt};
use crate::models::exam::{
    ExamConfig, ExamOption, ExamQuestion, ExamQuestionRef, ExamStatus, NewExam, OptionKey,
};
use crate::models::question::{Difficulty, Question, QuestionBank};
use crate::store::{CompletionSink, ExamStore};

/// In-memory `ExamStore`, used by the integration tests and for local
/// development without Postgres. Mirrors the conditional-update semantics
/// of the SQL adapter: transitions check the stored status under one lock,
/// so a losing writer observes `false` exactly as it would observe zero
/// rows affected.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    bank_questions: Vec<Question>,
    bank_courses: HashMap<i64, i64>, // question id -> course id
    exams: HashMap<i64, ExamConfig>,
    exam_questions: Vec<ExamQuestion>,
    exam_options: Vec<ExamOption>,
    attempts: HashMap<i64, ExamAttempt>,
    answers: Vec<AttemptAnswer>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a bank question for a course; returns its id.
    pub fn add_bank_question(&self, course_id: i64, topic: &str, difficulty: Difficulty) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.bank_questions.push(Question {
            id,
            topic: topic.to_string(),
            difficulty,
        });
        inner.bank_courses.insert(id, course_id);
        id
    }

    /// Seeds an authored exam question; returns its id.
    pub fn add_exam_question(&self, exam_id: i64, text: &str, display_order: i32) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.exam_questions.push(ExamQuestion {
            id,
            exam_id,
            text: text.to_string(),
            display_order,
            explanation: None,
        });
        id
    }

    /// Seeds an option on an exam question; returns its id.
    pub fn add_option(&self, question_id: i64, text: &str, display_order: i32, is_correct: bool) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.exam_options.push(ExamOption {
            id,
            question_id,
            text: text.to_string(),
            display_order,
            is_correct,
        });
        id
    }
}

#[async_trait]
impl ExamStore for MemoryStore {
    async fn insert_exam(&self, exam: &NewExam) -> Result<ExamConfig, ExamError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.exams.values().any(|e| e.course_id == exam.course_id) {
            return Err(ExamError::Conflict(format!(
                "course {} already has an exam",
                exam.course_id
            )));
        }
        let id = inner.next_id();
        let config = ExamConfig {
            id,
            course_id: exam.course_id,
            status: ExamStatus::Draft,
            pass_percentage: exam.pass_percentage,
            max_attempts: exam.max_attempts,
            time_limit_minutes: exam.time_limit_minutes,
            shuffle_questions: exam.shuffle_questions,
            shuffle_options: exam.shuffle_options,
            created_at: None,
        };
        inner.exams.insert(id, config.clone());
        Ok(config)
    }

    async fn exam_by_id(&self, exam_id: i64) -> Result<Option<ExamConfig>, ExamError> {
        Ok(self.inner.lock().unwrap().exams.get(&exam_id).cloned())
    }

    async fn update_exam_status(
        &self,
        exam_id: i64,
        from: ExamStatus,
        to: ExamStatus,
    ) -> Result<bool, ExamError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.exams.get_mut(&exam_id) {
            Some(exam) if exam.status == from => {
                exam.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn questions_ordered(&self, exam_id: i64) -> Result<Vec<ExamQuestionRef>, ExamError> {
        let inner = self.inner.lock().unwrap();
        let mut refs: Vec<ExamQuestionRef> = inner
            .exam_questions
            .iter()
            .filter(|q| q.exam_id == exam_id)
            .map(|q| ExamQuestionRef {
                id: q.id,
                display_order: q.display_order,
            })
            .collect();
        refs.sort_by_key(|r| r.display_order);
        Ok(refs)
    }

    async fn option_keys(&self, exam_id: i64) -> Result<Vec<OptionKey>, ExamError> {
        let inner = self.inner.lock().unwrap();
        let keys = inner
            .exam_options
            .iter()
            .filter(|o| {
                inner
                    .exam_questions
                    .iter()
                    .any(|q| q.id == o.question_id && q.exam_id == exam_id)
            })
            .map(|o| OptionKey {
                id: o.id,
                question_id: o.question_id,
                is_correct: o.is_correct,
            })
            .collect();
        Ok(keys)
    }

    async fn question_bank(&self, course_id: i64) -> Result<QuestionBank, ExamError> {
        let inner = self.inner.lock().unwrap();
        let questions = inner
            .bank_questions
            .iter()
            .filter(|q| inner.bank_courses.get(&q.id) == Some(&course_id))
            .cloned()
            .collect();
        Ok(QuestionBank::new(Some(course_id), questions))
    }

    async fn insert_attempt(&self, attempt: &ExamAttempt) -> Result<i64, ExamError> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let mut stored = attempt.clone();
        stored.id = id;
        inner.attempts.insert(id, stored);
        Ok(id)
    }

    async fn attempt_by_id(&self, attempt_id: i64) -> Result<Option<ExamAttempt>, ExamError> {
        Ok(self.inner.lock().unwrap().attempts.get(&attempt_id).cloned())
    }

    async fn attempts_by_status(
        &self,
        status: AttemptStatus,
    ) -> Result<Vec<ExamAttempt>, ExamError> {
        let inner = self.inner.lock().unwrap();
        let mut attempts: Vec<ExamAttempt> = inner
            .attempts
            .values()
            .filter(|a| a.status == status)
            .cloned()
            .collect();
        attempts.sort_by_key(|a| a.id);
        Ok(attempts)
    }

    async fn count_attempts(&self, exam_id: i64, user_id: i64) -> Result<u32, ExamError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .attempts
            .values()
            .filter(|a| a.exam_id == exam_id && a.user_id == user_id)
            .count() as u32)
    }

    async fn insert_answers(&self, answers: &[AttemptAnswer]) -> Result<(), ExamError> {
        let mut inner = self.inner.lock().unwrap();
        inner.answers.extend_from_slice(answers);
        Ok(())
    }

    async fn answers_for_attempt(
        &self,
        attempt_id: i64,
    ) -> Result<Vec<AttemptAnswer>, ExamError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .answers
            .iter()
            .filter(|a| a.attempt_id == attempt_id)
            .cloned()
            .collect())
    }

    async fn finalize_attempt(&self, attempt: &ExamAttempt) -> Result<bool, ExamError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.attempts.get_mut(&attempt.id) {
            Some(stored) if stored.status == AttemptStatus::InProgress => {
                *stored = attempt.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Records completion facts in memory so tests can assert on delivery.
#[derive(Debug, Default)]
pub struct MemoryCompletionLog {
    facts: Mutex<Vec<(i64, i64, i64)>>,
}

impl MemoryCompletionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// (course_id, user_id, attempt_id) triples, in delivery order.
    pub fn facts(&self) -> Vec<(i64, i64, i64)> {
        self.facts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionSink for MemoryCompletionLog {
    async fn record_completion(
        &self,
        course_id: i64,
        user_id: i64,
        attempt_id: i64,
    ) -> Result<(), ExamError> {
        self.facts.lock().unwrap().push((course_id, user_id, attempt_id));
        Ok(())
    }
}
