// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use crate::error::ExamError;
use crate::models::attempt::{AttemptAnswer, AttemptStatus, ExamAttempt};
use crate::models::exam::{ExamConfig, ExamQuestionRef, ExamStatus, NewExam, OptionKey};
use crate::models::question::{Difficulty, Question, QuestionBank};
use crate::store::{CompletionSink, ExamStore};

/// Postgres-backed `ExamStore`.
///
/// Uses the runtime query API so the crate builds without a live database;
/// the schema lives under `migrations/`. Status transitions are plain
/// conditional UPDATEs (`... WHERE status = 'IN_PROGRESS'`), which gives
/// the optimistic-concurrency behavior the lifecycle manager relies on
/// even when the sweep runs in a different process.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn decode_exam(row: &PgRow) -> Result<ExamConfig, ExamError> {
    let status: String = row.try_get("status")?;
    let status = ExamStatus::parse(&status)
        .ok_or_else(|| ExamError::Storage(format!("unknown exam status '{}'", status)))?;
    Ok(ExamConfig {
        id: row.try_get("id")?,
        course_id: row.try_get("course_id")?,
        status,
        pass_percentage: row.try_get::<i32, _>("pass_percentage")? as u32,
        max_attempts: row.try_get::<Option<i32>, _>("max_attempts")?.map(|v| v as u32),
        time_limit_minutes: row.try_get("time_limit_minutes")?,
        shuffle_questions: row.try_get("shuffle_questions")?,
        shuffle_options: row.try_get("shuffle_options")?,
        created_at: row.try_get("created_at")?,
    })
}

fn decode_attempt(row: &PgRow) -> Result<ExamAttempt, ExamError> {
    let status: String = row.try_get("status")?;
    let status = AttemptStatus::parse(&status)
        .ok_or_else(|| ExamError::Storage(format!("unknown attempt status '{}'", status)))?;
    let question_order: Json<Vec<i64>> = row.try_get("question_order")?;
    Ok(ExamAttempt {
        id: row.try_get("id")?,
        exam_id: row.try_get("exam_id")?,
        user_id: row.try_get("user_id")?,
        status,
        started_at: row.try_get("started_at")?,
        submitted_at: row.try_get("submitted_at")?,
        evaluated_at: row.try_get("evaluated_at")?,
        total_questions: row.try_get::<i32, _>("total_questions")? as u32,
        correct_answers: row.try_get::<i32, _>("correct_answers")? as u32,
        score_percentage: row.try_get::<i32, _>("score_percentage")? as u32,
        passed: row.try_get("passed")?,
        question_order: question_order.0,
    })
}

const ATTEMPT_COLUMNS: &str = "id, exam_id, user_id, status, started_at, submitted_at, \
     evaluated_at, total_questions, correct_answers, score_percentage, passed, question_order";

#[async_trait]
impl ExamStore for PostgresStore {
    async fn insert_exam(&self, exam: &NewExam) -> Result<ExamConfig, ExamError> {
        let row = sqlx::query(
            r#"
            INSERT INTO exams
                (course_id, pass_percentage, max_attempts, time_limit_minutes,
                 shuffle_questions, shuffle_options)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, course_id, status, pass_percentage, max_attempts,
                      time_limit_minutes, shuffle_questions, shuffle_options, created_at
            "#,
        )
        .bind(exam.course_id)
        .bind(exam.pass_percentage as i32)
        .bind(exam.max_attempts.map(|v| v as i32))
        .bind(exam.time_limit_minutes)
        .bind(exam.shuffle_questions)
        .bind(exam.shuffle_options)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // exams.course_id is UNIQUE: one exam per course
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return ExamError::Conflict(format!(
                        "course {} already has an exam",
                        exam.course_id
                    ));
                }
            }
            ExamError::from(e)
        })?;
        decode_exam(&row)
    }

    async fn exam_by_id(&self, exam_id: i64) -> Result<Option<ExamConfig>, ExamError> {
        let row = sqlx::query(
            r#"
            SELECT id, course_id, status, pass_percentage, max_attempts,
                   time_limit_minutes, shuffle_questions, shuffle_options, created_at
            FROM exams
            WHERE id = $1
            "#,
        )
        .bind(exam_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(decode_exam).transpose()
    }

    async fn update_exam_status(
        &self,
        exam_id: i64,
        from: ExamStatus,
        to: ExamStatus,
    ) -> Result<bool, ExamError> {
        let result = sqlx::query("UPDATE exams SET status = $3 WHERE id = $1 AND status = $2")
            .bind(exam_id)
            .bind(from.as_str())
            .bind(to.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn questions_ordered(&self, exam_id: i64) -> Result<Vec<ExamQuestionRef>, ExamError> {
        let rows = sqlx::query(
            r#"
            SELECT id, display_order
            FROM exam_questions
            WHERE exam_id = $1
            ORDER BY display_order
            "#,
        )
        .bind(exam_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|row| {
                Ok(ExamQuestionRef {
                    id: row.try_get("id")?,
                    display_order: row.try_get("display_order")?,
                })
            })
            .collect()
    }

    async fn option_keys(&self, exam_id: i64) -> Result<Vec<OptionKey>, ExamError> {
        let rows = sqlx::query(
            r#"
            SELECT o.id, o.question_id, o.is_correct
            FROM exam_options o
            JOIN exam_questions q ON q.id = o.question_id
            WHERE q.exam_id = $1
            "#,
        )
        .bind(exam_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|row| {
                Ok(OptionKey {
                    id: row.try_get("id")?,
                    question_id: row.try_get("question_id")?,
                    is_correct: row.try_get("is_correct")?,
                })
            })
            .collect()
    }

    async fn question_bank(&self, course_id: i64) -> Result<QuestionBank, ExamError> {
        let rows = sqlx::query(
            r#"
            SELECT id, topic, difficulty
            FROM questions
            WHERE course_id = $1
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        let questions = rows
            .iter()
            .map(|row| {
                let difficulty: String = row.try_get("difficulty")?;
                let difficulty = Difficulty::parse(&difficulty).ok_or_else(|| {
                    ExamError::Storage(format!("unknown difficulty '{}'", difficulty))
                })?;
                Ok(Question {
                    id: row.try_get("id")?,
                    topic: row.try_get("topic")?,
                    difficulty,
                })
            })
            .collect::<Result<Vec<Question>, ExamError>>()?;
        Ok(QuestionBank::new(Some(course_id), questions))
    }

    async fn insert_attempt(&self, attempt: &ExamAttempt) -> Result<i64, ExamError> {
        let row = sqlx::query(
            r#"
            INSERT INTO exam_attempts
                (exam_id, user_id, status, started_at, total_questions,
                 correct_answers, score_percentage, passed, question_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(attempt.exam_id)
        .bind(attempt.user_id)
        .bind(attempt.status.as_str())
        .bind(attempt.started_at)
        .bind(attempt.total_questions as i32)
        .bind(attempt.correct_answers as i32)
        .bind(attempt.score_percentage as i32)
        .bind(attempt.passed)
        .bind(Json(attempt.question_order.clone()))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("id")?)
    }

    async fn attempt_by_id(&self, attempt_id: i64) -> Result<Option<ExamAttempt>, ExamError> {
        let sql = format!("SELECT {} FROM exam_attempts WHERE id = $1", ATTEMPT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(attempt_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(decode_attempt).transpose()
    }

    async fn attempts_by_status(
        &self,
        status: AttemptStatus,
    ) -> Result<Vec<ExamAttempt>, ExamError> {
        let sql = format!(
            "SELECT {} FROM exam_attempts WHERE status = $1 ORDER BY id",
            ATTEMPT_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(decode_attempt).collect()
    }

    async fn count_attempts(&self, exam_id: i64, user_id: i64) -> Result<u32, ExamError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM exam_attempts WHERE exam_id = $1 AND user_id = $2",
        )
        .bind(exam_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        let n: i64 = row.try_get("n")?;
        Ok(n as u32)
    }

    async fn insert_answers(&self, answers: &[AttemptAnswer]) -> Result<(), ExamError> {
        let mut tx = self.pool.begin().await?;
        for answer in answers {
            sqlx::query(
                r#"
                INSERT INTO exam_attempt_answers (attempt_id, question_id, selected_option_id)
                VALUES ($1, $2, $3)
                ON CONFLICT (attempt_id, question_id) DO NOTHING
                "#,
            )
            .bind(answer.attempt_id)
            .bind(answer.question_id)
            .bind(answer.selected_option_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn answers_for_attempt(
        &self,
        attempt_id: i64,
    ) -> Result<Vec<AttemptAnswer>, ExamError> {
        let rows = sqlx::query(
            r#"
            SELECT attempt_id, question_id, selected_option_id
            FROM exam_attempt_answers
            WHERE attempt_id = $1
            ORDER BY question_id
            "#,
        )
        .bind(attempt_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|row| {
                Ok(AttemptAnswer {
                    attempt_id: row.try_get("attempt_id")?,
                    question_id: row.try_get("question_id")?,
                    selected_option_id: row.try_get("selected_option_id")?,
                })
            })
            .collect()
    }

    async fn finalize_attempt(&self, attempt: &ExamAttempt) -> Result<bool, ExamError> {
        let result = sqlx::query(
            r#"
            UPDATE exam_attempts
            SET status = $2,
                submitted_at = $3,
                evaluated_at = $4,
                total_questions = $5,
                correct_answers = $6,
                score_percentage = $7,
                passed = $8
            WHERE id = $1 AND status = 'IN_PROGRESS'
            "#,
        )
        .bind(attempt.id)
        .bind(attempt.status.as_str())
        .bind(attempt.submitted_at)
        .bind(attempt.evaluated_at)
        .bind(attempt.total_questions as i32)
        .bind(attempt.correct_answers as i32)
        .bind(attempt.score_percentage as i32)
        .bind(attempt.passed)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

/// Completion sink writing to `course_completions`. Idempotent against
/// duplicate facts: the primary key is (course_id, user_id) and replays
/// are dropped with ON CONFLICT DO NOTHING.
#[async_trait]
impl CompletionSink for PostgresStore {
    async fn record_completion(
        &self,
        course_id: i64,
        user_id: i64,
        attempt_id: i64,
    ) -> Result<(), ExamError> {
        sqlx::query(
            r#"
            INSERT INTO course_completions (course_id, user_id, attempt_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (course_id, user_id) DO NOTHING
            "#,
        )
        .bind(course_id)
        .bind(user_id)
        .bind(attempt_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
