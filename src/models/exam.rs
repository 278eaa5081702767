// src/models/exam.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Lifecycle status of a published exam definition. Created DRAFT;
/// transitions to PUBLISHED or ARCHIVED are one-way administrator steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExamStatus {
    Draft,
    Published,
    Archived,
}

impl ExamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamStatus::Draft => "DRAFT",
            ExamStatus::Published => "PUBLISHED",
            ExamStatus::Archived => "ARCHIVED",
        }
    }

    pub fn parse(s: &str) -> Option<ExamStatus> {
        match s {
            "DRAFT" => Some(ExamStatus::Draft),
            "PUBLISHED" => Some(ExamStatus::Published),
            "ARCHIVED" => Some(ExamStatus::Archived),
            _ => None,
        }
    }
}

/// The published, versioned exam definition. One per course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamConfig {
    pub id: i64,
    pub course_id: i64,
    pub status: ExamStatus,
    pub pass_percentage: u32,
    pub max_attempts: Option<u32>,
    pub time_limit_minutes: Option<i64>,
    pub shuffle_questions: bool,
    pub shuffle_options: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a new exam configuration.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewExam {
    pub course_id: i64,
    #[validate(range(max = 100))]
    pub pass_percentage: u32,
    #[validate(range(min = 1))]
    pub max_attempts: Option<u32>,
    #[validate(range(min = 1))]
    pub time_limit_minutes: Option<i64>,
    pub shuffle_questions: bool,
    pub shuffle_options: bool,
}

/// An authored exam question. Read-only during attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamQuestion {
    pub id: i64,
    pub exam_id: i64,
    pub text: String,
    pub display_order: i32,
    pub explanation: Option<String>,
}

/// One answer option of an exam question. Exactly one per question is
/// marked correct in the current design (multi-correct is an extension
/// point the scoring already tolerates).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamOption {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub display_order: i32,
    pub is_correct: bool,
}

/// Slim projection used when freezing an attempt's question order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamQuestionRef {
    pub id: i64,
    pub display_order: i32,
}

/// Slim projection of an option's answer key, fetched when scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionKey {
    pub id: i64,
    pub question_id: i64,
    pub is_correct: bool,
}
