// src/models/attempt.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of an exam attempt. EVALUATED and EXPIRED are terminal; no
/// transition ever leaves a terminal state. The persisted status value is
/// also the concurrency token: every transition out of IN_PROGRESS is a
/// conditional update keyed on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptStatus {
    InProgress,
    Submitted,
    Evaluated,
    Expired,
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::InProgress => "IN_PROGRESS",
            AttemptStatus::Submitted => "SUBMITTED",
            AttemptStatus::Evaluated => "EVALUATED",
            AttemptStatus::Expired => "EXPIRED",
        }
    }

    pub fn parse(s: &str) -> Option<AttemptStatus> {
        match s {
            "IN_PROGRESS" => Some(AttemptStatus::InProgress),
            "SUBMITTED" => Some(AttemptStatus::Submitted),
            "EVALUATED" => Some(AttemptStatus::Evaluated),
            "EXPIRED" => Some(AttemptStatus::Expired),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptStatus::Evaluated | AttemptStatus::Expired)
    }
}

/// One learner's timed pass through an exam, from start to terminal state.
///
/// `question_order` is frozen at creation (shuffled or not) and never
/// recomputed, so the learner's sequence is stable across page reloads
/// within one attempt. Attempts are never deleted (audit trail).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamAttempt {
    pub id: i64,
    pub exam_id: i64,
    pub user_id: i64,
    pub status: AttemptStatus,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub evaluated_at: Option<DateTime<Utc>>,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub score_percentage: u32,
    pub passed: bool,
    pub question_order: Vec<i64>,
}

/// A persisted answer row: one per question per attempt, append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptAnswer {
    pub attempt_id: i64,
    pub question_id: i64,
    pub selected_option_id: i64,
}

/// DTO for a single submitted answer.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: i64,
    pub selected_option_id: i64,
}
