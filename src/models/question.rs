// src/models/question.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Question difficulty. Derived `Ord` gives the ascending order
/// Easy < Medium < Hard that the selector's pool sort relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }

    pub fn parse(s: &str) -> Option<Difficulty> {
        match s {
            "EASY" => Some(Difficulty::Easy),
            "MEDIUM" => Some(Difficulty::Medium),
            "HARD" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authored question as seen by the selection engine: identity, topic
/// and difficulty only. Immutable once authored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub topic: String,
    pub difficulty: Difficulty,
}

/// A course-scoped, unordered collection of questions.
///
/// Built fresh per evaluation/selection call; the engine only reads it and
/// never mutates it.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    pub course_id: Option<i64>,
    pub questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(course_id: Option<i64>, questions: Vec<Question>) -> Self {
        Self { course_id, questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
