// src/models/blueprint.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use crate::models::question::Difficulty;

/// Declarative constraints describing what an exam paper must contain.
///
/// The distribution maps are `BTreeMap`s so their iteration order is
/// deterministic; the selector walks them in that order.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExamBlueprint {
    /// Optional course binding; checked against the bank's course.
    pub course_id: Option<i64>,

    #[validate(range(min = 1))]
    pub total_questions: u32,

    #[validate(range(max = 100))]
    pub pass_percentage: u32,

    /// difficulty -> required count
    pub difficulty_distribution: Option<BTreeMap<Difficulty, u32>>,

    /// topic -> required count
    pub topic_distribution: Option<BTreeMap<String, u32>>,

    /// When true the selection must yield exactly `total_questions`;
    /// a shorter result is treated as infeasible by the caller.
    pub strict: bool,

    /// Escape hatch: allow publishing an exam even when the blueprint
    /// evaluation reports errors.
    pub allow_publish_on_validation_failure: bool,
}

impl ExamBlueprint {
    pub fn new(total_questions: u32, pass_percentage: u32) -> Self {
        Self {
            course_id: None,
            total_questions,
            pass_percentage,
            difficulty_distribution: None,
            topic_distribution: None,
            strict: false,
            allow_publish_on_validation_failure: false,
        }
    }
}

/// Error codes recorded by the feasibility evaluator. Shortage codes are
/// suffixed with the short difficulty or topic, e.g. `DIFFICULTY_SHORTAGE.HARD`.
pub const COURSE_MISMATCH: &str = "COURSE_MISMATCH";
pub const INSUFFICIENT_QUESTIONS: &str = "INSUFFICIENT_QUESTIONS";
pub const DIFFICULTY_SHORTAGE: &str = "DIFFICULTY_SHORTAGE";
pub const TOPIC_SHORTAGE: &str = "TOPIC_SHORTAGE";

/// Result of a feasibility evaluation: code -> human-readable message.
///
/// Infeasibility is an expected outcome during blueprint authoring, so this
/// is a value the caller inspects, never an `Err`. There is no ordering or
/// severity concept; any entry means "blueprint infeasible".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeasibilityReport {
    pub errors: BTreeMap<String, String>,
}

impl FeasibilityReport {
    pub fn record(&mut self, code: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(code.into(), message.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// True if `code` was recorded, either exactly or with a `.subject`
    /// suffix (shortage codes carry the short difficulty/topic).
    pub fn has(&self, code: &str) -> bool {
        let prefix = format!("{}.", code);
        self.errors
            .keys()
            .any(|k| k == code || k.starts_with(&prefix))
    }

    /// Codes joined for log/error messages, in key order.
    pub fn codes(&self) -> String {
        self.errors.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
