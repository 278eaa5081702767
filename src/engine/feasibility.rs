// src/engine/feasibility.rs

use std::collections::HashMap;

use crate::models::blueprint::{
    COURSE_MISMATCH, DIFFICULTY_SHORTAGE, ExamBlueprint, FeasibilityReport,
    INSUFFICIENT_QUESTIONS, TOPIC_SHORTAGE,
};
use crate::models::question::{Difficulty, QuestionBank};

/// Answers "can this blueprint ever be satisfied by this bank", without
/// selecting anything. Independent of the selector.
///
/// All rules are checked independently; only a course mismatch
/// short-circuits, since no other check is meaningful against the wrong
/// bank. Shortage codes are recorded once per short difficulty/topic.
pub fn evaluate(blueprint: &ExamBlueprint, bank: &QuestionBank) -> FeasibilityReport {
    let mut report = FeasibilityReport::default();

    if let (Some(wanted), Some(actual)) = (blueprint.course_id, bank.course_id) {
        if wanted != actual {
            report.record(
                COURSE_MISMATCH,
                format!("blueprint targets course {} but bank holds course {}", wanted, actual),
            );
            return report;
        }
    }

    if bank.len() < blueprint.total_questions as usize {
        report.record(
            INSUFFICIENT_QUESTIONS,
            format!(
                "bank has {} questions, blueprint requires {}",
                bank.len(),
                blueprint.total_questions
            ),
        );
    }

    if let Some(by_difficulty) = &blueprint.difficulty_distribution {
        let mut available: HashMap<Difficulty, u32> = HashMap::new();
        for q in &bank.questions {
            *available.entry(q.difficulty).or_insert(0) += 1;
        }
        for (difficulty, required) in by_difficulty {
            let have = available.get(difficulty).copied().unwrap_or(0);
            if have < *required {
                report.record(
                    format!("{}.{}", DIFFICULTY_SHORTAGE, difficulty),
                    format!("need {} {} questions, bank has {}", required, difficulty, have),
                );
            }
        }
    }

    if let Some(by_topic) = &blueprint.topic_distribution {
        let mut available: HashMap<&str, u32> = HashMap::new();
        for q in &bank.questions {
            *available.entry(q.topic.as_str()).or_insert(0) += 1;
        }
        for (topic, required) in by_topic {
            let have = available.get(topic.as_str()).copied().unwrap_or(0);
            if have < *required {
                report.record(
                    format!("{}.{}", TOPIC_SHORTAGE, topic),
                    format!("need {} questions on '{}', bank has {}", required, topic, have),
                );
            }
        }
    }

    report
}
