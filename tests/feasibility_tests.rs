// tests/feasibility_tests.rs

use std::collections::BTreeMap;

use exam_engine::engine::evaluate;
use exam_engine::models::blueprint::{
    COURSE_MISMATCH, DIFFICULTY_SHORTAGE, ExamBlueprint, INSUFFICIENT_QUESTIONS, TOPIC_SHORTAGE,
};
use exam_engine::models::question::{Difficulty, Question, QuestionBank};

fn q(id: i64, topic: &str, difficulty: Difficulty) -> Question {
    Question {
        id,
        topic: topic.to_string(),
        difficulty,
    }
}

#[test]
fn detects_difficulty_shortage() {
    let bank = QuestionBank::new(
        None,
        vec![
            q(1, "traits", Difficulty::Easy),
            q(2, "traits", Difficulty::Medium),
        ],
    );
    let mut bp = ExamBlueprint::new(2, 60);
    bp.difficulty_distribution = Some(BTreeMap::from([(Difficulty::Hard, 2)]));

    let report = evaluate(&bp, &bank);
    assert!(report.has_errors());
    assert!(report.has(DIFFICULTY_SHORTAGE));
    assert!(!report.has(INSUFFICIENT_QUESTIONS));
}

#[test]
fn course_mismatch_short_circuits_all_other_checks() {
    // The bank is empty and missing every difficulty, but none of that is
    // meaningful against the wrong course.
    let bank = QuestionBank::new(Some(7), vec![]);
    let mut bp = ExamBlueprint::new(10, 60);
    bp.course_id = Some(3);
    bp.difficulty_distribution = Some(BTreeMap::from([(Difficulty::Hard, 2)]));
    bp.topic_distribution = Some(BTreeMap::from([("traits".to_string(), 4)]));

    let report = evaluate(&bp, &bank);
    assert!(report.has(COURSE_MISMATCH));
    assert_eq!(report.errors.len(), 1);
}

#[test]
fn detects_insufficient_questions() {
    let bank = QuestionBank::new(None, vec![q(1, "traits", Difficulty::Easy)]);
    let bp = ExamBlueprint::new(3, 60);

    let report = evaluate(&bp, &bank);
    assert!(report.has(INSUFFICIENT_QUESTIONS));
}

#[test]
fn records_one_error_per_short_topic() {
    let bank = QuestionBank::new(None, vec![q(1, "traits", Difficulty::Easy)]);
    let mut bp = ExamBlueprint::new(1, 60);
    bp.topic_distribution = Some(BTreeMap::from([
        ("lifetimes".to_string(), 1),
        ("ownership".to_string(), 2),
        ("traits".to_string(), 1),
    ]));

    let report = evaluate(&bp, &bank);
    assert!(report.has(TOPIC_SHORTAGE));
    assert!(report.errors.contains_key("TOPIC_SHORTAGE.lifetimes"));
    assert!(report.errors.contains_key("TOPIC_SHORTAGE.ownership"));
    assert!(!report.errors.contains_key("TOPIC_SHORTAGE.traits"));
}

#[test]
fn shortages_are_checked_independently() {
    let bank = QuestionBank::new(None, vec![q(1, "traits", Difficulty::Easy)]);
    let mut bp = ExamBlueprint::new(5, 60);
    bp.difficulty_distribution = Some(BTreeMap::from([(Difficulty::Hard, 1)]));
    bp.topic_distribution = Some(BTreeMap::from([("ownership".to_string(), 1)]));

    let report = evaluate(&bp, &bank);
    assert!(report.has(INSUFFICIENT_QUESTIONS));
    assert!(report.has(DIFFICULTY_SHORTAGE));
    assert!(report.has(TOPIC_SHORTAGE));
}

#[test]
fn feasible_blueprint_yields_an_empty_report() {
    let bank = QuestionBank::new(
        Some(7),
        vec![
            q(1, "traits", Difficulty::Easy),
            q(2, "traits", Difficulty::Hard),
            q(3, "ownership", Difficulty::Medium),
        ],
    );
    let mut bp = ExamBlueprint::new(3, 60);
    bp.course_id = Some(7);
    bp.difficulty_distribution = Some(BTreeMap::from([(Difficulty::Hard, 1)]));
    bp.topic_distribution = Some(BTreeMap::from([("traits".to_string(), 2)]));

    let report = evaluate(&bp, &bank);
    assert!(!report.has_errors());
}
