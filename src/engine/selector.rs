// src/engine/selector.rs

use std::collections::HashSet;

use crate::models::blueprint::ExamBlueprint;
use crate::models::question::{Question, QuestionBank};

/// Deterministically selects an ordered subset of `bank` satisfying the
/// blueprint as far as the pool allows.
///
/// The same bank and blueprint always produce byte-identical output: the
/// pool is first put into a total order (topic asc, difficulty asc, id
/// rendered as a string asc) and every later phase walks that order. The
/// same selection can therefore be re-derived for audit or regeneration.
///
/// Phases, in output order:
/// 1. per-topic quotas, in the topic map's iteration order;
/// 2. per-difficulty quotas, until `total_questions` is reached;
/// 3. if not strict, fill from the remaining pool.
///
/// Pure function of its inputs; never mutates `bank`. Under `strict` a
/// result shorter than `total_questions` is returned as-is and the caller
/// treats it as infeasible.
pub fn select(blueprint: &ExamBlueprint, bank: &QuestionBank) -> Vec<Question> {
    let mut pool: Vec<&Question> = bank.questions.iter().collect();
    pool.sort_by(|a, b| {
        a.topic
            .cmp(&b.topic)
            .then(a.difficulty.cmp(&b.difficulty))
            .then_with(|| a.id.to_string().cmp(&b.id.to_string()))
    });

    let total = blueprint.total_questions as usize;
    let mut selected: Vec<Question> = Vec::with_capacity(total.min(pool.len()));
    let mut taken: HashSet<i64> = HashSet::new();

    if let Some(by_topic) = &blueprint.topic_distribution {
        for (topic, required) in by_topic {
            let mut remaining = *required;
            for q in &pool {
                if remaining == 0 {
                    break;
                }
                if q.topic == *topic && taken.insert(q.id) {
                    selected.push((*q).clone());
                    remaining -= 1;
                }
            }
        }
    }

    if selected.len() < total {
        if let Some(by_difficulty) = &blueprint.difficulty_distribution {
            'outer: for (difficulty, required) in by_difficulty {
                let mut remaining = *required;
                for q in &pool {
                    if selected.len() >= total {
                        break 'outer;
                    }
                    if remaining == 0 {
                        break;
                    }
                    if q.difficulty == *difficulty && taken.insert(q.id) {
                        selected.push((*q).clone());
                        remaining -= 1;
                    }
                }
            }
        }
    }

    if !blueprint.strict && selected.len() < total {
        for q in &pool {
            if selected.len() >= total {
                break;
            }
            if taken.insert(q.id) {
                selected.push((*q).clone());
            }
        }
    }

    selected
}
