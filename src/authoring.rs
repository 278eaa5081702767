// src/authoring.rs

use std::sync::Arc;

use validator::Validate;

use crate::engine;
use crate::error::ExamError;
use crate::models::blueprint::{ExamBlueprint, FeasibilityReport};
use crate::models::exam::{ExamConfig, ExamStatus, NewExam};
use crate::models::question::{Question, QuestionBank};
use crate::store::ExamStore;

/// Administrator-facing exam configuration lifecycle: DRAFT on creation,
/// then one-way transitions to PUBLISHED or ARCHIVED. No other entity
/// mutates an exam configuration.
pub struct ExamAuthoring {
    store: Arc<dyn ExamStore>,
}

impl ExamAuthoring {
    pub fn new(store: Arc<dyn ExamStore>) -> Self {
        Self { store }
    }

    /// Creates a DRAFT exam. One exam per course: a second creation for
    /// the same course fails with `Conflict`.
    pub async fn create_exam(&self, exam: NewExam) -> Result<ExamConfig, ExamError> {
        exam.validate()?;
        let created = self.store.insert_exam(&exam).await?;
        tracing::info!("Created exam {} for course {}", created.id, created.course_id);
        Ok(created)
    }

    /// Publishes a DRAFT exam.
    ///
    /// When a blueprint is supplied, it is evaluated against the course's
    /// question bank first; an infeasible blueprint blocks publication
    /// unless the blueprint's `allow_publish_on_validation_failure` escape
    /// hatch is set. Publishing an infeasible exam silently is treated as
    /// a policy violation, not a tolerated state.
    pub async fn publish_exam(
        &self,
        exam_id: i64,
        blueprint: Option<&ExamBlueprint>,
    ) -> Result<ExamConfig, ExamError> {
        let exam = self
            .store
            .exam_by_id(exam_id)
            .await?
            .ok_or_else(|| ExamError::NotFound(format!("exam {} not found", exam_id)))?;
        if exam.status != ExamStatus::Draft {
            return Err(ExamError::InvalidState(format!(
                "exam {} is {}, only DRAFT exams can be published",
                exam_id,
                exam.status.as_str()
            )));
        }

        if let Some(blueprint) = blueprint {
            blueprint.validate()?;
            let bank = self.store.question_bank(exam.course_id).await?;
            let report = engine::evaluate(blueprint, &bank);
            if report.has_errors() {
                if !blueprint.allow_publish_on_validation_failure {
                    return Err(ExamError::InvalidState(format!(
                        "exam {} blueprint is infeasible: {}",
                        exam_id,
                        report.codes()
                    )));
                }
                tracing::warn!(
                    "Publishing exam {} despite infeasible blueprint: {}",
                    exam_id,
                    report.codes()
                );
            }
        }

        if !self
            .store
            .update_exam_status(exam_id, ExamStatus::Draft, ExamStatus::Published)
            .await?
        {
            return Err(ExamError::InvalidState(format!(
                "exam {} changed status concurrently",
                exam_id
            )));
        }
        tracing::info!("Published exam {}", exam_id);
        Ok(ExamConfig {
            status: ExamStatus::Published,
            ..exam
        })
    }

    /// Archives a DRAFT or PUBLISHED exam. One-way; archived exams stay
    /// archived.
    pub async fn archive_exam(&self, exam_id: i64) -> Result<ExamConfig, ExamError> {
        let exam = self
            .store
            .exam_by_id(exam_id)
            .await?
            .ok_or_else(|| ExamError::NotFound(format!("exam {} not found", exam_id)))?;
        if exam.status == ExamStatus::Archived {
            return Err(ExamError::InvalidState(format!(
                "exam {} is already ARCHIVED",
                exam_id
            )));
        }

        if !self
            .store
            .update_exam_status(exam_id, exam.status, ExamStatus::Archived)
            .await?
        {
            return Err(ExamError::InvalidState(format!(
                "exam {} changed status concurrently",
                exam_id
            )));
        }
        tracing::info!("Archived exam {}", exam_id);
        Ok(ExamConfig {
            status: ExamStatus::Archived,
            ..exam
        })
    }

    /// Evaluates a blueprint against a course's bank without selecting.
    /// Infeasibility is a normal outcome during authoring, so the report
    /// is returned as a value for the caller to inspect.
    pub async fn check_blueprint(
        &self,
        blueprint: &ExamBlueprint,
        course_id: i64,
    ) -> Result<FeasibilityReport, ExamError> {
        blueprint.validate()?;
        let bank = self.store.question_bank(course_id).await?;
        Ok(engine::evaluate(blueprint, &bank))
    }

    /// Derives the ordered question set a blueprint would produce, for
    /// authoring-time paper generation. Under `strict` a selection shorter
    /// than `total_questions` is infeasible and rejected instead of being
    /// silently padded.
    pub fn plan_questions(
        &self,
        blueprint: &ExamBlueprint,
        bank: &QuestionBank,
    ) -> Result<Vec<Question>, ExamError> {
        blueprint.validate()?;
        let selection = engine::select(blueprint, bank);
        if blueprint.strict && selection.len() < blueprint.total_questions as usize {
            return Err(ExamError::InvalidState(format!(
                "strict blueprint wants {} questions, bank can only satisfy {}",
                blueprint.total_questions,
                selection.len()
            )));
        }
        Ok(selection)
    }
}
