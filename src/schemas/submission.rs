use serde::Serialize;

pub(crate) use crate::core::time::format_primitive;
use crate::db::models::Submission;
use crate::db::types::QuizType;

/// Score-level view of one attempt; safe to return regardless of the quiz's
/// answer-visibility policy.
#[derive(Debug, Serialize)]
pub(crate) struct SubmissionSummary {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) module_index: i32,
    pub(crate) item_index: i32,
    pub(crate) student_id: String,
    pub(crate) attempt_number: i32,
    pub(crate) quiz_type: QuizType,
    pub(crate) started_at: String,
    pub(crate) submitted_at: String,
    pub(crate) time_spent_seconds: i64,
    pub(crate) score: f64,
    pub(crate) total_points: f64,
    pub(crate) percentage: i32,
    pub(crate) passed: bool,
}

impl SubmissionSummary {
    pub(crate) fn from_db(submission: &Submission) -> Self {
        Self {
            id: submission.id.clone(),
            course_id: submission.course_id.clone(),
            module_index: submission.module_index,
            item_index: submission.item_index,
            student_id: submission.student_id.clone(),
            attempt_number: submission.attempt_number,
            quiz_type: submission.quiz_type,
            started_at: format_primitive(submission.started_at),
            submitted_at: format_primitive(submission.submitted_at),
            time_spent_seconds: submission.time_spent_seconds,
            score: submission.score,
            total_points: submission.total_points,
            percentage: submission.percentage,
            passed: submission.passed,
        }
    }
}
