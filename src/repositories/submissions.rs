use sqlx::types::Json;
use sqlx::PgPool;
use thiserror::Error;
use time::PrimitiveDateTime;

use crate::db::models::{McqAnswerRecord, OpenEndedAnswer, Submission};
use crate::db::types::QuizType;

const COLUMNS: &str = "\
    id, course_id, module_index, item_index, student_id, attempt_number, quiz_type, \
    started_at, submitted_at, time_spent_seconds, mcq_answers, open_ended, \
    score, total_points, percentage, passed, created_at, updated_at";

/// Insert failure split out so the attempt-key race surfaces as a typed
/// conflict instead of a generic database error.
#[derive(Debug, Error)]
pub(crate) enum InsertError {
    #[error("a submission with this attempt number already exists")]
    AttemptConflict,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

pub(crate) struct CreateSubmission<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) module_index: i32,
    pub(crate) item_index: i32,
    pub(crate) student_id: &'a str,
    pub(crate) attempt_number: i32,
    pub(crate) quiz_type: QuizType,
    pub(crate) started_at: PrimitiveDateTime,
    pub(crate) submitted_at: PrimitiveDateTime,
    pub(crate) time_spent_seconds: i64,
    pub(crate) mcq_answers: Vec<McqAnswerRecord>,
    pub(crate) open_ended: Option<OpenEndedAnswer>,
    pub(crate) score: f64,
    pub(crate) total_points: f64,
    pub(crate) percentage: i32,
    pub(crate) passed: bool,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateSubmission<'_>,
) -> Result<Submission, InsertError> {
    let result = sqlx::query_as::<_, Submission>(&format!(
        "INSERT INTO submissions (
            id, course_id, module_index, item_index, student_id, attempt_number, quiz_type,
            started_at, submitted_at, time_spent_seconds, mcq_answers, open_ended,
            score, total_points, percentage, passed, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.module_index)
    .bind(params.item_index)
    .bind(params.student_id)
    .bind(params.attempt_number)
    .bind(params.quiz_type)
    .bind(params.started_at)
    .bind(params.submitted_at)
    .bind(params.time_spent_seconds)
    .bind(Json(params.mcq_answers))
    .bind(params.open_ended.map(Json))
    .bind(params.score)
    .bind(params.total_points)
    .bind(params.percentage)
    .bind(params.passed)
    .bind(params.submitted_at)
    .bind(params.submitted_at)
    .fetch_one(pool)
    .await;

    match result {
        Ok(submission) => Ok(submission),
        Err(sqlx::Error::Database(db_err))
            if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
        {
            Err(InsertError::AttemptConflict)
        }
        Err(err) => Err(InsertError::Db(err)),
    }
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!("SELECT {COLUMNS} FROM submissions WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// A student's own attempts for one quiz, most recent attempt first.
pub(crate) async fn list_for_student(
    pool: &PgPool,
    course_id: &str,
    module_index: i32,
    item_index: i32,
    student_id: &str,
) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS}
         FROM submissions
         WHERE course_id = $1 AND module_index = $2 AND item_index = $3 AND student_id = $4
         ORDER BY attempt_number DESC"
    ))
    .bind(course_id)
    .bind(module_index)
    .bind(item_index)
    .bind(student_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_for_student(
    pool: &PgPool,
    course_id: &str,
    module_index: i32,
    item_index: i32,
    student_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*)
         FROM submissions
         WHERE course_id = $1 AND module_index = $2 AND item_index = $3 AND student_id = $4",
    )
    .bind(course_id)
    .bind(module_index)
    .bind(item_index)
    .bind(student_id)
    .fetch_one(pool)
    .await
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct QueueRow {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) attempt_number: i32,
    pub(crate) quiz_type: QuizType,
    pub(crate) submitted_at: PrimitiveDateTime,
    pub(crate) open_ended: Option<Json<OpenEndedAnswer>>,
    pub(crate) score: f64,
    pub(crate) total_points: f64,
    pub(crate) percentage: i32,
    pub(crate) passed: bool,
}

/// All submissions for one quiz with the submitting student's display name,
/// newest first, for the instructor review queue.
pub(crate) async fn list_for_quiz(
    pool: &PgPool,
    course_id: &str,
    module_index: i32,
    item_index: i32,
) -> Result<Vec<QueueRow>, sqlx::Error> {
    sqlx::query_as::<_, QueueRow>(
        "SELECT s.id,
                s.student_id,
                u.display_name AS student_name,
                s.attempt_number,
                s.quiz_type,
                s.submitted_at,
                s.open_ended,
                s.score,
                s.total_points,
                s.percentage,
                s.passed
         FROM submissions s
         JOIN users u ON u.id = s.student_id
         WHERE s.course_id = $1 AND s.module_index = $2 AND s.item_index = $3
         ORDER BY s.submitted_at DESC",
    )
    .bind(course_id)
    .bind(module_index)
    .bind(item_index)
    .fetch_all(pool)
    .await
}

/// The single mutation path for an existing submission: write the manual
/// grade and mirror the derived fields. Last write wins on re-grade.
pub(crate) async fn apply_grade(
    pool: &PgPool,
    id: &str,
    open_ended: OpenEndedAnswer,
    score: f64,
    percentage: i32,
    passed: bool,
    now: PrimitiveDateTime,
) -> Result<Submission, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "UPDATE submissions
         SET open_ended = $1,
             score = $2,
             percentage = $3,
             passed = $4,
             updated_at = $5
         WHERE id = $6
         RETURNING {COLUMNS}",
    ))
    .bind(Json(open_ended))
    .bind(score)
    .bind(percentage)
    .bind(passed)
    .bind(now)
    .bind(id)
    .fetch_one(pool)
    .await
}
