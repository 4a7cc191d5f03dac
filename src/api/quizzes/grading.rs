use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentInstructor;
use crate::core::state::AppState;
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::repositories;
use crate::schemas::quiz::GradeSubmissionRequest;
use crate::services::quiz_grading::{self, GradeError};

use super::helpers;

pub(in crate::api::quizzes) async fn grade_submission(
    Path(submission_id): Path<String>,
    CurrentInstructor(grader): CurrentInstructor,
    State(state): State<AppState>,
    Json(payload): Json<GradeSubmissionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let submission = repositories::submissions::find_by_id(state.db(), &submission_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch submission"))?
        .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))?;

    // The quiz definition is authoritative for total points and the pass
    // threshold; the stored submission only mirrors them.
    let resolved = helpers::fetch_quiz(
        &state,
        &submission.course_id,
        submission.module_index as usize,
        submission.item_index as usize,
        false,
    )
    .await?;

    let grade = quiz_grading::apply_grade(
        submission.quiz_type,
        payload.score,
        resolved.quiz.total_points(),
        resolved.quiz.passing_score(),
    )
    .map_err(|err| match err {
        GradeError::NotOpenEnded => {
            ApiError::BadRequest("Only open-ended submissions can be graded manually".to_string())
        }
        GradeError::OutOfBounds { max } => {
            ApiError::BadRequest(format!("score must be between 0 and {max}"))
        }
    })?;

    let now = primitive_now_utc();
    let mut answer = submission.open_ended.map(|json| json.0).unwrap_or_default();
    answer.graded_score = Some(grade.score);
    answer.feedback = payload.feedback;
    answer.graded_at = Some(format_primitive(now));
    answer.graded_by = Some(grader.id.clone());

    let updated = repositories::submissions::apply_grade(
        state.db(),
        &submission.id,
        answer,
        grade.score,
        grade.percentage,
        grade.passed,
        now,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to store grade"))?;

    tracing::info!(
        submission_id = %updated.id,
        course_id = %updated.course_id,
        grader_id = %grader.id,
        score = grade.score,
        percentage = grade.percentage,
        passed = grade.passed,
        "Submission graded"
    );

    let mut body = helpers::summary_json(&updated)?;
    body["answer"] =
        helpers::open_ended_answer_json(updated.open_ended.as_ref().map(|json| &json.0));

    Ok(Json(body))
}

pub(in crate::api::quizzes) async fn grading_queue(
    Path((course_id, module_index, item_index)): Path<(String, usize, usize)>,
    CurrentInstructor(_instructor): CurrentInstructor,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    helpers::fetch_quiz(&state, &course_id, module_index, item_index, false).await?;

    let rows = repositories::submissions::list_for_quiz(
        state.db(),
        &course_id,
        module_index as i32,
        item_index as i32,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to load submissions"))?;

    let mut ungraded = Vec::new();
    let mut graded = Vec::new();
    for row in &rows {
        let entry = helpers::queue_entry_json(row);
        let is_graded =
            row.open_ended.as_ref().map(|answer| answer.0.is_graded()).unwrap_or(false);
        if is_graded {
            graded.push(entry);
        } else {
            ungraded.push(entry);
        }
    }

    Ok(Json(serde_json::json!({
        "course_id": course_id,
        "module_index": module_index,
        "item_index": item_index,
        "total": rows.len(),
        "ungraded": ungraded,
        "graded": graded,
    })))
}
