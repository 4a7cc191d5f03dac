use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::{parse_rfc3339, primitive_now_utc, to_primitive_utc};
use crate::db::models::{OpenEndedAnswer, Submission};
use crate::repositories;
use crate::repositories::submissions::InsertError;
use crate::schemas::quiz::{ResultsQuery, SubmitQuizRequest};
use crate::services::quiz_def::QuizDefinition;
use crate::services::quiz_delivery;
use crate::services::quiz_scoring;

use super::helpers;

/// Max submit calls per student per window; covers retry storms, not pacing.
const SUBMIT_RATE_LIMIT: u64 = 30;
const SUBMIT_RATE_WINDOW_SECONDS: u64 = 60;

pub(in crate::api::quizzes) async fn get_quiz(
    Path((course_id, module_index, item_index)): Path<(String, usize, usize)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let resolved = helpers::fetch_quiz(&state, &course_id, module_index, item_index, true).await?;

    let prior = repositories::submissions::list_for_student(
        state.db(),
        &course_id,
        module_index as i32,
        item_index as i32,
        &user.id,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to load prior submissions"))?;

    if let Some(latest) = prior.first() {
        if !resolved.quiz.allow_multiple_attempts() {
            return Err(ApiError::AttemptLimit { latest_submission: helpers::summary_json(latest)? });
        }
    }

    let attempt_number = prior.len() as i32 + 1;

    let body = match &resolved.quiz {
        QuizDefinition::Mcq(quiz) => {
            // Fresh permutation per fetch; nothing is persisted. The rng must
            // not outlive this block: the handler future has to stay Send.
            let questions = {
                let mut rng = rand::thread_rng();
                quiz_delivery::mcq_student_questions(quiz, &mut rng)
            };

            serde_json::json!({
                "course_id": course_id,
                "module_index": module_index,
                "item_index": item_index,
                "title": resolved.title,
                "quiz_type": "mcq",
                "time_limit_minutes": quiz.time_limit_minutes,
                "passing_score": quiz.passing_score,
                "total_points": quiz.total_points(),
                "allow_multiple_attempts": quiz.allow_multiple_attempts,
                "show_answers_after_submission": quiz.show_answers_after_submission,
                "attempt_number": attempt_number,
                "questions": questions,
            })
        }
        QuizDefinition::OpenEnded(quiz) => serde_json::json!({
            "course_id": course_id,
            "module_index": module_index,
            "item_index": item_index,
            "title": resolved.title,
            "quiz_type": "open_ended",
            "time_limit_minutes": quiz.time_limit_minutes,
            "passing_score": quiz.passing_score,
            "total_points": quiz.total_points,
            "allow_multiple_attempts": quiz.allow_multiple_attempts,
            "attempt_number": attempt_number,
            "question": helpers::open_ended_question_json(quiz),
        }),
    };

    Ok(Json(body))
}

pub(in crate::api::quizzes) async fn submit_quiz(
    Path((course_id, module_index, item_index)): Path<(String, usize, usize)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<SubmitQuizRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let rate_key = format!("rl:submit:{}", user.id);
    let allowed = state
        .redis()
        .rate_limit(&rate_key, SUBMIT_RATE_LIMIT, SUBMIT_RATE_WINDOW_SECONDS)
        .await
        .unwrap_or(true);
    if !allowed {
        return Err(ApiError::TooManyRequests("Too many submissions, try again later"));
    }

    let resolved = helpers::fetch_quiz(&state, &course_id, module_index, item_index, true).await?;

    if payload.quiz_type != resolved.quiz.quiz_type() {
        return Err(ApiError::BadRequest(
            "quiz_type does not match the quiz definition".to_string(),
        ));
    }

    let started_at = parse_rfc3339(&payload.started_at)
        .map(to_primitive_utc)
        .ok_or_else(|| ApiError::BadRequest("started_at must be an RFC 3339 timestamp".to_string()))?;

    let prior_count = repositories::submissions::count_for_student(
        state.db(),
        &course_id,
        module_index as i32,
        item_index as i32,
        &user.id,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to count prior submissions"))?;

    if quiz_delivery::ensure_attempt_allowed(resolved.quiz.allow_multiple_attempts(), prior_count)
        .is_err()
    {
        let latest = repositories::submissions::list_for_student(
            state.db(),
            &course_id,
            module_index as i32,
            item_index as i32,
            &user.id,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load prior submissions"))?;

        let latest_submission = match latest.first() {
            Some(submission) => helpers::summary_json(submission)?,
            None => serde_json::Value::Null,
        };
        return Err(ApiError::AttemptLimit { latest_submission });
    }

    let attempt_number = prior_count as i32 + 1;
    let submitted_at = primitive_now_utc();
    let time_spent_seconds = quiz_scoring::time_spent_seconds(started_at, submitted_at);
    let submission_id = Uuid::new_v4().to_string();

    let body = match &resolved.quiz {
        QuizDefinition::Mcq(quiz) => {
            let outcome = quiz_scoring::grade_mcq(quiz, &payload.answers);

            let created = insert_submission(
                &state,
                repositories::submissions::CreateSubmission {
                    id: &submission_id,
                    course_id: &course_id,
                    module_index: module_index as i32,
                    item_index: item_index as i32,
                    student_id: &user.id,
                    attempt_number,
                    quiz_type: resolved.quiz.quiz_type(),
                    started_at,
                    submitted_at,
                    time_spent_seconds,
                    mcq_answers: outcome.answers,
                    open_ended: None,
                    score: outcome.score,
                    total_points: outcome.total_points,
                    percentage: outcome.percentage,
                    passed: outcome.passed,
                },
            )
            .await?;

            let mut body = helpers::summary_json(&created)?;
            if quiz.show_answers_after_submission {
                body["questions"] = helpers::mcq_review(quiz, &created.mcq_answers.0);
            }
            body
        }
        QuizDefinition::OpenEnded(quiz) => {
            let text_answer =
                payload.text_answer.clone().filter(|answer| !answer.trim().is_empty());
            let file_url = payload.file_url.clone().filter(|url| !url.trim().is_empty());

            if text_answer.is_some() && !quiz.accept_text_answer {
                return Err(ApiError::BadRequest(
                    "This quiz does not accept text answers".to_string(),
                ));
            }
            if file_url.is_some() && !quiz.accept_file_upload {
                return Err(ApiError::BadRequest(
                    "This quiz does not accept file answers".to_string(),
                ));
            }
            if text_answer.is_none() && file_url.is_none() {
                return Err(ApiError::BadRequest("An answer is required".to_string()));
            }

            let created = insert_submission(
                &state,
                repositories::submissions::CreateSubmission {
                    id: &submission_id,
                    course_id: &course_id,
                    module_index: module_index as i32,
                    item_index: item_index as i32,
                    student_id: &user.id,
                    attempt_number,
                    quiz_type: resolved.quiz.quiz_type(),
                    started_at,
                    submitted_at,
                    time_spent_seconds,
                    mcq_answers: Vec::new(),
                    open_ended: Some(OpenEndedAnswer {
                        text_answer,
                        file_url,
                        ..Default::default()
                    }),
                    // Placeholder values until an instructor grades.
                    score: 0.0,
                    total_points: quiz.total_points,
                    percentage: 0,
                    passed: false,
                },
            )
            .await?;

            serde_json::json!({
                "id": created.id,
                "course_id": created.course_id,
                "attempt_number": created.attempt_number,
                "quiz_type": created.quiz_type,
                "submitted_at": crate::schemas::submission::format_primitive(created.submitted_at),
                "time_spent_seconds": created.time_spent_seconds,
                "message": "Submission received and awaiting manual grading",
            })
        }
    };

    tracing::info!(
        course_id = %course_id,
        module_index,
        item_index,
        student_id = %user.id,
        attempt_number,
        quiz_type = ?resolved.quiz.quiz_type(),
        "Quiz submission recorded"
    );

    Ok((StatusCode::CREATED, Json(body)))
}

pub(in crate::api::quizzes) async fn get_results(
    Path((course_id, module_index, item_index)): Path<(String, usize, usize)>,
    Query(query): Query<ResultsQuery>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let resolved = helpers::fetch_quiz(&state, &course_id, module_index, item_index, true).await?;

    let mut submissions = repositories::submissions::list_for_student(
        state.db(),
        &course_id,
        module_index as i32,
        item_index as i32,
        &user.id,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to load submissions"))?;

    if let Some(submission_id) = &query.submission_id {
        submissions.retain(|submission| &submission.id == submission_id);
    }

    if submissions.is_empty() {
        return Err(ApiError::NotFound("No submissions found for this quiz".to_string()));
    }

    let items = submissions
        .iter()
        .map(|submission| result_json(&resolved.quiz, submission))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(serde_json::json!({
        "course_id": course_id,
        "module_index": module_index,
        "item_index": item_index,
        "title": resolved.title,
        "total": items.len(),
        "items": items,
    })))
}

fn result_json(
    quiz: &QuizDefinition,
    submission: &Submission,
) -> Result<serde_json::Value, ApiError> {
    let mut body = helpers::summary_json(submission)?;

    match quiz {
        QuizDefinition::Mcq(quiz) => {
            if quiz.show_answers_after_submission {
                body["questions"] = helpers::mcq_review(quiz, &submission.mcq_answers.0);
            }
        }
        QuizDefinition::OpenEnded(quiz) => {
            body["question"] = helpers::open_ended_question_json(quiz);
            body["answer"] =
                helpers::open_ended_answer_json(submission.open_ended.as_ref().map(|json| &json.0));
        }
    }

    Ok(body)
}

async fn insert_submission(
    state: &AppState,
    params: repositories::submissions::CreateSubmission<'_>,
) -> Result<Submission, ApiError> {
    repositories::submissions::create(state.db(), params).await.map_err(|err| match err {
        InsertError::AttemptConflict => ApiError::Conflict(
            "A submission for this attempt was recorded concurrently".to_string(),
        ),
        InsertError::Db(err) => ApiError::internal(err, "Failed to create submission"),
    })
}
