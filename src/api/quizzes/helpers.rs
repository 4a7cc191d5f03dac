use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::db::models::{McqAnswerRecord, OpenEndedAnswer, Submission};
use crate::repositories;
use crate::schemas::submission::{format_primitive, SubmissionSummary};
use crate::services::quiz_def::{self, McqQuiz, OpenEndedQuiz, QuizDefinition};

/// A quiz resolved from its positional address, detached from the curriculum
/// document it was embedded in.
pub(in crate::api::quizzes) struct ResolvedQuiz {
    pub(in crate::api::quizzes) title: String,
    pub(in crate::api::quizzes) quiz: QuizDefinition,
}

/// Resolve `(course, module, item)` to a quiz definition. Retrieval and
/// submission require the item to be published; grading paths pass
/// `require_published = false` so an item unpublished after the fact stays
/// gradable.
pub(in crate::api::quizzes) async fn fetch_quiz(
    state: &AppState,
    course_id: &str,
    module_index: usize,
    item_index: usize,
    require_published: bool,
) -> Result<ResolvedQuiz, ApiError> {
    let course = repositories::courses::find_by_id(state.db(), course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    let curriculum = quiz_def::parse_curriculum(&course.curriculum.0)
        .map_err(|e| ApiError::internal(e, "Failed to parse course curriculum"))?;

    match quiz_def::locate_quiz(&curriculum, module_index, item_index) {
        Ok(located) => {
            Ok(ResolvedQuiz { title: located.title.to_string(), quiz: located.quiz.clone() })
        }
        Err(quiz_def::LocateError::Unpublished) if !require_published => {
            // Re-run the lookup ignoring the publish flag.
            let item = curriculum
                .modules
                .get(module_index)
                .and_then(|module| module.items.get(item_index))
                .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))?;
            let quiz = item
                .quiz
                .as_ref()
                .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))?;
            Ok(ResolvedQuiz { title: item.title.clone(), quiz: quiz.clone() })
        }
        Err(quiz_def::LocateError::Unpublished) => {
            Err(ApiError::Forbidden("Quiz is not published"))
        }
        Err(quiz_def::LocateError::NotFound) => {
            Err(ApiError::NotFound("Quiz not found".to_string()))
        }
    }
}

pub(in crate::api::quizzes) fn summary_json(
    submission: &Submission,
) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(SubmissionSummary::from_db(submission))
        .map_err(|e| ApiError::internal(e, "Failed to serialize submission"))
}

/// Full graded question set, answer key included. Only ever returned when
/// the quiz allows answers to be shown after submission, or to instructors.
pub(in crate::api::quizzes) fn mcq_review(
    quiz: &McqQuiz,
    records: &[McqAnswerRecord],
) -> serde_json::Value {
    let questions: Vec<serde_json::Value> = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(question_index, question)| {
            let record = records
                .iter()
                .find(|record| record.question_index == question_index as i32);

            serde_json::json!({
                "question_index": question_index,
                "text": question.text,
                "points": question.points,
                "options": question.options.iter().map(|option| serde_json::json!({
                    "text": option.text,
                    "is_correct": option.is_correct,
                })).collect::<Vec<_>>(),
                "correct_option_index": question.correct_option_index(),
                "selected_option_index": record.map(|r| r.selected_option_index).unwrap_or(-1),
                "is_correct": record.map(|r| r.is_correct).unwrap_or(false),
                "points_earned": record.map(|r| r.points_earned).unwrap_or(0.0),
            })
        })
        .collect();

    serde_json::Value::Array(questions)
}

pub(in crate::api::quizzes) fn open_ended_answer_json(
    answer: Option<&OpenEndedAnswer>,
) -> serde_json::Value {
    match answer {
        Some(answer) => serde_json::json!({
            "text_answer": answer.text_answer,
            "file_url": answer.file_url,
            "graded_score": answer.graded_score,
            "feedback": answer.feedback,
            "graded_at": answer.graded_at,
            "graded_by": answer.graded_by,
        }),
        None => serde_json::Value::Null,
    }
}

pub(in crate::api::quizzes) fn open_ended_question_json(
    quiz: &OpenEndedQuiz,
) -> serde_json::Value {
    serde_json::json!({
        "question_text": quiz.question_text,
        "question_file_url": quiz.question_file_url,
        "accept_text_answer": quiz.accept_text_answer,
        "accept_file_upload": quiz.accept_file_upload,
    })
}

pub(in crate::api::quizzes) fn queue_entry_json(
    row: &repositories::submissions::QueueRow,
) -> serde_json::Value {
    let answer = row.open_ended.as_ref().map(|json| &json.0);

    serde_json::json!({
        "id": row.id,
        "student_id": row.student_id,
        "student_name": row.student_name,
        "attempt_number": row.attempt_number,
        "quiz_type": row.quiz_type,
        "submitted_at": format_primitive(row.submitted_at),
        "score": row.score,
        "total_points": row.total_points,
        "percentage": row.percentage,
        "passed": row.passed,
        "answer": open_ended_answer_json(answer),
    })
}
