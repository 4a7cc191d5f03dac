mod grading;
pub(crate) mod helpers;
mod student;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::core::state::AppState;

/// Quiz routes addressed by position within a course curriculum; merged into
/// the `/courses` router.
pub(crate) fn course_router() -> Router<AppState> {
    Router::new()
        .route("/:course_id/quiz/:module_index/:item_index", get(student::get_quiz))
        .route("/:course_id/quiz/:module_index/:item_index/submit", post(student::submit_quiz))
        .route("/:course_id/quiz/:module_index/:item_index/results", get(student::get_results))
        .route(
            "/:course_id/quiz/:module_index/:item_index/grading-queue",
            get(grading::grading_queue),
        )
}

pub(crate) fn submissions_router() -> Router<AppState> {
    Router::new().route("/:submission_id/grade", put(grading::grade_submission))
}

#[cfg(test)]
mod tests;
