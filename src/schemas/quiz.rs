use serde::Deserialize;
use validator::Validate;

use crate::db::types::QuizType;
use crate::services::quiz_scoring::SubmittedAnswer;

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitQuizRequest {
    pub(crate) quiz_type: QuizType,
    /// RFC 3339 timestamp captured by the client when the quiz was opened.
    pub(crate) started_at: String,
    #[serde(default)]
    pub(crate) answers: Vec<SubmittedAnswer>,
    #[serde(default)]
    pub(crate) text_answer: Option<String>,
    #[serde(default)]
    pub(crate) file_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct GradeSubmissionRequest {
    #[validate(range(min = 0.0, message = "score must be non-negative"))]
    pub(crate) score: f64,
    #[serde(default)]
    pub(crate) feedback: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultsQuery {
    #[serde(default)]
    pub(crate) submission_id: Option<String>,
}
