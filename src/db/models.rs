use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{QuizType, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) hashed_password: String,
    pub(crate) display_name: String,
    pub(crate) email: Option<String>,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Course {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) published: bool,
    pub(crate) curriculum: Json<serde_json::Value>,
    pub(crate) created_by: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// One row per attempt; the composite attempt key is unique at the storage
/// layer (see migrations).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Submission {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) module_index: i32,
    pub(crate) item_index: i32,
    pub(crate) student_id: String,
    pub(crate) attempt_number: i32,
    pub(crate) quiz_type: QuizType,
    pub(crate) started_at: PrimitiveDateTime,
    pub(crate) submitted_at: PrimitiveDateTime,
    pub(crate) time_spent_seconds: i64,
    pub(crate) mcq_answers: Json<Vec<McqAnswerRecord>>,
    pub(crate) open_ended: Option<Json<OpenEndedAnswer>>,
    pub(crate) score: f64,
    pub(crate) total_points: f64,
    pub(crate) percentage: i32,
    pub(crate) passed: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// Graded answer for a single MCQ question, in canonical question order.
/// `selected_option_index` is -1 when the question was left unanswered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct McqAnswerRecord {
    pub(crate) question_index: i32,
    pub(crate) selected_option_index: i32,
    pub(crate) is_correct: bool,
    pub(crate) points_earned: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct OpenEndedAnswer {
    pub(crate) text_answer: Option<String>,
    pub(crate) file_url: Option<String>,
    pub(crate) graded_score: Option<f64>,
    pub(crate) feedback: Option<String>,
    pub(crate) graded_at: Option<String>,
    pub(crate) graded_by: Option<String>,
}

impl OpenEndedAnswer {
    pub(crate) fn is_graded(&self) -> bool {
        self.graded_score.is_some()
    }
}
