use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use tower::ServiceExt;

use crate::api::errors::ApiError;
use crate::api::router::router;
use crate::api::quizzes::helpers;
use crate::db::models::McqAnswerRecord;
use crate::services::quiz_def::{McqQuiz, QuizOption, QuizQuestion};
use crate::test_support;

fn sample_quiz() -> McqQuiz {
    McqQuiz {
        time_limit_minutes: Some(10),
        passing_score: 60,
        allow_multiple_attempts: false,
        randomize_questions: false,
        randomize_options: false,
        show_answers_after_submission: true,
        questions: vec![
            QuizQuestion {
                text: "「水」の読みは？".to_string(),
                points: 5.0,
                options: vec![
                    QuizOption { text: "みず".to_string(), is_correct: true },
                    QuizOption { text: "ひ".to_string(), is_correct: false },
                ],
            },
            QuizQuestion {
                text: "「火」の読みは？".to_string(),
                points: 5.0,
                options: vec![
                    QuizOption { text: "みず".to_string(), is_correct: false },
                    QuizOption { text: "ひ".to_string(), is_correct: true },
                ],
            },
        ],
    }
}

#[tokio::test]
async fn quiz_fetch_requires_authentication() {
    let _guard = test_support::env_lock().await;
    test_support::set_test_env();

    let app = router(test_support::build_state());
    let request =
        test_support::json_request(Method::GET, "/api/v1/courses/c1/quiz/0/0", None, None);

    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn quiz_submit_requires_authentication() {
    let _guard = test_support::env_lock().await;
    test_support::set_test_env();

    let app = router(test_support::build_state());
    let request = test_support::json_request(
        Method::POST,
        "/api/v1/courses/c1/quiz/0/0/submit",
        None,
        Some(serde_json::json!({
            "quiz_type": "mcq",
            "started_at": "2025-03-10T09:00:00Z",
            "answers": [],
        })),
    );

    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn grading_rejects_garbage_tokens() {
    let _guard = test_support::env_lock().await;
    test_support::set_test_env();

    let app = router(test_support::build_state());
    let request = test_support::json_request(
        Method::PUT,
        "/api/v1/submissions/s1/grade",
        Some("not-a-jwt"),
        Some(serde_json::json!({ "score": 80.0 })),
    );

    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn attempt_limit_response_carries_latest_submission() {
    let error = ApiError::AttemptLimit {
        latest_submission: serde_json::json!({ "id": "sub-1", "attempt_number": 1 }),
    };

    let response = error.into_response();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let json = test_support::read_json(response).await;
    assert_eq!(json["already_submitted"], true);
    assert_eq!(json["latest_submission"]["id"], "sub-1");
}

#[test]
fn mcq_review_includes_answer_key_and_student_answers() {
    let records = vec![
        McqAnswerRecord {
            question_index: 0,
            selected_option_index: 0,
            is_correct: true,
            points_earned: 5.0,
        },
        McqAnswerRecord {
            question_index: 1,
            selected_option_index: -1,
            is_correct: false,
            points_earned: 0.0,
        },
    ];

    let review = helpers::mcq_review(&sample_quiz(), &records);
    let questions = review.as_array().expect("array");

    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0]["correct_option_index"], 0);
    assert_eq!(questions[0]["options"][0]["is_correct"], true);
    assert_eq!(questions[0]["selected_option_index"], 0);
    assert_eq!(questions[0]["points_earned"], 5.0);
    assert_eq!(questions[1]["selected_option_index"], -1);
    assert_eq!(questions[1]["is_correct"], false);
}

#[test]
fn mcq_review_defaults_missing_records_to_unanswered() {
    let review = helpers::mcq_review(&sample_quiz(), &[]);
    let questions = review.as_array().expect("array");

    assert_eq!(questions[0]["selected_option_index"], -1);
    assert_eq!(questions[0]["points_earned"], 0.0);
}
