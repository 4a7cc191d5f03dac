use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::services::quiz_def::{McqQuiz, OpenEndedQuiz};

/// A single question as shown to a student: answer key stripped, canonical
/// position kept so submitted answers can be translated back.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct StudentQuestion {
    pub(crate) original_index: usize,
    pub(crate) text: String,
    pub(crate) points: f64,
    pub(crate) options: Vec<StudentOption>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StudentOption {
    pub(crate) original_index: usize,
    pub(crate) text: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct OpenEndedView {
    pub(crate) question_text: String,
    pub(crate) question_file_url: Option<String>,
    pub(crate) accept_text_answer: bool,
    pub(crate) accept_file_upload: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("attempt limit reached")]
pub(crate) struct AttemptLimitReached;

/// A student may start attempt `prior_attempts + 1` unless the quiz is
/// single-attempt and one submission already exists.
pub(crate) fn ensure_attempt_allowed(
    allow_multiple_attempts: bool,
    prior_attempts: i64,
) -> Result<(), AttemptLimitReached> {
    if prior_attempts > 0 && !allow_multiple_attempts {
        return Err(AttemptLimitReached);
    }
    Ok(())
}

/// Student-safe MCQ question set. The permutation is fresh per call and is
/// never persisted; `original_index` keeps answers order-independent.
pub(crate) fn mcq_student_questions(quiz: &McqQuiz, rng: &mut impl Rng) -> Vec<StudentQuestion> {
    let mut questions: Vec<StudentQuestion> = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(question_index, question)| {
            let mut options: Vec<StudentOption> = question
                .options
                .iter()
                .enumerate()
                .map(|(option_index, option)| StudentOption {
                    original_index: option_index,
                    text: option.text.clone(),
                })
                .collect();

            if quiz.randomize_options {
                options.shuffle(rng);
            }

            StudentQuestion {
                original_index: question_index,
                text: question.text.clone(),
                points: question.points,
                options,
            }
        })
        .collect();

    if quiz.randomize_questions {
        questions.shuffle(rng);
    }

    questions
}

pub(crate) fn open_ended_view(quiz: &OpenEndedQuiz) -> OpenEndedView {
    OpenEndedView {
        question_text: quiz.question_text.clone(),
        question_file_url: quiz.question_file_url.clone(),
        accept_text_answer: quiz.accept_text_answer,
        accept_file_upload: quiz.accept_file_upload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::quiz_def::{QuizOption, QuizQuestion};

    fn quiz(randomize_questions: bool, randomize_options: bool) -> McqQuiz {
        McqQuiz {
            time_limit_minutes: None,
            passing_score: 60,
            allow_multiple_attempts: false,
            randomize_questions,
            randomize_options,
            show_answers_after_submission: false,
            questions: (0..6)
                .map(|index| QuizQuestion {
                    text: format!("問{index}"),
                    points: 5.0,
                    options: vec![
                        QuizOption { text: "あ".to_string(), is_correct: index % 2 == 0 },
                        QuizOption { text: "い".to_string(), is_correct: index % 2 == 1 },
                        QuizOption { text: "う".to_string(), is_correct: false },
                        QuizOption { text: "え".to_string(), is_correct: false },
                    ],
                })
                .collect(),
        }
    }

    #[test]
    fn view_never_exposes_answer_key() {
        let questions = mcq_student_questions(&quiz(true, true), &mut rand::thread_rng());
        let serialized = serde_json::to_string(&questions).expect("json");
        assert!(!serialized.contains("is_correct"));
    }

    #[test]
    fn unrandomized_view_preserves_canonical_order() {
        let questions = mcq_student_questions(&quiz(false, false), &mut rand::thread_rng());
        let order: Vec<usize> = questions.iter().map(|question| question.original_index).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);
        for question in &questions {
            let options: Vec<usize> =
                question.options.iter().map(|option| option.original_index).collect();
            assert_eq!(options, vec![0, 1, 2, 3]);
        }
    }

    #[test]
    fn randomized_view_is_a_permutation() {
        let questions = mcq_student_questions(&quiz(true, true), &mut rand::thread_rng());
        let mut order: Vec<usize> = questions.iter().map(|question| question.original_index).collect();
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);
        for question in &questions {
            let mut options: Vec<usize> =
                question.options.iter().map(|option| option.original_index).collect();
            options.sort_unstable();
            assert_eq!(options, vec![0, 1, 2, 3]);
        }
    }

    #[test]
    fn first_attempt_always_allowed() {
        assert!(ensure_attempt_allowed(false, 0).is_ok());
        assert!(ensure_attempt_allowed(true, 0).is_ok());
    }

    #[test]
    fn repeat_attempt_requires_multiple_attempts_flag() {
        assert_eq!(ensure_attempt_allowed(false, 1).unwrap_err(), AttemptLimitReached);
        assert!(ensure_attempt_allowed(true, 3).is_ok());
    }
}
