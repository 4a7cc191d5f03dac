use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::types::QuizType;

/// Course curriculum document as stored in `courses.curriculum`. The quiz
/// core only ever reads it; authoring happens through the course endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Curriculum {
    #[serde(default)]
    pub(crate) modules: Vec<CourseModule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CourseModule {
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) items: Vec<ModuleItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ModuleItem {
    pub(crate) title: String,
    pub(crate) item_type: ItemType,
    #[serde(default)]
    pub(crate) published: bool,
    #[serde(default)]
    pub(crate) quiz: Option<QuizDefinition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ItemType {
    Lesson,
    Quiz,
    #[serde(other)]
    Other,
}

/// The two quiz variants, discriminated by `quiz_type` so each branch's
/// fields are statically known.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "quiz_type", rename_all = "snake_case")]
pub(crate) enum QuizDefinition {
    Mcq(McqQuiz),
    OpenEnded(OpenEndedQuiz),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct McqQuiz {
    #[serde(default)]
    pub(crate) time_limit_minutes: Option<i32>,
    pub(crate) passing_score: i32,
    #[serde(default)]
    pub(crate) allow_multiple_attempts: bool,
    #[serde(default)]
    pub(crate) randomize_questions: bool,
    #[serde(default)]
    pub(crate) randomize_options: bool,
    #[serde(default)]
    pub(crate) show_answers_after_submission: bool,
    pub(crate) questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct QuizQuestion {
    pub(crate) text: String,
    pub(crate) points: f64,
    pub(crate) options: Vec<QuizOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct QuizOption {
    pub(crate) text: String,
    #[serde(default)]
    pub(crate) is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct OpenEndedQuiz {
    #[serde(default)]
    pub(crate) time_limit_minutes: Option<i32>,
    pub(crate) passing_score: i32,
    #[serde(default)]
    pub(crate) allow_multiple_attempts: bool,
    pub(crate) question_text: String,
    #[serde(default)]
    pub(crate) question_file_url: Option<String>,
    #[serde(default = "default_true")]
    pub(crate) accept_text_answer: bool,
    #[serde(default)]
    pub(crate) accept_file_upload: bool,
    pub(crate) total_points: f64,
}

fn default_true() -> bool {
    true
}

impl McqQuiz {
    pub(crate) fn total_points(&self) -> f64 {
        self.questions.iter().map(|question| question.points).sum()
    }
}

impl QuizQuestion {
    /// Canonical index of the option flagged correct. The definition is
    /// assumed to carry exactly one; the first wins otherwise.
    pub(crate) fn correct_option_index(&self) -> Option<usize> {
        self.options.iter().position(|option| option.is_correct)
    }
}

impl QuizDefinition {
    pub(crate) fn quiz_type(&self) -> QuizType {
        match self {
            QuizDefinition::Mcq(_) => QuizType::Mcq,
            QuizDefinition::OpenEnded(_) => QuizType::OpenEnded,
        }
    }

    pub(crate) fn allow_multiple_attempts(&self) -> bool {
        match self {
            QuizDefinition::Mcq(quiz) => quiz.allow_multiple_attempts,
            QuizDefinition::OpenEnded(quiz) => quiz.allow_multiple_attempts,
        }
    }

    pub(crate) fn passing_score(&self) -> i32 {
        match self {
            QuizDefinition::Mcq(quiz) => quiz.passing_score,
            QuizDefinition::OpenEnded(quiz) => quiz.passing_score,
        }
    }

    pub(crate) fn total_points(&self) -> f64 {
        match self {
            QuizDefinition::Mcq(quiz) => quiz.total_points(),
            QuizDefinition::OpenEnded(quiz) => quiz.total_points,
        }
    }

    pub(crate) fn time_limit_minutes(&self) -> Option<i32> {
        match self {
            QuizDefinition::Mcq(quiz) => quiz.time_limit_minutes,
            QuizDefinition::OpenEnded(quiz) => quiz.time_limit_minutes,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum LocateError {
    #[error("quiz not found")]
    NotFound,
    #[error("quiz is not published")]
    Unpublished,
}

#[derive(Debug)]
pub(crate) struct LocatedQuiz<'a> {
    pub(crate) title: &'a str,
    pub(crate) quiz: &'a QuizDefinition,
}

pub(crate) fn parse_curriculum(value: &serde_json::Value) -> Result<Curriculum, serde_json::Error> {
    serde_json::from_value(value.clone())
}

/// Positional lookup into the curriculum document. The rest of the core
/// treats the result as an opaque quiz handle.
pub(crate) fn locate_quiz(
    curriculum: &Curriculum,
    module_index: usize,
    item_index: usize,
) -> Result<LocatedQuiz<'_>, LocateError> {
    let item = curriculum
        .modules
        .get(module_index)
        .and_then(|module| module.items.get(item_index))
        .ok_or(LocateError::NotFound)?;

    if item.item_type != ItemType::Quiz {
        return Err(LocateError::NotFound);
    }

    let quiz = item.quiz.as_ref().ok_or(LocateError::NotFound)?;

    if !item.published {
        return Err(LocateError::Unpublished);
    }

    Ok(LocatedQuiz { title: &item.title, quiz })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_curriculum() -> Curriculum {
        serde_json::from_value(serde_json::json!({
            "modules": [
                {
                    "title": "文法入門",
                    "items": [
                        { "title": "はじめに", "item_type": "lesson", "published": true },
                        {
                            "title": "助詞の確認テスト",
                            "item_type": "quiz",
                            "published": true,
                            "quiz": {
                                "quiz_type": "mcq",
                                "passing_score": 60,
                                "questions": [
                                    {
                                        "text": "「は」の読みは？",
                                        "points": 5.0,
                                        "options": [
                                            { "text": "wa", "is_correct": true },
                                            { "text": "ha" }
                                        ]
                                    }
                                ]
                            }
                        },
                        {
                            "title": "作文課題",
                            "item_type": "quiz",
                            "published": false,
                            "quiz": {
                                "quiz_type": "open_ended",
                                "passing_score": 70,
                                "question_text": "自己紹介を書いてください。",
                                "total_points": 100.0
                            }
                        },
                        { "title": "空のクイズ", "item_type": "quiz", "published": true }
                    ]
                }
            ]
        }))
        .expect("curriculum")
    }

    #[test]
    fn locate_finds_published_quiz() {
        let curriculum = sample_curriculum();
        let located = locate_quiz(&curriculum, 0, 1).expect("located");
        assert_eq!(located.title, "助詞の確認テスト");
        assert_eq!(located.quiz.quiz_type(), QuizType::Mcq);
    }

    #[test]
    fn locate_missing_module_or_item_is_not_found() {
        let curriculum = sample_curriculum();
        assert_eq!(locate_quiz(&curriculum, 5, 0).unwrap_err(), LocateError::NotFound);
        assert_eq!(locate_quiz(&curriculum, 0, 99).unwrap_err(), LocateError::NotFound);
    }

    #[test]
    fn locate_non_quiz_item_is_not_found() {
        let curriculum = sample_curriculum();
        assert_eq!(locate_quiz(&curriculum, 0, 0).unwrap_err(), LocateError::NotFound);
    }

    #[test]
    fn locate_quiz_without_definition_is_not_found() {
        let curriculum = sample_curriculum();
        assert_eq!(locate_quiz(&curriculum, 0, 3).unwrap_err(), LocateError::NotFound);
    }

    #[test]
    fn locate_unpublished_quiz_is_forbidden() {
        let curriculum = sample_curriculum();
        assert_eq!(locate_quiz(&curriculum, 0, 2).unwrap_err(), LocateError::Unpublished);
    }

    #[test]
    fn mcq_total_points_is_question_sum() {
        let curriculum = sample_curriculum();
        let located = locate_quiz(&curriculum, 0, 1).expect("located");
        assert_eq!(located.quiz.total_points(), 5.0);
    }

    #[test]
    fn open_ended_defaults_accept_text() {
        let quiz: QuizDefinition = serde_json::from_value(serde_json::json!({
            "quiz_type": "open_ended",
            "passing_score": 70,
            "question_text": "説明してください。",
            "total_points": 50.0
        }))
        .expect("quiz");

        match quiz {
            QuizDefinition::OpenEnded(open) => {
                assert!(open.accept_text_answer);
                assert!(!open.accept_file_upload);
                assert!(!open.allow_multiple_attempts);
            }
            QuizDefinition::Mcq(_) => panic!("expected open-ended variant"),
        }
    }

    #[test]
    fn unknown_item_type_parses_as_other() {
        let item: ModuleItem = serde_json::from_value(serde_json::json!({
            "title": "アンケート",
            "item_type": "survey"
        }))
        .expect("item");
        assert_eq!(item.item_type, ItemType::Other);
    }
}
