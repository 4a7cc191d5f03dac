use serde::Deserialize;
use time::PrimitiveDateTime;

use crate::db::models::McqAnswerRecord;
use crate::services::quiz_def::McqQuiz;

/// One answer as submitted by the client, keyed by the canonical question
/// index (views carry `original_index` for exactly this translation).
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SubmittedAnswer {
    pub(crate) question_index: i32,
    pub(crate) selected_option_index: i32,
}

#[derive(Debug, Clone)]
pub(crate) struct McqOutcome {
    pub(crate) answers: Vec<McqAnswerRecord>,
    pub(crate) score: f64,
    pub(crate) total_points: f64,
    pub(crate) percentage: i32,
    pub(crate) passed: bool,
}

/// Auto-grade an MCQ attempt against the canonical definition. Every
/// question produces a record; unanswered questions score 0 with
/// `selected_option_index = -1`.
pub(crate) fn grade_mcq(quiz: &McqQuiz, submitted: &[SubmittedAnswer]) -> McqOutcome {
    let mut answers = Vec::with_capacity(quiz.questions.len());
    let mut score = 0.0;

    for (question_index, question) in quiz.questions.iter().enumerate() {
        let selected = submitted
            .iter()
            .find(|answer| answer.question_index == question_index as i32)
            .map(|answer| answer.selected_option_index)
            .unwrap_or(-1);

        let correct_index = question.correct_option_index().map(|index| index as i32);
        let is_correct = selected >= 0 && correct_index == Some(selected);
        let points_earned = if is_correct { question.points } else { 0.0 };
        score += points_earned;

        answers.push(McqAnswerRecord {
            question_index: question_index as i32,
            selected_option_index: selected,
            is_correct,
            points_earned,
        });
    }

    let total_points = quiz.total_points();
    let percentage = percentage(score, total_points);
    let passed = percentage >= quiz.passing_score;

    McqOutcome { answers, score, total_points, percentage, passed }
}

pub(crate) fn percentage(score: f64, total_points: f64) -> i32 {
    if total_points <= 0.0 {
        return 0;
    }
    (score / total_points * 100.0).round() as i32
}

/// Whole seconds between start and submit, floored at 0 when the client
/// reports a start time after submission.
pub(crate) fn time_spent_seconds(
    started_at: PrimitiveDateTime,
    submitted_at: PrimitiveDateTime,
) -> i64 {
    let elapsed =
        submitted_at.assume_utc().unix_timestamp() - started_at.assume_utc().unix_timestamp();
    elapsed.max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::quiz_def::{QuizOption, QuizQuestion};
    use time::{Date, Time};

    fn two_question_quiz() -> McqQuiz {
        McqQuiz {
            time_limit_minutes: None,
            passing_score: 60,
            allow_multiple_attempts: false,
            randomize_questions: false,
            randomize_options: false,
            show_answers_after_submission: true,
            questions: vec![
                QuizQuestion {
                    text: "「犬」の読みは？".to_string(),
                    points: 5.0,
                    options: vec![
                        QuizOption { text: "いぬ".to_string(), is_correct: true },
                        QuizOption { text: "ねこ".to_string(), is_correct: false },
                    ],
                },
                QuizQuestion {
                    text: "「猫」の読みは？".to_string(),
                    points: 5.0,
                    options: vec![
                        QuizOption { text: "いぬ".to_string(), is_correct: false },
                        QuizOption { text: "ねこ".to_string(), is_correct: true },
                    ],
                },
            ],
        }
    }

    fn answer(question_index: i32, selected_option_index: i32) -> SubmittedAnswer {
        SubmittedAnswer { question_index, selected_option_index }
    }

    #[test]
    fn one_correct_one_wrong_scores_half() {
        let outcome = grade_mcq(&two_question_quiz(), &[answer(0, 0), answer(1, 0)]);

        assert_eq!(outcome.score, 5.0);
        assert_eq!(outcome.total_points, 10.0);
        assert_eq!(outcome.percentage, 50);
        assert!(!outcome.passed);
        assert!(outcome.answers[0].is_correct);
        assert!(!outcome.answers[1].is_correct);
    }

    #[test]
    fn all_correct_passes() {
        let outcome = grade_mcq(&two_question_quiz(), &[answer(0, 0), answer(1, 1)]);

        assert_eq!(outcome.score, 10.0);
        assert_eq!(outcome.percentage, 100);
        assert!(outcome.passed);
    }

    #[test]
    fn unanswered_question_earns_nothing() {
        let outcome = grade_mcq(&two_question_quiz(), &[answer(0, 0)]);

        assert_eq!(outcome.answers[1].selected_option_index, -1);
        assert!(!outcome.answers[1].is_correct);
        assert_eq!(outcome.answers[1].points_earned, 0.0);
        assert_eq!(outcome.score, 5.0);
    }

    #[test]
    fn out_of_range_option_is_wrong() {
        let outcome = grade_mcq(&two_question_quiz(), &[answer(0, 7), answer(1, -1)]);

        assert_eq!(outcome.score, 0.0);
        assert_eq!(outcome.answers[0].selected_option_index, 7);
        assert!(!outcome.answers[0].is_correct);
        assert_eq!(outcome.answers[1].selected_option_index, -1);
    }

    #[test]
    fn extra_answers_for_unknown_questions_are_ignored() {
        let outcome = grade_mcq(&two_question_quiz(), &[answer(0, 0), answer(9, 0)]);

        assert_eq!(outcome.answers.len(), 2);
        assert_eq!(outcome.score, 5.0);
    }

    #[test]
    fn percentage_rounds_to_nearest_integer() {
        assert_eq!(percentage(1.0, 3.0), 33);
        assert_eq!(percentage(2.0, 3.0), 67);
        assert_eq!(percentage(0.0, 10.0), 0);
        assert_eq!(percentage(10.0, 10.0), 100);
    }

    #[test]
    fn percentage_is_zero_for_zero_total() {
        assert_eq!(percentage(5.0, 0.0), 0);
    }

    #[test]
    fn pass_threshold_is_inclusive() {
        let mut quiz = two_question_quiz();
        quiz.passing_score = 50;
        let outcome = grade_mcq(&quiz, &[answer(0, 0), answer(1, 0)]);
        assert_eq!(outcome.percentage, 50);
        assert!(outcome.passed);
    }

    #[test]
    fn time_spent_floors_at_zero() {
        let date = Date::from_calendar_date(2025, time::Month::March, 10).unwrap();
        let earlier = PrimitiveDateTime::new(date, Time::from_hms(9, 0, 0).unwrap());
        let later = PrimitiveDateTime::new(date, Time::from_hms(9, 12, 30).unwrap());

        assert_eq!(time_spent_seconds(earlier, later), 750);
        assert_eq!(time_spent_seconds(later, earlier), 0);
    }
}
