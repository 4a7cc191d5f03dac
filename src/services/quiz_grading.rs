use thiserror::Error;

use crate::db::types::QuizType;
use crate::services::quiz_scoring;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AppliedGrade {
    pub(crate) score: f64,
    pub(crate) percentage: i32,
    pub(crate) passed: bool,
}

#[derive(Debug, Error, PartialEq)]
pub(crate) enum GradeError {
    #[error("only open-ended submissions accept manual grades")]
    NotOpenEnded,
    #[error("score must be between 0 and {max}")]
    OutOfBounds { max: f64 },
}

/// Validate an instructor's grade against the authoritative quiz definition
/// and derive the fields mirrored onto the submission. Re-grading runs the
/// same path; the caller overwrites whatever was stored before.
pub(crate) fn apply_grade(
    quiz_type: QuizType,
    score: f64,
    total_points: f64,
    passing_score: i32,
) -> Result<AppliedGrade, GradeError> {
    if quiz_type != QuizType::OpenEnded {
        return Err(GradeError::NotOpenEnded);
    }

    if !score.is_finite() || score < 0.0 || score > total_points {
        return Err(GradeError::OutOfBounds { max: total_points });
    }

    let percentage = quiz_scoring::percentage(score, total_points);
    Ok(AppliedGrade { score, percentage, passed: percentage >= passing_score })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_within_bounds_recomputes_pass_state() {
        let grade = apply_grade(QuizType::OpenEnded, 80.0, 100.0, 70).expect("grade");
        assert_eq!(grade.percentage, 80);
        assert!(grade.passed);
    }

    #[test]
    fn grade_below_threshold_fails_quiz() {
        let grade = apply_grade(QuizType::OpenEnded, 60.0, 100.0, 70).expect("grade");
        assert_eq!(grade.percentage, 60);
        assert!(!grade.passed);
    }

    #[test]
    fn zero_is_a_valid_grade() {
        let grade = apply_grade(QuizType::OpenEnded, 0.0, 100.0, 70).expect("grade");
        assert_eq!(grade.percentage, 0);
        assert!(!grade.passed);
    }

    #[test]
    fn full_marks_are_a_valid_grade() {
        let grade = apply_grade(QuizType::OpenEnded, 100.0, 100.0, 70).expect("grade");
        assert_eq!(grade.percentage, 100);
        assert!(grade.passed);
    }

    #[test]
    fn score_above_total_is_rejected() {
        assert_eq!(
            apply_grade(QuizType::OpenEnded, 150.0, 100.0, 70).unwrap_err(),
            GradeError::OutOfBounds { max: 100.0 }
        );
    }

    #[test]
    fn negative_score_is_rejected() {
        assert_eq!(
            apply_grade(QuizType::OpenEnded, -1.0, 100.0, 70).unwrap_err(),
            GradeError::OutOfBounds { max: 100.0 }
        );
    }

    #[test]
    fn non_finite_score_is_rejected() {
        assert!(apply_grade(QuizType::OpenEnded, f64::NAN, 100.0, 70).is_err());
    }

    #[test]
    fn mcq_submissions_are_never_manually_graded() {
        assert_eq!(
            apply_grade(QuizType::Mcq, 5.0, 10.0, 60).unwrap_err(),
            GradeError::NotOpenEnded
        );
    }
}
