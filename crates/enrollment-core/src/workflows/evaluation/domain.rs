use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::enrollment::{EnrollmentId, EnrollmentStatus};
use crate::workflows::registry::{CourseId, StudentId};
use crate::workflows::WorkflowError;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 20.0;
/// Lowest approving grade on the vigesimal scale.
pub const PASSING_SCORE: f64 = 10.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationId(pub i64);

impl fmt::Display for EvaluationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Finite grade within `[0, 20]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Score(f64);

impl Score {
    pub fn new(value: f64) -> Result<Self, WorkflowError> {
        if value.is_finite() && (MIN_SCORE..=MAX_SCORE).contains(&value) {
            Ok(Self(value))
        } else {
            Err(WorkflowError::InvalidInput(format!(
                "score must be a number between {MIN_SCORE} and {MAX_SCORE}, got {value}"
            )))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_passing(self) -> bool {
        self.0 >= PASSING_SCORE
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: EvaluationId,
    pub enrollment_id: EnrollmentId,
    pub score: f64,
    pub approved: bool,
    pub evaluated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub enrollment_id: EnrollmentId,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreUpdate {
    pub score: f64,
}

/// Evaluation as written, with the status its enrollment moved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradedEvaluation {
    #[serde(flatten)]
    pub evaluation: Evaluation,
    pub enrollment_status: EnrollmentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationView {
    pub id: EvaluationId,
    pub enrollment_id: EnrollmentId,
    pub student_id: StudentId,
    pub student_name: String,
    pub course_id: CourseId,
    pub course_code: String,
    pub course_name: String,
    pub enrollment_cycle: u8,
    pub attempt_number: u32,
    pub score: f64,
    pub approved: bool,
    pub evaluated_at: DateTime<Utc>,
}

/// Enrollment still waiting for a grade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingEvaluation {
    pub enrollment_id: EnrollmentId,
    pub student_id: StudentId,
    pub student_name: String,
    pub course_id: CourseId,
    pub course_code: String,
    pub course_name: String,
    pub enrollment_cycle: u8,
    pub attempt_number: u32,
}
