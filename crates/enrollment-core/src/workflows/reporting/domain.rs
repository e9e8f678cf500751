use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::workflows::enrollment::{AttemptRecord, EnrollmentId};
use crate::workflows::registry::{CourseId, StudentId};
use crate::workflows::WorkflowError;

/// Recency window applied to a student's academic history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFilter {
    #[default]
    All,
    Last,
    Last3,
}

impl HistoryFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            HistoryFilter::All => "ALL",
            HistoryFilter::Last => "LAST",
            HistoryFilter::Last3 => "LAST_3",
        }
    }

    /// Number of most recent enrollment cycles kept, `None` meaning all of them.
    pub fn cycle_limit(self) -> Option<usize> {
        match self {
            HistoryFilter::All => None,
            HistoryFilter::Last => Some(1),
            HistoryFilter::Last3 => Some(3),
        }
    }
}

impl FromStr for HistoryFilter {
    type Err = WorkflowError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ALL" => Ok(HistoryFilter::All),
            "LAST" => Ok(HistoryFilter::Last),
            "LAST_3" => Ok(HistoryFilter::Last3),
            other => Err(WorkflowError::InvalidInput(format!(
                "unknown history filter '{other}', expected ALL, LAST or LAST_3"
            ))),
        }
    }
}

impl fmt::Display for HistoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HistoryFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GradeStatus {
    NoGradeYet,
    Passed,
    Failed,
}

impl GradeStatus {
    pub fn from_approval(approved: Option<bool>) -> Self {
        match approved {
            None => GradeStatus::NoGradeYet,
            Some(true) => GradeStatus::Passed,
            Some(false) => GradeStatus::Failed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GradeStatus::NoGradeYet => "no grade yet",
            GradeStatus::Passed => "PASSED",
            GradeStatus::Failed => "FAILED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub enrollment_id: EnrollmentId,
    pub course_id: CourseId,
    pub course_code: String,
    pub course_name: String,
    pub credits: u8,
    pub home_cycle: u8,
    pub attempt_number: u32,
    pub is_carry_over: bool,
    pub score: Option<f64>,
    pub status: GradeStatus,
    pub evaluated_at: Option<DateTime<Utc>>,
}

impl From<&AttemptRecord> for HistoryRecord {
    fn from(attempt: &AttemptRecord) -> Self {
        Self {
            enrollment_id: attempt.enrollment_id,
            course_id: attempt.course_id,
            course_code: attempt.course_code.clone(),
            course_name: attempt.course_name.clone(),
            credits: attempt.credits,
            home_cycle: attempt.home_cycle,
            attempt_number: attempt.attempt_number,
            is_carry_over: attempt.home_cycle != attempt.enrollment_cycle,
            score: attempt.score,
            status: GradeStatus::from_approval(attempt.approved),
            evaluated_at: attempt.evaluated_at,
        }
    }
}

/// History grouped by enrollment cycle; each group ordered by course code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentHistory {
    pub student_id: StudentId,
    pub filter: HistoryFilter,
    pub cycles: BTreeMap<u8, Vec<HistoryRecord>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleSummary {
    pub enrollment_cycle: u8,
    pub students: u32,
    pub enrollments: u32,
}
