use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::workflows::registry::{Course, CourseId, StudentId};

/// Maximum number of courses a single enrollment submission may carry.
pub const MAX_COURSES_PER_ENROLLMENT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnrollmentId(pub i64);

impl fmt::Display for EnrollmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of an enrollment record. Only the evaluation engine moves it past `Enrolled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    Enrolled,
    Passed,
    Failed,
}

impl EnrollmentStatus {
    pub fn as_db_str(self) -> &'static str {
        match self {
            EnrollmentStatus::Enrolled => "ENROLLED",
            EnrollmentStatus::Passed => "PASSED",
            EnrollmentStatus::Failed => "FAILED",
        }
    }

    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "ENROLLED" => Some(EnrollmentStatus::Enrolled),
            "PASSED" => Some(EnrollmentStatus::Passed),
            "FAILED" => Some(EnrollmentStatus::Failed),
            _ => None,
        }
    }

    pub fn from_approval(approved: bool) -> Self {
        if approved {
            EnrollmentStatus::Passed
        } else {
            EnrollmentStatus::Failed
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

/// Enrollment joined with the student and course it links, as served by
/// `GET /enrollments/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentView {
    pub id: EnrollmentId,
    pub student_id: StudentId,
    pub student_name: String,
    pub course_id: CourseId,
    pub course_code: String,
    pub course_name: String,
    pub home_cycle: u8,
    pub enrollment_cycle: u8,
    pub attempt_number: u32,
    pub status: EnrollmentStatus,
    pub is_carry_over: bool,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnrollmentRequest {
    pub student_id: StudentId,
    #[serde(default)]
    pub courses: Vec<CourseId>,
}

/// Row about to be written by the enrollment writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEnrollment {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub home_cycle: u8,
    pub enrollment_cycle: u8,
    pub attempt_number: u32,
}

impl NewEnrollment {
    /// A course taken outside its home cycle is a carry-over; never stored, always derived.
    pub fn is_carry_over(&self) -> bool {
        self.home_cycle != self.enrollment_cycle
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrolledCourse {
    pub enrollment_id: EnrollmentId,
    pub course_id: CourseId,
    pub course_code: String,
    pub course_name: String,
    pub home_cycle: u8,
    pub enrollment_cycle: u8,
    pub attempt_number: u32,
    pub is_carry_over: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    CourseNotFound,
    CourseUnverifiable(String),
    AlreadyEnrolledThisCycle,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::CourseNotFound => f.write_str("course not found"),
            RejectionReason::CourseUnverifiable(detail) => {
                write!(f, "course could not be validated: {detail}")
            }
            RejectionReason::AlreadyEnrolledThisCycle => f.write_str("already enrolled this cycle"),
        }
    }
}

impl Serialize for RejectionReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedCourse {
    pub course_id: CourseId,
    pub reason: RejectionReason,
}

/// Per-course result of one enrollment submission.
#[derive(Debug, Clone, PartialEq)]
pub enum CourseOutcome {
    Accepted(EnrolledCourse),
    Rejected(RejectedCourse),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentReceipt {
    pub student_id: StudentId,
    pub enrollment_cycle: u8,
    pub enrolled: Vec<EnrolledCourse>,
    pub rejected: Vec<RejectedCourse>,
}

impl EnrollmentReceipt {
    pub fn from_outcomes(
        student_id: StudentId,
        enrollment_cycle: u8,
        outcomes: impl IntoIterator<Item = CourseOutcome>,
    ) -> Self {
        let mut enrolled = Vec::new();
        let mut rejected = Vec::new();
        for outcome in outcomes {
            match outcome {
                CourseOutcome::Accepted(course) => enrolled.push(course),
                CourseOutcome::Rejected(course) => rejected.push(course),
            }
        }
        Self {
            student_id,
            enrollment_cycle,
            enrolled,
            rejected,
        }
    }
}

/// One enrollment of a student, joined with its course and evaluation if graded.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    pub enrollment_id: EnrollmentId,
    pub course_id: CourseId,
    pub course_code: String,
    pub course_name: String,
    pub credits: u8,
    pub home_cycle: u8,
    pub enrollment_cycle: u8,
    pub attempt_number: u32,
    pub status: EnrollmentStatus,
    pub score: Option<f64>,
    pub approved: Option<bool>,
    pub evaluated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedCourse {
    pub course_id: CourseId,
    pub code: String,
    pub name: String,
    pub credits: u8,
    pub cycle: u8,
}

impl From<Course> for PlannedCourse {
    fn from(course: Course) -> Self {
        Self {
            course_id: course.id,
            code: course.code,
            name: course.name,
            credits: course.credits,
            cycle: course.cycle,
        }
    }
}

/// Failed course the student has not yet passed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarryOverCourse {
    pub course_id: CourseId,
    pub code: String,
    pub name: String,
    pub credits: u8,
    pub home_cycle: u8,
    pub last_attempt: u32,
    pub last_score: Option<f64>,
}

/// Advisory view of what a student may enroll in next.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentPlan {
    pub student_id: StudentId,
    pub current_cycle: u8,
    pub carry_over_courses: Vec<CarryOverCourse>,
    pub available_courses: Vec<PlannedCourse>,
    pub max_new_courses: usize,
    pub can_enroll: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
