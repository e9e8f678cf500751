//! Enrollment planning and writing.
//!
//! The planner is advisory: it reports carry-overs, the open catalog of the student's
//! current cycle and a suggested load. The writer enforces the hard rules (at most six
//! courses per submission, one enrollment per course and cycle) and numbers attempts.

pub mod domain;
pub mod planner;
pub mod repository;
pub mod router;
pub mod service;
pub mod writer;

#[cfg(test)]
mod tests;

pub use domain::{
    AttemptRecord, CarryOverCourse, CourseOutcome, EnrolledCourse, EnrollmentId, EnrollmentPlan,
    EnrollmentReceipt, EnrollmentRequest, EnrollmentStatus, EnrollmentView, NewEnrollment,
    PlannedCourse, RejectedCourse, RejectionReason, MAX_COURSES_PER_ENROLLMENT,
};
pub use planner::{carry_over_courses, EnrollmentPlanner};
pub use repository::{EnrollmentRepository, EnrollmentTransaction};
pub use router::enrollment_router;
pub use service::EnrollmentService;
pub use writer::EnrollmentWriter;
