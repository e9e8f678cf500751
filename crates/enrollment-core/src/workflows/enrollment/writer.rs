use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{
    CourseOutcome, EnrolledCourse, EnrollmentReceipt, EnrollmentRequest, NewEnrollment,
    RejectedCourse, RejectionReason, MAX_COURSES_PER_ENROLLMENT,
};
use super::repository::EnrollmentRepository;
use crate::context::RequestContext;
use crate::workflows::lookup::{EntityCheck, EntityKind, EntityLookup};
use crate::workflows::registry::{Course, CourseId};
use crate::workflows::WorkflowError;

/// Course that either passed validation or was already turned away.
enum Candidate {
    Ready(Course),
    Rejected(RejectedCourse),
}

/// Persists a multi-course enrollment with per-course outcomes.
pub struct EnrollmentWriter<L> {
    lookup: Arc<L>,
    enrollments: EnrollmentRepository,
}

impl<L> EnrollmentWriter<L>
where
    L: EntityLookup + 'static,
{
    pub fn new(lookup: Arc<L>, enrollments: EnrollmentRepository) -> Self {
        Self {
            lookup,
            enrollments,
        }
    }

    /// Validates every course with its owning service first, then runs the duplicate
    /// checks, attempt numbering and inserts in one IMMEDIATE transaction.
    pub async fn enroll(
        &self,
        ctx: &RequestContext,
        request: EnrollmentRequest,
    ) -> Result<EnrollmentReceipt, WorkflowError> {
        let requested = request.courses.len();
        if requested == 0 {
            return Err(WorkflowError::InvalidInput(
                "at least one course must be selected".to_string(),
            ));
        }
        if requested > MAX_COURSES_PER_ENROLLMENT {
            return Err(WorkflowError::InvalidInput(format!(
                "at most {MAX_COURSES_PER_ENROLLMENT} courses may be enrolled at once, got {requested}"
            )));
        }

        let student = self
            .lookup
            .student(ctx, request.student_id)
            .await
            .into_required(EntityKind::Student, request.student_id.0)?;
        let enrollment_cycle = student.current_cycle;

        let mut candidates = Vec::with_capacity(requested);
        for course_id in &request.courses {
            candidates.push(self.screen(ctx, *course_id).await);
        }

        let outcomes = self.enrollments.transaction(|tx| -> Result<Vec<CourseOutcome>, WorkflowError> {
            let mut outcomes = Vec::with_capacity(candidates.len());
            for candidate in candidates {
                let course = match candidate {
                    Candidate::Ready(course) => course,
                    Candidate::Rejected(rejected) => {
                        outcomes.push(CourseOutcome::Rejected(rejected));
                        continue;
                    }
                };

                if tx.exists_in_cycle(student.id, course.id, enrollment_cycle)? {
                    outcomes.push(already_enrolled(course.id));
                    continue;
                }

                let enrollment = NewEnrollment {
                    student_id: student.id,
                    course_id: course.id,
                    home_cycle: course.cycle,
                    enrollment_cycle,
                    attempt_number: tx.attempt_count(student.id, course.id)? + 1,
                };
                match tx.insert(&enrollment) {
                    Ok(enrollment_id) => outcomes.push(CourseOutcome::Accepted(EnrolledCourse {
                        enrollment_id,
                        course_id: course.id,
                        course_code: course.code,
                        course_name: course.name,
                        home_cycle: enrollment.home_cycle,
                        enrollment_cycle,
                        attempt_number: enrollment.attempt_number,
                        is_carry_over: enrollment.is_carry_over(),
                    })),
                    Err(err) if err.is_unique_violation() => {
                        outcomes.push(already_enrolled(course.id))
                    }
                    Err(err) => return Err(WorkflowError::from(err)),
                }
            }
            Ok(outcomes)
        })?;

        let receipt = EnrollmentReceipt::from_outcomes(student.id, enrollment_cycle, outcomes);
        info!(
            trace_id = %ctx.trace_id(),
            student_id = %student.id,
            enrollment_cycle,
            enrolled = receipt.enrolled.len(),
            rejected = receipt.rejected.len(),
            "enrollment submission processed"
        );
        Ok(receipt)
    }

    async fn screen(&self, ctx: &RequestContext, course_id: CourseId) -> Candidate {
        let reason = match self.lookup.course(ctx, course_id).await {
            EntityCheck::Found(course) => return Candidate::Ready(course),
            EntityCheck::Missing => RejectionReason::CourseNotFound,
            EntityCheck::Unavailable { reason } => RejectionReason::CourseUnverifiable(reason),
        };
        warn!(
            trace_id = %ctx.trace_id(),
            course_id = %course_id,
            reason = %reason,
            "course rejected during validation"
        );
        Candidate::Rejected(RejectedCourse { course_id, reason })
    }
}

fn already_enrolled(course_id: CourseId) -> CourseOutcome {
    CourseOutcome::Rejected(RejectedCourse {
        course_id,
        reason: RejectionReason::AlreadyEnrolledThisCycle,
    })
}
