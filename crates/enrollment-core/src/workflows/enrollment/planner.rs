use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tracing::info;

use super::domain::{
    AttemptRecord, CarryOverCourse, EnrollmentPlan, EnrollmentStatus, PlannedCourse,
    MAX_COURSES_PER_ENROLLMENT,
};
use super::repository::EnrollmentRepository;
use crate::context::RequestContext;
use crate::workflows::lookup::{EntityKind, EntityLookup};
use crate::workflows::registry::{CourseId, CourseRepository, StudentId};
use crate::workflows::WorkflowError;

/// Computes carry-overs, the available catalog and the course load for a student.
pub struct EnrollmentPlanner<L> {
    lookup: Arc<L>,
    enrollments: EnrollmentRepository,
    courses: CourseRepository,
}

impl<L> EnrollmentPlanner<L>
where
    L: EntityLookup + 'static,
{
    pub fn new(lookup: Arc<L>, enrollments: EnrollmentRepository, courses: CourseRepository) -> Self {
        Self {
            lookup,
            enrollments,
            courses,
        }
    }

    pub async fn plan(
        &self,
        ctx: &RequestContext,
        student_id: StudentId,
    ) -> Result<EnrollmentPlan, WorkflowError> {
        let student = self
            .lookup
            .student(ctx, student_id)
            .await
            .into_required(EntityKind::Student, student_id.0)?;

        let attempts = self.enrollments.attempts_for_student(student_id)?;
        let carry_over_courses = carry_over_courses(&attempts);

        let held: HashSet<CourseId> = attempts
            .iter()
            .filter(|attempt| attempt.status == EnrollmentStatus::Enrolled)
            .map(|attempt| attempt.course_id)
            .collect();
        let available_courses: Vec<PlannedCourse> = self
            .courses
            .active_in_cycle(student.current_cycle)?
            .into_iter()
            .filter(|course| !held.contains(&course.id))
            .map(PlannedCourse::from)
            .collect();

        let (max_new_courses, can_enroll, reason) = course_load(carry_over_courses.len());

        info!(
            trace_id = %ctx.trace_id(),
            student_id = %student_id,
            current_cycle = student.current_cycle,
            carry_over = carry_over_courses.len(),
            available = available_courses.len(),
            max_new_courses,
            "enrollment plan computed"
        );

        Ok(EnrollmentPlan {
            student_id,
            current_cycle: student.current_cycle,
            carry_over_courses,
            available_courses,
            max_new_courses,
            can_enroll,
            reason,
        })
    }
}

/// Courses with at least one failing evaluation and no passing one, ordered by home
/// cycle then code.
pub fn carry_over_courses(attempts: &[AttemptRecord]) -> Vec<CarryOverCourse> {
    let mut by_course: BTreeMap<CourseId, Vec<&AttemptRecord>> = BTreeMap::new();
    for attempt in attempts {
        by_course.entry(attempt.course_id).or_default().push(attempt);
    }

    let mut carry_over: Vec<CarryOverCourse> = by_course
        .into_values()
        .filter_map(|course_attempts| {
            let passed = course_attempts
                .iter()
                .any(|attempt| attempt.approved == Some(true));
            let failed = course_attempts
                .iter()
                .any(|attempt| attempt.approved == Some(false));
            if passed || !failed {
                return None;
            }

            let latest = course_attempts
                .iter()
                .max_by_key(|attempt| (attempt.attempt_number, attempt.enrollment_cycle))?;
            let last_score = course_attempts
                .iter()
                .filter(|attempt| attempt.score.is_some())
                .max_by_key(|attempt| (attempt.attempt_number, attempt.enrollment_cycle))
                .and_then(|attempt| attempt.score);

            Some(CarryOverCourse {
                course_id: latest.course_id,
                code: latest.course_code.clone(),
                name: latest.course_name.clone(),
                credits: latest.credits,
                home_cycle: latest.home_cycle,
                last_attempt: latest.attempt_number,
                last_score,
            })
        })
        .collect();

    carry_over.sort_by(|a, b| {
        a.home_cycle
            .cmp(&b.home_cycle)
            .then_with(|| a.code.cmp(&b.code))
    });
    carry_over
}

/// Advisory load: the writer's per-call cap stays the authoritative limit.
fn course_load(carry_over: usize) -> (usize, bool, Option<String>) {
    let max_new_courses = MAX_COURSES_PER_ENROLLMENT.saturating_sub(carry_over);
    if carry_over >= MAX_COURSES_PER_ENROLLMENT {
        (
            max_new_courses,
            false,
            Some(format!(
                "student has {carry_over} unresolved carry-over courses; at most {MAX_COURSES_PER_ENROLLMENT} may be carried"
            )),
        )
    } else {
        (max_new_courses, true, None)
    }
}
