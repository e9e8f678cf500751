use std::sync::Arc;

use tracing::info;

use super::domain::{EnrollmentId, EnrollmentPlan, EnrollmentReceipt, EnrollmentRequest, EnrollmentView};
use super::planner::EnrollmentPlanner;
use super::repository::EnrollmentRepository;
use super::writer::EnrollmentWriter;
use crate::context::RequestContext;
use crate::storage::Database;
use crate::workflows::lookup::EntityLookup;
use crate::workflows::registry::{CourseRepository, StudentId};
use crate::workflows::WorkflowError;

/// Enrollment-owning service: planning, writing and the enrollment read endpoints.
pub struct EnrollmentService<L> {
    planner: EnrollmentPlanner<L>,
    writer: EnrollmentWriter<L>,
    enrollments: EnrollmentRepository,
}

impl<L> EnrollmentService<L>
where
    L: EntityLookup + 'static,
{
    pub fn new(db: Database, lookup: Arc<L>) -> Self {
        let enrollments = EnrollmentRepository::new(db.clone());
        Self {
            planner: EnrollmentPlanner::new(
                Arc::clone(&lookup),
                enrollments.clone(),
                CourseRepository::new(db),
            ),
            writer: EnrollmentWriter::new(lookup, enrollments.clone()),
            enrollments,
        }
    }

    pub async fn plan(
        &self,
        ctx: &RequestContext,
        student_id: StudentId,
    ) -> Result<EnrollmentPlan, WorkflowError> {
        self.planner.plan(ctx, student_id).await
    }

    pub async fn enroll(
        &self,
        ctx: &RequestContext,
        request: EnrollmentRequest,
    ) -> Result<EnrollmentReceipt, WorkflowError> {
        self.writer.enroll(ctx, request).await
    }

    pub fn list(&self) -> Result<Vec<EnrollmentView>, WorkflowError> {
        Ok(self.enrollments.list()?)
    }

    pub fn get(&self, id: EnrollmentId) -> Result<EnrollmentView, WorkflowError> {
        self.enrollments
            .fetch(id)?
            .ok_or_else(|| enrollment_not_found(id))
    }

    pub fn delete(&self, ctx: &RequestContext, id: EnrollmentId) -> Result<(), WorkflowError> {
        if self.enrollments.delete(id)? {
            info!(trace_id = %ctx.trace_id(), enrollment_id = %id, "enrollment removed");
            Ok(())
        } else {
            Err(enrollment_not_found(id))
        }
    }
}

fn enrollment_not_found(id: EnrollmentId) -> WorkflowError {
    WorkflowError::NotFound(format!("enrollment {id} not found"))
}
