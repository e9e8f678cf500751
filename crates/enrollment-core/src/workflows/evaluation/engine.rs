use std::sync::Arc;

use tracing::info;

use super::domain::{
    EvaluationId, EvaluationRequest, EvaluationView, GradedEvaluation, PendingEvaluation, Score,
};
use super::repository::EvaluationRepository;
use crate::context::RequestContext;
use crate::storage::Database;
use crate::workflows::enrollment::{EnrollmentId, EnrollmentStatus};
use crate::workflows::lookup::{EntityKind, EntityLookup};
use crate::workflows::WorkflowError;

/// Records grades and keeps enrollment status in step with them.
pub struct EvaluationEngine<L> {
    lookup: Arc<L>,
    evaluations: EvaluationRepository,
}

impl<L> EvaluationEngine<L>
where
    L: EntityLookup + 'static,
{
    pub fn new(db: Database, lookup: Arc<L>) -> Self {
        Self {
            lookup,
            evaluations: EvaluationRepository::new(db),
        }
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        request: EvaluationRequest,
    ) -> Result<GradedEvaluation, WorkflowError> {
        let score = Score::new(request.score)?;
        let enrollment_id = request.enrollment_id;
        self.lookup
            .enrollment(ctx, enrollment_id)
            .await
            .into_required(EntityKind::Enrollment, enrollment_id.0)?;

        let status = EnrollmentStatus::from_approval(score.is_passing());
        let graded = self.evaluations.transaction(|tx| -> Result<_, WorkflowError> {
            if tx.find_by_enrollment(enrollment_id)?.is_some() {
                return Err(WorkflowError::Conflict(format!(
                    "enrollment {enrollment_id} already has an evaluation"
                )));
            }
            if !tx.set_enrollment_status(enrollment_id, status)? {
                return Err(enrollment_not_found(enrollment_id));
            }
            let evaluation = tx.insert(enrollment_id, score)?;
            Ok(GradedEvaluation {
                evaluation,
                enrollment_status: status,
            })
        })?;

        info!(
            trace_id = %ctx.trace_id(),
            evaluation_id = %graded.evaluation.id,
            enrollment_id = %enrollment_id,
            score = score.value(),
            status = %status,
            "evaluation recorded"
        );
        Ok(graded)
    }

    pub fn update(
        &self,
        ctx: &RequestContext,
        evaluation_id: EvaluationId,
        score: f64,
    ) -> Result<GradedEvaluation, WorkflowError> {
        let score = Score::new(score)?;
        let status = EnrollmentStatus::from_approval(score.is_passing());
        let graded = self.evaluations.transaction(|tx| -> Result<_, WorkflowError> {
            let existing = tx
                .fetch(evaluation_id)?
                .ok_or_else(|| evaluation_not_found(evaluation_id))?;
            let evaluation = tx.update_score(&existing, score)?;
            if !tx.set_enrollment_status(existing.enrollment_id, status)? {
                return Err(enrollment_not_found(existing.enrollment_id));
            }
            Ok(GradedEvaluation {
                evaluation,
                enrollment_status: status,
            })
        })?;

        info!(
            trace_id = %ctx.trace_id(),
            evaluation_id = %evaluation_id,
            score = score.value(),
            status = %status,
            "evaluation updated"
        );
        Ok(graded)
    }

    /// Removes the grade and returns its enrollment to `ENROLLED`.
    pub fn delete(&self, ctx: &RequestContext, evaluation_id: EvaluationId) -> Result<(), WorkflowError> {
        let enrollment_id = self.evaluations.transaction(|tx| -> Result<_, WorkflowError> {
            let existing = tx
                .fetch(evaluation_id)?
                .ok_or_else(|| evaluation_not_found(evaluation_id))?;
            if !tx.set_enrollment_status(existing.enrollment_id, EnrollmentStatus::Enrolled)? {
                return Err(enrollment_not_found(existing.enrollment_id));
            }
            if !tx.delete(evaluation_id)? {
                return Err(evaluation_not_found(evaluation_id));
            }
            Ok(existing.enrollment_id)
        })?;

        info!(
            trace_id = %ctx.trace_id(),
            evaluation_id = %evaluation_id,
            enrollment_id = %enrollment_id,
            "evaluation deleted"
        );
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<EvaluationView>, WorkflowError> {
        Ok(self.evaluations.list()?)
    }

    pub fn get(&self, evaluation_id: EvaluationId) -> Result<EvaluationView, WorkflowError> {
        self.evaluations
            .find(evaluation_id)?
            .ok_or_else(|| evaluation_not_found(evaluation_id))
    }

    pub fn pending(&self) -> Result<Vec<PendingEvaluation>, WorkflowError> {
        Ok(self.evaluations.pending()?)
    }
}

fn evaluation_not_found(id: EvaluationId) -> WorkflowError {
    WorkflowError::NotFound(format!("evaluation {id} not found"))
}

fn enrollment_not_found(id: EnrollmentId) -> WorkflowError {
    WorkflowError::NotFound(format!("enrollment {id} not found"))
}
