pub mod enrollment;
mod error;
pub mod evaluation;
mod extract;
pub mod lookup;
pub mod registry;
pub mod reporting;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use axum::Router;

pub use error::WorkflowError;
pub use extract::JsonBody;

use crate::storage::Database;
use enrollment::{enrollment_router, EnrollmentService};
use evaluation::{evaluation_router, EvaluationEngine};
use lookup::EntityLookup;
use registry::{registry_router, RegistryService};
use reporting::{reporting_router, HistoryReporter};

/// Every academic service of one deployment, sharing a database and an entity lookup.
pub struct AcademicServices<L> {
    pub registry: Arc<RegistryService>,
    pub enrollments: Arc<EnrollmentService<L>>,
    pub evaluations: Arc<EvaluationEngine<L>>,
    pub reports: Arc<HistoryReporter>,
}

impl<L> AcademicServices<L>
where
    L: EntityLookup + 'static,
{
    pub fn new(db: Database, lookup: Arc<L>) -> Self {
        Self {
            registry: Arc::new(RegistryService::new(db.clone())),
            enrollments: Arc::new(EnrollmentService::new(db.clone(), Arc::clone(&lookup))),
            evaluations: Arc::new(EvaluationEngine::new(db.clone(), lookup)),
            reports: Arc::new(HistoryReporter::new(db)),
        }
    }

    /// Merged routes of the registry, enrollment, evaluation and reporting services.
    pub fn router(&self) -> Router {
        Router::new()
            .merge(registry_router(Arc::clone(&self.registry)))
            .merge(enrollment_router(Arc::clone(&self.enrollments)))
            .merge(evaluation_router(Arc::clone(&self.evaluations)))
            .merge(reporting_router(Arc::clone(&self.reports)))
    }
}
