use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{EntityCheck, EntityKind, EntityLookup};
use crate::context::RequestContext;
use crate::storage::{Database, RepositoryError, RepositoryResult};
use crate::workflows::enrollment::{EnrollmentId, EnrollmentRepository};
use crate::workflows::registry::{CourseId, CourseRepository, StudentId, StudentRepository};

/// In-process lookup reading the owning repositories directly.
///
/// Answers with the same payloads the HTTP read endpoints serve, so workflows behave
/// identically whichever implementation is wired in.
#[derive(Clone)]
pub struct DirectoryLookup {
    students: StudentRepository,
    courses: CourseRepository,
    enrollments: EnrollmentRepository,
}

impl DirectoryLookup {
    pub fn new(db: Database) -> Self {
        Self {
            students: StudentRepository::new(db.clone()),
            courses: CourseRepository::new(db.clone()),
            enrollments: EnrollmentRepository::new(db),
        }
    }

    fn read(&self, kind: EntityKind, id: i64) -> RepositoryResult<Option<Value>> {
        match kind {
            EntityKind::Student => to_payload(self.students.find_active(StudentId(id))?),
            EntityKind::Course => to_payload(self.courses.find_active(CourseId(id))?),
            EntityKind::Enrollment => to_payload(self.enrollments.fetch(EnrollmentId(id))?),
        }
    }
}

fn to_payload<T: Serialize>(entity: Option<T>) -> RepositoryResult<Option<Value>> {
    entity
        .map(|entity| {
            serde_json::to_value(entity).map_err(|err| RepositoryError::FieldValueError {
                field: "payload".to_string(),
                message: err.to_string(),
            })
        })
        .transpose()
}

#[async_trait]
impl EntityLookup for DirectoryLookup {
    async fn validate(
        &self,
        ctx: &RequestContext,
        kind: EntityKind,
        id: i64,
    ) -> EntityCheck<Value> {
        let check = match self.read(kind, id) {
            Ok(Some(payload)) => EntityCheck::Found(payload),
            Ok(None) => EntityCheck::Missing,
            Err(err) => EntityCheck::Unavailable {
                reason: err.to_string(),
            },
        };
        debug!(
            trace_id = %ctx.trace_id(),
            %kind,
            id,
            valid = check.is_valid(),
            "entity validated in-process"
        );
        check
    }
}
