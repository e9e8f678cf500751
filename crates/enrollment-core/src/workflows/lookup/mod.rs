//! Cross-service entity validation.
//!
//! Workflows never read another service's tables to confirm a student, course or
//! enrollment exists. They ask the owning service through an [`EntityLookup`], which
//! answers with an [`EntityCheck`] that keeps "not found" apart from "could not ask".

mod http;
mod local;

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use http::HttpEntityLookup;
pub use local::DirectoryLookup;

use super::enrollment::{EnrollmentId, EnrollmentView};
use super::registry::{Course, CourseId, Student, StudentId};
use super::WorkflowError;
use crate::context::RequestContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Student,
    Course,
    Enrollment,
}

impl EntityKind {
    /// Path segment of the owning service's read endpoint.
    pub fn resource(self) -> &'static str {
        match self {
            EntityKind::Student => "students",
            EntityKind::Course => "courses",
            EntityKind::Enrollment => "enrollments",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Student => "student",
            EntityKind::Course => "course",
            EntityKind::Enrollment => "enrollment",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of asking an owning service whether an entity exists and is active.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityCheck<T> {
    Found(T),
    Missing,
    /// The owning service could not be asked or gave an unusable answer.
    Unavailable { reason: String },
}

impl<T> EntityCheck<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, EntityCheck::Found(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            EntityCheck::Found(data) => Some(data),
            _ => None,
        }
    }

    pub fn message(&self, kind: EntityKind, id: i64) -> String {
        match self {
            EntityCheck::Found(_) => format!("{kind} {id} is valid"),
            EntityCheck::Missing => format!("{kind} {id} not found"),
            EntityCheck::Unavailable { reason } => {
                format!("could not validate {kind} {id}: {reason}")
            }
        }
    }

    /// Converts the check into the workflow taxonomy for entities a workflow cannot proceed without.
    pub fn into_required(self, kind: EntityKind, id: i64) -> Result<T, WorkflowError> {
        let message = self.message(kind, id);
        match self {
            EntityCheck::Found(data) => Ok(data),
            EntityCheck::Missing => Err(WorkflowError::NotFound(message)),
            EntityCheck::Unavailable { .. } => Err(WorkflowError::UpstreamUnavailable(message)),
        }
    }
}

impl EntityCheck<Value> {
    /// Decodes the owning service's payload; an undecodable payload counts as unavailable.
    pub fn decode<T: DeserializeOwned>(self, kind: EntityKind) -> EntityCheck<T> {
        match self {
            EntityCheck::Found(payload) => match serde_json::from_value(payload) {
                Ok(data) => EntityCheck::Found(data),
                Err(err) => EntityCheck::Unavailable {
                    reason: format!("unreadable {kind} payload: {err}"),
                },
            },
            EntityCheck::Missing => EntityCheck::Missing,
            EntityCheck::Unavailable { reason } => EntityCheck::Unavailable { reason },
        }
    }
}

/// Existence check against the service that owns an entity.
#[async_trait]
pub trait EntityLookup: Send + Sync {
    async fn validate(&self, ctx: &RequestContext, kind: EntityKind, id: i64)
        -> EntityCheck<Value>;

    async fn student(&self, ctx: &RequestContext, id: StudentId) -> EntityCheck<Student> {
        self.validate(ctx, EntityKind::Student, id.0)
            .await
            .decode(EntityKind::Student)
    }

    async fn course(&self, ctx: &RequestContext, id: CourseId) -> EntityCheck<Course> {
        self.validate(ctx, EntityKind::Course, id.0)
            .await
            .decode(EntityKind::Course)
    }

    async fn enrollment(
        &self,
        ctx: &RequestContext,
        id: EnrollmentId,
    ) -> EntityCheck<EnrollmentView> {
        self.validate(ctx, EntityKind::Enrollment, id.0)
            .await
            .decode(EntityKind::Enrollment)
    }
}
