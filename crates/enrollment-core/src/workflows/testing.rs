//! Shared fixtures for workflow unit tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use super::enrollment::{EnrollmentId, EnrollmentReceipt, EnrollmentRequest};
use super::evaluation::{EvaluationRequest, GradedEvaluation};
use super::lookup::{DirectoryLookup, EntityCheck, EntityKind, EntityLookup};
use super::registry::{Course, CourseDraft, CourseId, Student, StudentDraft, StudentId};
use super::AcademicServices;
use crate::context::RequestContext;
use crate::storage::Database;

pub(crate) fn ctx() -> RequestContext {
    RequestContext::new()
}

/// In-memory campus wired with the in-process lookup.
pub(crate) struct Campus {
    pub db: Database,
    pub services: AcademicServices<DirectoryLookup>,
    next_dni: AtomicU32,
}

impl Campus {
    pub fn new() -> Self {
        let db = Database::in_memory().expect("in-memory database");
        let lookup = Arc::new(DirectoryLookup::new(db.clone()));
        Self {
            services: AcademicServices::new(db.clone(), lookup),
            db,
            next_dni: AtomicU32::new(70_000_001),
        }
    }

    pub fn student(&self, current_cycle: u8) -> Student {
        let dni = self.next_dni.fetch_add(1, Ordering::Relaxed);
        self.services
            .registry
            .create_student(StudentDraft {
                first_name: "Ana".to_string(),
                last_name: "Torres Ruiz".to_string(),
                age: Some(21),
                dni: dni.to_string(),
                email: None,
                phone: None,
                current_cycle: Some(i64::from(current_cycle)),
            })
            .expect("student created")
    }

    pub fn course(&self, code: &str, cycle: u8) -> Course {
        self.services
            .registry
            .create_course(CourseDraft {
                code: code.to_string(),
                name: format!("Curso {code}"),
                credits: Some(4),
                cycle: Some(i64::from(cycle)),
            })
            .expect("course created")
    }

    pub fn move_to_cycle(&self, student_id: StudentId, cycle: u8) {
        let conn = self.db.connection().expect("lock");
        conn.execute(
            "UPDATE students SET current_cycle = ?1 WHERE id = ?2",
            rusqlite::params![cycle, student_id.0],
        )
        .expect("cycle updated");
    }

    pub async fn enroll(&self, student_id: StudentId, courses: &[CourseId]) -> EnrollmentReceipt {
        self.services
            .enrollments
            .enroll(
                &ctx(),
                EnrollmentRequest {
                    student_id,
                    courses: courses.to_vec(),
                },
            )
            .await
            .expect("enrollment accepted")
    }

    pub async fn grade(&self, enrollment_id: EnrollmentId, score: f64) -> GradedEvaluation {
        self.services
            .evaluations
            .create(
                &ctx(),
                EvaluationRequest {
                    enrollment_id,
                    score,
                },
            )
            .await
            .expect("evaluation recorded")
    }
}

/// Lookup whose owning service for one entity kind is unreachable.
pub(crate) struct OutageLookup {
    inner: DirectoryLookup,
    down: EntityKind,
}

impl OutageLookup {
    pub fn new(db: Database, down: EntityKind) -> Self {
        Self {
            inner: DirectoryLookup::new(db),
            down,
        }
    }
}

#[async_trait]
impl EntityLookup for OutageLookup {
    async fn validate(
        &self,
        ctx: &RequestContext,
        kind: EntityKind,
        id: i64,
    ) -> EntityCheck<Value> {
        if kind == self.down {
            EntityCheck::Unavailable {
                reason: format!("{kind} service unreachable: connection refused"),
            }
        } else {
            self.inner.validate(ctx, kind, id).await
        }
    }
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json body")
}
