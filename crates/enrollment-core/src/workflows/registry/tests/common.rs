use std::sync::Arc;

pub(super) use crate::workflows::testing::read_json_body;

use crate::storage::Database;
use crate::workflows::registry::{CourseDraft, RegistryService, StudentDraft};

pub(super) fn registry() -> RegistryService {
    RegistryService::new(Database::in_memory().expect("in-memory database"))
}

pub(super) fn shared_registry() -> Arc<RegistryService> {
    Arc::new(registry())
}

pub(super) fn student_draft(dni: &str) -> StudentDraft {
    StudentDraft {
        first_name: "Juan".to_string(),
        last_name: "Pérez García".to_string(),
        age: Some(20),
        dni: dni.to_string(),
        email: Some("juan.perez@univ.edu.pe".to_string()),
        phone: Some("987654321".to_string()),
        current_cycle: Some(1),
    }
}

pub(super) fn course_draft(code: &str, cycle: i64) -> CourseDraft {
    CourseDraft {
        code: code.to_string(),
        name: "Matemática Básica".to_string(),
        credits: Some(4),
        cycle: Some(cycle),
    }
}
