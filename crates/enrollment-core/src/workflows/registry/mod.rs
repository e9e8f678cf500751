//! Student and course registry: the owning services the workflows validate against.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    Course, CourseDraft, CourseId, NewCourse, NewStudent, Student, StudentDraft, StudentId,
    MAX_CYCLE, MIN_CYCLE,
};
pub use repository::{CourseRepository, StudentRepository};
pub use router::registry_router;
pub use service::RegistryService;
pub use validation::{validate_course, validate_student};
