use tracing::info;

use super::domain::{Course, CourseDraft, CourseId, Student, StudentDraft, StudentId};
use super::repository::{CourseRepository, StudentRepository};
use super::validation::{validate_course, validate_student};
use crate::storage::{Database, RepositoryError};
use crate::workflows::WorkflowError;

/// Owning service for students and courses.
#[derive(Clone)]
pub struct RegistryService {
    students: StudentRepository,
    courses: CourseRepository,
}

impl RegistryService {
    pub fn new(db: Database) -> Self {
        Self {
            students: StudentRepository::new(db.clone()),
            courses: CourseRepository::new(db),
        }
    }

    pub fn students(&self) -> &StudentRepository {
        &self.students
    }

    pub fn courses(&self) -> &CourseRepository {
        &self.courses
    }

    pub fn list_students(&self) -> Result<Vec<Student>, WorkflowError> {
        Ok(self.students.list_active()?)
    }

    pub fn get_student(&self, id: StudentId) -> Result<Student, WorkflowError> {
        self.students
            .find_active(id)?
            .ok_or_else(|| student_not_found(id))
    }

    pub fn create_student(&self, draft: StudentDraft) -> Result<Student, WorkflowError> {
        let student = validate_student(&draft).map_err(WorkflowError::InvalidFields)?;
        let created = self
            .students
            .insert(&student)
            .map_err(|err| duplicate_dni(err, &student.dni))?;
        info!(student_id = %created.id, cycle = created.current_cycle, "student registered");
        Ok(created)
    }

    pub fn update_student(
        &self,
        id: StudentId,
        draft: StudentDraft,
    ) -> Result<Student, WorkflowError> {
        let student = validate_student(&draft).map_err(WorkflowError::InvalidFields)?;
        self.students
            .update(id, &student)
            .map_err(|err| duplicate_dni(err, &student.dni))?
            .ok_or_else(|| student_not_found(id))
    }

    pub fn deactivate_student(&self, id: StudentId) -> Result<(), WorkflowError> {
        if self.students.deactivate(id)? {
            info!(student_id = %id, "student deactivated");
            Ok(())
        } else {
            Err(student_not_found(id))
        }
    }

    pub fn list_courses(&self) -> Result<Vec<Course>, WorkflowError> {
        Ok(self.courses.list_active()?)
    }

    pub fn get_course(&self, id: CourseId) -> Result<Course, WorkflowError> {
        self.courses
            .find_active(id)?
            .ok_or_else(|| course_not_found(id))
    }

    pub fn create_course(&self, draft: CourseDraft) -> Result<Course, WorkflowError> {
        let course = validate_course(&draft).map_err(WorkflowError::InvalidFields)?;
        let created = self
            .courses
            .insert(&course)
            .map_err(|err| duplicate_code(err, &course.code))?;
        info!(course_id = %created.id, code = %created.code, "course registered");
        Ok(created)
    }

    pub fn update_course(&self, id: CourseId, draft: CourseDraft) -> Result<Course, WorkflowError> {
        let course = validate_course(&draft).map_err(WorkflowError::InvalidFields)?;
        self.courses
            .update(id, &course)
            .map_err(|err| duplicate_code(err, &course.code))?
            .ok_or_else(|| course_not_found(id))
    }

    pub fn deactivate_course(&self, id: CourseId) -> Result<(), WorkflowError> {
        if self.courses.deactivate(id)? {
            info!(course_id = %id, "course deactivated");
            Ok(())
        } else {
            Err(course_not_found(id))
        }
    }
}

fn student_not_found(id: StudentId) -> WorkflowError {
    WorkflowError::NotFound(format!("student {id} not found"))
}

fn course_not_found(id: CourseId) -> WorkflowError {
    WorkflowError::NotFound(format!("course {id} not found"))
}

fn duplicate_dni(err: RepositoryError, dni: &str) -> WorkflowError {
    if err.is_unique_violation() {
        WorkflowError::Conflict(format!("a student with dni {dni} is already registered"))
    } else {
        err.into()
    }
}

fn duplicate_code(err: RepositoryError, code: &str) -> WorkflowError {
    if err.is_unique_violation() {
        WorkflowError::Conflict(format!("course code {code} is already registered"))
    } else {
        err.into()
    }
}
