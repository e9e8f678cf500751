use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use super::domain::{CourseDraft, CourseId, StudentDraft, StudentId};
use super::service::RegistryService;
use crate::workflows::{JsonBody, WorkflowError};

/// Student and course endpoints. `GET /students/:id` and `GET /courses/:id` are the
/// read endpoints other services validate against.
pub fn registry_router(service: Arc<RegistryService>) -> Router {
    Router::new()
        .route("/students", get(list_students).post(create_student))
        .route(
            "/students/:student_id",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/:course_id",
            get(get_course).put(update_course).delete(delete_course),
        )
        .with_state(service)
}

async fn list_students(
    State(service): State<Arc<RegistryService>>,
) -> Result<Response, WorkflowError> {
    let students = service.list_students()?;
    Ok(Json(students).into_response())
}

async fn get_student(
    State(service): State<Arc<RegistryService>>,
    Path(student_id): Path<i64>,
) -> Result<Response, WorkflowError> {
    let student = service.get_student(StudentId(student_id))?;
    Ok(Json(student).into_response())
}

async fn create_student(
    State(service): State<Arc<RegistryService>>,
    JsonBody(draft): JsonBody<StudentDraft>,
) -> Result<Response, WorkflowError> {
    let student = service.create_student(draft)?;
    Ok((StatusCode::CREATED, Json(student)).into_response())
}

async fn update_student(
    State(service): State<Arc<RegistryService>>,
    Path(student_id): Path<i64>,
    JsonBody(draft): JsonBody<StudentDraft>,
) -> Result<Response, WorkflowError> {
    let student = service.update_student(StudentId(student_id), draft)?;
    Ok(Json(student).into_response())
}

async fn delete_student(
    State(service): State<Arc<RegistryService>>,
    Path(student_id): Path<i64>,
) -> Result<Response, WorkflowError> {
    service.deactivate_student(StudentId(student_id))?;
    Ok(Json(json!({ "id": student_id, "message": "student deactivated" })).into_response())
}

async fn list_courses(
    State(service): State<Arc<RegistryService>>,
) -> Result<Response, WorkflowError> {
    let courses = service.list_courses()?;
    Ok(Json(courses).into_response())
}

async fn get_course(
    State(service): State<Arc<RegistryService>>,
    Path(course_id): Path<i64>,
) -> Result<Response, WorkflowError> {
    let course = service.get_course(CourseId(course_id))?;
    Ok(Json(course).into_response())
}

async fn create_course(
    State(service): State<Arc<RegistryService>>,
    JsonBody(draft): JsonBody<CourseDraft>,
) -> Result<Response, WorkflowError> {
    let course = service.create_course(draft)?;
    Ok((StatusCode::CREATED, Json(course)).into_response())
}

async fn update_course(
    State(service): State<Arc<RegistryService>>,
    Path(course_id): Path<i64>,
    JsonBody(draft): JsonBody<CourseDraft>,
) -> Result<Response, WorkflowError> {
    let course = service.update_course(CourseId(course_id), draft)?;
    Ok(Json(course).into_response())
}

async fn delete_course(
    State(service): State<Arc<RegistryService>>,
    Path(course_id): Path<i64>,
) -> Result<Response, WorkflowError> {
    service.deactivate_course(CourseId(course_id))?;
    Ok(Json(json!({ "id": course_id, "message": "course deactivated" })).into_response())
}
