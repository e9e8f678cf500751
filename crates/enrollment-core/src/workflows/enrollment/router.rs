use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::domain::{EnrollmentId, EnrollmentRequest};
use super::service::EnrollmentService;
use crate::context::RequestContext;
use crate::workflows::lookup::EntityLookup;
use crate::workflows::registry::StudentId;
use crate::workflows::{JsonBody, WorkflowError};

pub fn enrollment_router<L>(service: Arc<EnrollmentService<L>>) -> Router
where
    L: EntityLookup + 'static,
{
    Router::new()
        .route("/enrollments", get(list_handler::<L>))
        .route("/enrollments/flexible", post(enroll_handler::<L>))
        .route(
            "/enrollments/available/:student_id",
            get(available_handler::<L>),
        )
        .route(
            "/enrollments/:enrollment_id",
            get(get_handler::<L>).delete(delete_handler::<L>),
        )
        .with_state(service)
}

pub(crate) async fn enroll_handler<L>(
    State(service): State<Arc<EnrollmentService<L>>>,
    ctx: RequestContext,
    JsonBody(request): JsonBody<EnrollmentRequest>,
) -> Result<Response, WorkflowError>
where
    L: EntityLookup + 'static,
{
    let receipt = service.enroll(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(receipt)).into_response())
}

pub(crate) async fn available_handler<L>(
    State(service): State<Arc<EnrollmentService<L>>>,
    ctx: RequestContext,
    Path(student_id): Path<i64>,
) -> Result<Response, WorkflowError>
where
    L: EntityLookup + 'static,
{
    let plan = service.plan(&ctx, StudentId(student_id)).await?;
    Ok(Json(plan).into_response())
}

async fn list_handler<L>(
    State(service): State<Arc<EnrollmentService<L>>>,
) -> Result<Response, WorkflowError>
where
    L: EntityLookup + 'static,
{
    Ok(Json(service.list()?).into_response())
}

async fn get_handler<L>(
    State(service): State<Arc<EnrollmentService<L>>>,
    Path(enrollment_id): Path<i64>,
) -> Result<Response, WorkflowError>
where
    L: EntityLookup + 'static,
{
    Ok(Json(service.get(EnrollmentId(enrollment_id))?).into_response())
}

async fn delete_handler<L>(
    State(service): State<Arc<EnrollmentService<L>>>,
    ctx: RequestContext,
    Path(enrollment_id): Path<i64>,
) -> Result<Response, WorkflowError>
where
    L: EntityLookup + 'static,
{
    service.delete(&ctx, EnrollmentId(enrollment_id))?;
    Ok(Json(json!({ "id": enrollment_id, "message": "enrollment removed" })).into_response())
}
