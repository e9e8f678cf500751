use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use super::domain::{EvaluationId, EvaluationRequest, ScoreUpdate};
use super::engine::EvaluationEngine;
use crate::context::RequestContext;
use crate::workflows::lookup::EntityLookup;
use crate::workflows::{JsonBody, WorkflowError};

pub fn evaluation_router<L>(engine: Arc<EvaluationEngine<L>>) -> Router
where
    L: EntityLookup + 'static,
{
    Router::new()
        .route(
            "/evaluations",
            get(list_handler::<L>).post(create_handler::<L>),
        )
        .route("/evaluations/pending", get(pending_handler::<L>))
        .route(
            "/evaluations/:evaluation_id",
            get(get_handler::<L>)
                .put(update_handler::<L>)
                .delete(delete_handler::<L>),
        )
        .with_state(engine)
}

pub(crate) async fn create_handler<L>(
    State(engine): State<Arc<EvaluationEngine<L>>>,
    ctx: RequestContext,
    JsonBody(request): JsonBody<EvaluationRequest>,
) -> Result<Response, WorkflowError>
where
    L: EntityLookup + 'static,
{
    let graded = engine.create(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(graded)).into_response())
}

async fn update_handler<L>(
    State(engine): State<Arc<EvaluationEngine<L>>>,
    ctx: RequestContext,
    Path(evaluation_id): Path<i64>,
    JsonBody(update): JsonBody<ScoreUpdate>,
) -> Result<Response, WorkflowError>
where
    L: EntityLookup + 'static,
{
    let graded = engine.update(&ctx, EvaluationId(evaluation_id), update.score)?;
    Ok(Json(graded).into_response())
}

async fn delete_handler<L>(
    State(engine): State<Arc<EvaluationEngine<L>>>,
    ctx: RequestContext,
    Path(evaluation_id): Path<i64>,
) -> Result<Response, WorkflowError>
where
    L: EntityLookup + 'static,
{
    engine.delete(&ctx, EvaluationId(evaluation_id))?;
    Ok(Json(json!({ "id": evaluation_id, "message": "evaluation deleted" })).into_response())
}

async fn list_handler<L>(
    State(engine): State<Arc<EvaluationEngine<L>>>,
) -> Result<Response, WorkflowError>
where
    L: EntityLookup + 'static,
{
    Ok(Json(engine.list()?).into_response())
}

async fn pending_handler<L>(
    State(engine): State<Arc<EvaluationEngine<L>>>,
) -> Result<Response, WorkflowError>
where
    L: EntityLookup + 'static,
{
    Ok(Json(engine.pending()?).into_response())
}

async fn get_handler<L>(
    State(engine): State<Arc<EvaluationEngine<L>>>,
    Path(evaluation_id): Path<i64>,
) -> Result<Response, WorkflowError>
where
    L: EntityLookup + 'static,
{
    Ok(Json(engine.get(EvaluationId(evaluation_id))?).into_response())
}
