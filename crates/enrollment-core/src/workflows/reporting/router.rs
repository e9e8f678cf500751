use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::domain::HistoryFilter;
use super::reporter::HistoryReporter;
use crate::context::RequestContext;
use crate::workflows::registry::StudentId;
use crate::workflows::WorkflowError;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub filter: Option<String>,
}

pub fn reporting_router(reporter: Arc<HistoryReporter>) -> Router {
    Router::new()
        .route("/reports/history/:student_id", get(history_handler))
        .route("/reports/cycles", get(cycles_handler))
        .with_state(reporter)
}

async fn history_handler(
    State(reporter): State<Arc<HistoryReporter>>,
    ctx: RequestContext,
    Path(student_id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> Result<Response, WorkflowError> {
    let filter = match query.filter.as_deref() {
        Some(raw) => raw.parse::<HistoryFilter>()?,
        None => HistoryFilter::All,
    };
    let history = reporter.history(&ctx, StudentId(student_id), filter)?;
    Ok(Json(history).into_response())
}

async fn cycles_handler(
    State(reporter): State<Arc<HistoryReporter>>,
) -> Result<Response, WorkflowError> {
    Ok(Json(reporter.cycle_summary()?).into_response())
}
