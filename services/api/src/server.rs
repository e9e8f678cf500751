use crate::cli::ServeArgs;
use crate::infra::{open_database, AppState, ServiceLookup};
use crate::routes::application_router;
use axum_prometheus::PrometheusMetricLayer;
use enrollment_core::config::AppConfig;
use enrollment_core::error::AppError;
use enrollment_core::telemetry;
use enrollment_core::workflows::AcademicServices;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(path) = args.database.take() {
        config.database.path = path;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let app_state = AppState::new(prometheus_handle);
    let readiness_flag = app_state.readiness.clone();

    let db = open_database(&config)?;
    db.ping()?;
    let lookup = ServiceLookup::from_config(&config, &db)?;
    let lookup_description = lookup.describe();
    let services = AcademicServices::new(db, Arc::new(lookup));

    let app = application_router(&services, app_state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        database = %config.database.path,
        lookup = %lookup_description,
        "academic enrollment services ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
