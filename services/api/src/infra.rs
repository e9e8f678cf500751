use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use async_trait::async_trait;
use enrollment_core::config::{AppConfig, LookupMode};
use enrollment_core::context::RequestContext;
use enrollment_core::error::AppError;
use enrollment_core::storage::Database;
use enrollment_core::workflows::lookup::{
    DirectoryLookup, EntityCheck, EntityKind, EntityLookup, HttpEntityLookup,
};
use enrollment_core::workflows::AcademicServices;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;

#[derive(Clone)]
pub struct AppState {
    pub readiness: Arc<AtomicBool>,
    pub metrics: Arc<PrometheusHandle>,
}

impl AppState {
    pub fn new(metrics: PrometheusHandle) -> Self {
        Self {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(metrics),
        }
    }
}

/// Entity lookup selected by `APP_LOOKUP_MODE`.
pub enum ServiceLookup {
    Http(HttpEntityLookup),
    Local(DirectoryLookup),
}

impl ServiceLookup {
    pub fn from_config(config: &AppConfig, db: &Database) -> Result<Self, AppError> {
        match config.services.lookup_mode {
            LookupMode::Http => {
                let base_url = config.services.base_url_for(&config.server);
                let lookup = HttpEntityLookup::new(base_url, config.services.lookup_timeout)?;
                Ok(Self::Http(lookup))
            }
            LookupMode::Local => Ok(Self::Local(DirectoryLookup::new(db.clone()))),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ServiceLookup::Http(lookup) => format!("http ({})", lookup.base_url()),
            ServiceLookup::Local(_) => "local".to_string(),
        }
    }
}

#[async_trait]
impl EntityLookup for ServiceLookup {
    async fn validate(
        &self,
        ctx: &RequestContext,
        kind: EntityKind,
        id: i64,
    ) -> EntityCheck<Value> {
        match self {
            ServiceLookup::Http(lookup) => lookup.validate(ctx, kind, id).await,
            ServiceLookup::Local(lookup) => lookup.validate(ctx, kind, id).await,
        }
    }
}

pub(crate) fn open_database(config: &AppConfig) -> Result<Database, AppError> {
    Ok(Database::open(&config.database.path)?)
}

/// Services for commands that run without the HTTP server, so lookups stay in-process.
pub(crate) fn offline_services(db: &Database) -> AcademicServices<DirectoryLookup> {
    AcademicServices::new(db.clone(), Arc::new(DirectoryLookup::new(db.clone())))
}
