//! HTTP service and command line for the academic enrollment engine.

mod cli;
mod infra;
mod inspect;
mod routes;
mod seed;
mod server;

use enrollment_core::error::AppError;

pub use infra::{AppState, ServiceLookup};
pub use routes::application_router;
pub use seed::{seed_catalog, SeedSummary};

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
