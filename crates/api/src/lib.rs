//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for transactions, accounts, and recurring definitions
//! - Actor extraction from gateway-injected identity headers
//! - The JSON error envelope

pub mod extractors;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tally_core::capability::CapabilityGate;
use tally_core::tax::TaxRateProvider;
use tally_db::Scheduler;
use tally_shared::config::SchedulerConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: DatabaseConnection,
    /// Tax rate lookup for recurring templates.
    pub tax: Arc<dyn TaxRateProvider>,
    /// Role/tier capability checks.
    pub gate: Arc<dyn CapabilityGate>,
    /// Scheduler configuration (claim lease, numbering retries).
    pub scheduler_config: SchedulerConfig,
}

impl AppState {
    /// Builds the scheduler over this state's pool and tax provider.
    #[must_use]
    pub fn scheduler(&self) -> Scheduler {
        Scheduler::new(self.db.clone(), self.tax.clone(), &self.scheduler_config)
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .merge(routes::health::routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
