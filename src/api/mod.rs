//! JSON API over the forecasting context.
//!
//! Provides three GET endpoints:
//! - `/counties`: available county names
//! - `/forecast?county=NAME`: forecast, trend, and growth for one county
//! - `/compare?counties=A,B,C`: the same for up to `max_compare` counties

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::context::ForecastContext;

pub use types::{CompareQuery, ErrorResponse, ForecastQuery, ForecastResponse, GrowthRecord};

/// Immutable application state shared across all request handlers.
///
/// Built once at startup and wrapped in `Arc`; every request reads the same
/// dataset and model, so no locks are needed.
pub struct AppState {
    /// Loaded dataset, model, and forecast settings.
    pub ctx: ForecastContext,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/counties", get(handlers::get_counties))
        .route("/forecast", get(handlers::get_forecast))
        .route("/compare", get(handlers::get_compare))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process exits.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
