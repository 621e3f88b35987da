use std::sync::Arc;
use anyhow::Context;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use crate::config::Config;
use crate::helpers::handler_404::page_not_found_handler;
use crate::services::cafe_service::CafeLookupService;

pub mod cafe_controller;
pub mod config_controller;
pub mod health_check;

/// Shared, read-only handles passed to every router.
#[derive(Clone)]
pub struct AppState {
    pub cafe_service: Arc<CafeLookupService>,
    pub google_maps_api_key: String,
}

pub async fn serve(
    app_state: AppState,
    config: &Config,
) -> anyhow::Result<()> {
    let application = app(app_state);

    let address = config.socket_addr();
    info!("API server listening on: {}", address);
    axum::Server::bind(&address)
        .serve(application.into_make_service())
        .await
        .context("Error spinning up the API server")
}

pub fn app(app_state: AppState) -> Router {
    router_endpoints(app_state)
        .fallback(page_not_found_handler)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(CompressionLayer::new())
        )
}

pub fn router_endpoints(app_state: AppState) -> Router {
    cafe_controller::router(app_state.clone())
        .merge(config_controller::router(app_state))
        .merge(health_check::router())
}
