use axum::{Extension, Json, Router};
use axum::response::IntoResponse;
use axum::routing::get;
use serde::{Deserialize, Serialize};
use crate::controller::AppState;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/config", get(retrieve_frontend_config))
        .route_layer(Extension(FrontendConfig {
            google_maps_api_key: app_state.google_maps_api_key,
        }))
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FrontendConfig {
    pub google_maps_api_key: String,
}

/// Hands the browser the key it needs to load the Maps JS widget.
pub async fn retrieve_frontend_config(
    Extension(frontend_config): Extension<FrontendConfig>,
) -> impl IntoResponse {
    Json(frontend_config)
}
