use std::sync::Arc;
use axum::{Extension, Json, Router};
use axum::extract::Query;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use tracing::warn;
use crate::config::DEFAULT_LOCATION;
use crate::controller::AppState;
use crate::error::LookupError;
use crate::models::cafe::{
    resolve_radius, CafeSearchParams, CafeSearchResponse, NearbyCafesBody, NearbyCafesResponse,
};
use crate::services::cafe_service::CafeLookupService;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/cafes", get(search_cafes))
        .route("/api/cafes/nearby", post(search_nearby_cafes))
        .route_layer(Extension(app_state.cafe_service))
}

pub async fn search_cafes(
    Extension(cafe_service): Extension<Arc<CafeLookupService>>,
    query: Result<Query<CafeSearchParams>, QueryRejection>,
) -> impl IntoResponse {
    let Query(params) = match query {
        Ok(query) => query,
        Err(e) => {
            warn!("Rejected cafe search parameters: {}", e);
            return LookupError::InvalidParameter(e.body_text()).into_response();
        }
    };

    let location = params.location
        .filter(|location| !location.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOCATION.to_string());
    let radius = match resolve_radius(params.radius) {
        Ok(radius) => radius,
        Err(e) => return e.into_response(),
    };

    let lookup_res = cafe_service
        .lookup_by_location(&location, radius)
        .await;

    return match lookup_res {
        Ok((coordinates, cafes)) => {
            (
                StatusCode::OK,
                Json(CafeSearchResponse {
                    cafes,
                    location,
                    coordinates,
                }),
            ).into_response()
        }
        Err(e) => {
            warn!("Something went wrong looking up cafes near '{}' due to: {}", location, e);
            e.into_response()
        }
    };
}

pub async fn search_nearby_cafes(
    Extension(cafe_service): Extension<Arc<CafeLookupService>>,
    body: Result<Json<NearbyCafesBody>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match body {
        Ok(body) => body,
        Err(e) => {
            // Only syntax or content-type problems reach here; field types
            // are checked below.
            warn!("Rejected nearby cafes body: {}", e);
            return LookupError::MissingCoordinates.into_response();
        }
    };

    let coordinates = match body.coordinates() {
        Ok(coordinates) => coordinates,
        Err(e) => return e.into_response(),
    };
    let radius = match body.radius() {
        Ok(radius) => radius,
        Err(e) => return e.into_response(),
    };

    let lookup_res = cafe_service
        .lookup_by_coordinates(coordinates, radius)
        .await;

    return match lookup_res {
        Ok(cafes) => {
            (
                StatusCode::OK,
                Json(NearbyCafesResponse {
                    cafes,
                    coordinates,
                }),
            ).into_response()
        }
        Err(e) => {
            warn!("Something went wrong looking up cafes near ({}, {}) due to: {}", coordinates.lat, coordinates.lng, e);
            e.into_response()
        }
    };
}
