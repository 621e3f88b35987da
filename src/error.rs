use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use crate::repositories::maps_repo::MapsError;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Location not found")]
    LocationNotFound,

    #[error("Latitude and longitude required")]
    MissingCoordinates,

    #[error("{0}")]
    InvalidParameter(String),

    #[error("API key has referer restrictions. Please update API key settings in Google Cloud Console to allow server-side requests.")]
    ApiRestricted,

    #[error(transparent)]
    Upstream(#[from] MapsError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl LookupError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LookupError::LocationNotFound => StatusCode::NOT_FOUND,
            LookupError::MissingCoordinates | LookupError::InvalidParameter(_) => {
                StatusCode::BAD_REQUEST
            }
            LookupError::ApiRestricted | LookupError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}
