use async_trait::async_trait;
use thiserror::Error;
use crate::models::place::{GeocodeCandidate, Location, PlaceDetails, PlaceSummary};

#[derive(Debug, Error)]
pub enum MapsError {
    #[error("Maps request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("REQUEST_DENIED: {message}")]
    RequestDenied { message: String },

    #[error("{status}: {message}")]
    Status { status: String, message: String },

    #[error("Maps response incomplete: {0}")]
    Incomplete(String),
}

impl MapsError {
    /// True when the key or its referrer policy blocks server-side calls.
    ///
    /// Only `REQUEST_DENIED` is reliable. The substring check on `referer`
    /// is a fallback for messages Google sends under other statuses and
    /// will break silently if that wording changes.
    pub fn is_restricted(&self) -> bool {
        match self {
            MapsError::RequestDenied { .. } => true,
            other => other.to_string().to_lowercase().contains("referer"),
        }
    }

    /// Maps a Google `status` field onto success or a typed error.
    pub fn check_status(status: &str, error_message: Option<&str>) -> Result<(), MapsError> {
        let message = error_message.unwrap_or_default().to_string();
        match status {
            "OK" | "ZERO_RESULTS" => Ok(()),
            "REQUEST_DENIED" => Err(MapsError::RequestDenied { message }),
            other => Err(MapsError::Status {
                status: other.to_string(),
                message,
            }),
        }
    }
}

/// Boundary to the mapping provider. Implementations must be stateless
/// apart from their credentials and connection pool.
#[async_trait]
pub trait MapsRepo: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodeCandidate>, MapsError>;

    /// Returns at most `limit` places; entries past the limit are never
    /// decoded.
    async fn places_nearby(
        &self,
        location: Location,
        radius: u32,
        place_type: &str,
        limit: usize,
    ) -> Result<Vec<PlaceSummary>, MapsError>;

    async fn place_details(
        &self,
        place_id: &str,
        fields: &[&str],
    ) -> Result<PlaceDetails, MapsError>;
}
