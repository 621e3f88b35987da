use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::config::DEFAULT_RADIUS_METERS;
use crate::error::LookupError;
use crate::models::place::Location;

pub const UNKNOWN_NAME: &str = "Unknown";
pub const UNKNOWN_ADDRESS: &str = "Address not available";

/// Display record handed to the frontend. Optional fields serialize as `null`.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct CafeRecord {
    pub name: String,
    pub address: String,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    pub price_level: Option<u8>,
    pub is_open: Option<bool>,
    pub hours: Option<Vec<String>>,
    pub photo_url: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub place_id: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct CafeSearchParams {
    pub location: Option<String>,
    pub radius: Option<u32>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct CafeSearchResponse {
    pub cafes: Vec<CafeRecord>,
    pub location: String,
    pub coordinates: Location,
}

/// Fields stay loosely typed so each one is validated on its own.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct NearbyCafesBody {
    pub lat: Option<Value>,
    pub lng: Option<Value>,
    pub radius: Option<Value>,
}

impl NearbyCafesBody {
    /// Numbers and numeric strings are accepted. A zero coordinate counts
    /// as missing.
    pub fn coordinates(&self) -> Result<Location, LookupError> {
        match (coordinate(self.lat.as_ref()), coordinate(self.lng.as_ref())) {
            (Some(lat), Some(lng)) if lat != 0.0 && lng != 0.0 => Ok(Location { lat, lng }),
            _ => Err(LookupError::MissingCoordinates),
        }
    }

    pub fn radius(&self) -> Result<u32, LookupError> {
        let meters = match &self.radius {
            None | Some(Value::Null) => None,
            Some(Value::Number(number)) => Some(
                number
                    .as_u64()
                    .and_then(|meters| u32::try_from(meters).ok())
                    .ok_or_else(invalid_radius)?,
            ),
            Some(Value::String(text)) => Some(text.trim().parse::<u32>().map_err(|_| invalid_radius())?),
            Some(_) => return Err(invalid_radius()),
        };
        resolve_radius(meters)
    }
}

fn coordinate(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn invalid_radius() -> LookupError {
    LookupError::InvalidParameter("Radius must be a positive number of meters".to_string())
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct NearbyCafesResponse {
    pub cafes: Vec<CafeRecord>,
    pub coordinates: Location,
}

pub fn resolve_radius(radius: Option<u32>) -> Result<u32, LookupError> {
    match radius {
        None => Ok(DEFAULT_RADIUS_METERS),
        Some(0) => Err(invalid_radius()),
        Some(meters) => Ok(meters),
    }
}
