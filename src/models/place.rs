use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Geometry {
    pub location: Location,
}

/// One geocoding candidate; only its point is used.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct GeocodeCandidate {
    pub geometry: Geometry,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Photo {
    pub photo_reference: String,
    pub height: Option<i64>,
    pub width: Option<i64>,
}

/// Stub returned by nearby-search, enriched later through place details.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct PlaceSummary {
    pub place_id: String,
    #[serde(default = "Vec::new")]
    pub photos: Vec<Photo>,
    pub geometry: Option<Geometry>,
}

impl PlaceSummary {
    pub fn photo_reference(&self) -> Option<&str> {
        self.photos.first().map(|photo| photo.photo_reference.as_str())
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct OpeningHours {
    pub open_now: Option<bool>,
    pub weekday_text: Option<Vec<String>>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct PlaceDetails {
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    pub price_level: Option<u8>,
    pub opening_hours: Option<OpeningHours>,
    pub geometry: Option<Geometry>,
}
