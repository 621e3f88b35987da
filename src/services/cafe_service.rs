use std::sync::Arc;
use futures::{StreamExt, TryStreamExt};
use tracing::{info, warn};
use crate::config::{Config, DETAIL_FIELDS, MAX_CAFE_RESULTS, PHOTO_MAX_WIDTH, PLACE_CATEGORY};
use crate::error::LookupError;
use crate::models::cafe::{CafeRecord, UNKNOWN_ADDRESS, UNKNOWN_NAME};
use crate::models::place::{Location, PlaceSummary};
use crate::repositories::maps_repo::{MapsError, MapsRepo};

/// Resolves locations and turns nearby places into display records.
pub struct CafeLookupService {
    maps_repo: Arc<dyn MapsRepo>,
    api_key: String,
    maps_base_url: String,
    detail_concurrency: usize,
}

impl CafeLookupService {
    pub fn new(
        maps_repo: Arc<dyn MapsRepo>,
        config: &Config,
    ) -> Self {
        Self {
            maps_repo,
            api_key: config.google_maps_api_key.clone(),
            maps_base_url: config.maps_base_url.trim_end_matches('/').to_string(),
            detail_concurrency: config.detail_concurrency.max(1),
        }
    }

    /// Geocodes `location` and searches around its first candidate.
    pub async fn lookup_by_location(
        &self,
        location: &str,
        radius: u32,
    ) -> Result<(Location, Vec<CafeRecord>), LookupError> {
        let candidates = self.maps_repo.geocode(location).await?;
        let coordinates = match candidates.first() {
            Some(candidate) => candidate.geometry.location,
            None => return Err(LookupError::LocationNotFound),
        };
        info!("Resolved '{}' to ({}, {})", location, coordinates.lat, coordinates.lng);

        let cafes = self.find_cafes(coordinates, radius).await?;
        Ok((coordinates, cafes))
    }

    pub async fn lookup_by_coordinates(
        &self,
        coordinates: Location,
        radius: u32,
    ) -> Result<Vec<CafeRecord>, LookupError> {
        self.find_cafes(coordinates, radius).await
    }

    /// Only `ApiRestricted` escapes; any other upstream failure yields an
    /// empty list.
    pub async fn find_cafes(
        &self,
        coordinates: Location,
        radius: u32,
    ) -> Result<Vec<CafeRecord>, LookupError> {
        match self.search_and_enrich(coordinates, radius).await {
            Ok(cafes) => Ok(cafes),
            Err(e) if e.is_restricted() => {
                warn!("Maps API rejected the key: {}", e);
                Err(LookupError::ApiRestricted)
            }
            Err(e) => {
                warn!("Error fetching cafes: {}", e);
                Ok(Vec::new())
            }
        }
    }

    async fn search_and_enrich(
        &self,
        coordinates: Location,
        radius: u32,
    ) -> Result<Vec<CafeRecord>, MapsError> {
        let mut places = self.maps_repo
            .places_nearby(coordinates, radius, PLACE_CATEGORY, MAX_CAFE_RESULTS)
            .await?;
        places.truncate(MAX_CAFE_RESULTS);

        // `buffered` yields in input order, so the first failing place in
        // search order decides the outcome.
        futures::stream::iter(places)
            .map(|place| self.enrich(place))
            .buffered(self.detail_concurrency)
            .try_collect()
            .await
    }

    async fn enrich(&self, place: PlaceSummary) -> Result<CafeRecord, MapsError> {
        let photo_url = place.photo_reference().map(|reference| self.photo_url(reference));
        let details = self.maps_repo
            .place_details(&place.place_id, &DETAIL_FIELDS)
            .await?;

        let location = details.geometry
            .as_ref()
            .or(place.geometry.as_ref())
            .map(|geometry| geometry.location)
            .ok_or_else(|| {
                MapsError::Incomplete(format!("place {} has no geometry", place.place_id))
            })?;

        let (is_open, hours) = match details.opening_hours {
            Some(opening_hours) => (opening_hours.open_now, opening_hours.weekday_text),
            None => (None, None),
        };

        Ok(CafeRecord {
            name: details.name.unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            address: details.formatted_address.unwrap_or_else(|| UNKNOWN_ADDRESS.to_string()),
            rating: details.rating,
            user_ratings_total: details.user_ratings_total,
            price_level: details.price_level,
            is_open,
            hours,
            photo_url,
            lat: location.lat,
            lng: location.lng,
            place_id: place.place_id,
        })
    }

    /// Built locally; the image itself is never fetched.
    pub fn photo_url(&self, photo_reference: &str) -> String {
        format!(
            "{}/maps/api/place/photo?maxwidth={}&photoreference={}&key={}",
            self.maps_base_url, PHOTO_MAX_WIDTH, photo_reference, self.api_key
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use async_trait::async_trait;
    use clap::Parser;
    use crate::models::place::{
        GeocodeCandidate, Geometry, OpeningHours, PlaceDetails, Photo,
    };
    use super::*;

    enum DetailOutcome {
        Found(PlaceDetails),
        Denied,
        Broken,
    }

    #[derive(Default)]
    struct StubMaps {
        geocode: Vec<GeocodeCandidate>,
        places: Vec<PlaceSummary>,
        details: HashMap<String, DetailOutcome>,
        search_failure: Option<fn() -> MapsError>,
        search_calls: Mutex<Vec<(Location, u32, String, usize)>>,
        detail_calls: Mutex<Vec<(String, Vec<String>)>>,
    }

    #[async_trait]
    impl MapsRepo for StubMaps {
        async fn geocode(&self, _address: &str) -> Result<Vec<GeocodeCandidate>, MapsError> {
            Ok(self.geocode.clone())
        }

        async fn places_nearby(
            &self,
            location: Location,
            radius: u32,
            place_type: &str,
            limit: usize,
        ) -> Result<Vec<PlaceSummary>, MapsError> {
            self.search_calls
                .lock()
                .unwrap()
                .push((location, radius, place_type.to_string(), limit));
            match self.search_failure {
                Some(failure) => Err(failure()),
                None => Ok(self.places.clone()),
            }
        }

        async fn place_details(
            &self,
            place_id: &str,
            fields: &[&str],
        ) -> Result<PlaceDetails, MapsError> {
            self.detail_calls.lock().unwrap().push((
                place_id.to_string(),
                fields.iter().map(|field| field.to_string()).collect(),
            ));
            match self.details.get(place_id) {
                Some(DetailOutcome::Found(details)) => Ok(details.clone()),
                Some(DetailOutcome::Denied) => Err(denied()),
                Some(DetailOutcome::Broken) => Err(broken()),
                None => Ok(PlaceDetails::default()),
            }
        }
    }

    fn denied() -> MapsError {
        MapsError::RequestDenied {
            message: "API keys with referer restrictions cannot be used with this API.".to_string(),
        }
    }

    fn broken() -> MapsError {
        MapsError::Status {
            status: "UNKNOWN_ERROR".to_string(),
            message: "server error".to_string(),
        }
    }

    fn geometry(lat: f64, lng: f64) -> Option<Geometry> {
        Some(Geometry { location: Location { lat, lng } })
    }

    fn stub_place(place_id: &str) -> PlaceSummary {
        PlaceSummary {
            place_id: place_id.to_string(),
            photos: Vec::new(),
            geometry: geometry(-33.0, 151.0),
        }
    }

    fn service(stub: StubMaps) -> (Arc<StubMaps>, CafeLookupService) {
        let config = Config::try_parse_from([
            "cafe-lookup-backend",
            "--google-maps-api-key",
            "test-key",
            "--maps-base-url",
            "https://maps.example.test/",
        ])
        .unwrap();
        let stub = Arc::new(stub);
        let service = CafeLookupService::new(stub.clone(), &config);
        (stub, service)
    }

    const ORIGIN: Location = Location { lat: -33.87, lng: 151.21 };

    #[tokio::test]
    async fn results_are_capped_at_eight_in_search_order() {
        let places = (0..12).map(|i| stub_place(&format!("p{}", i))).collect();
        let (stub, service) = service(StubMaps { places, ..Default::default() });

        let cafes = service.find_cafes(ORIGIN, 5000).await.unwrap();

        assert_eq!(cafes.len(), 8);
        let ids: Vec<_> = cafes.iter().map(|cafe| cafe.place_id.as_str()).collect();
        assert_eq!(ids, ["p0", "p1", "p2", "p3", "p4", "p5", "p6", "p7"]);
        assert_eq!(stub.detail_calls.lock().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn search_uses_cafe_category_and_radius() {
        let (stub, service) = service(StubMaps::default());

        let cafes = service.lookup_by_coordinates(ORIGIN, 1200).await.unwrap();

        assert!(cafes.is_empty());
        let calls = stub.search_calls.lock().unwrap();
        assert_eq!(calls.as_slice(), [(ORIGIN, 1200, "cafe".to_string(), 8)]);
    }

    #[tokio::test]
    async fn details_request_exact_field_list() {
        let (stub, service) = service(StubMaps {
            places: vec![stub_place("p1")],
            ..Default::default()
        });

        service.find_cafes(ORIGIN, 5000).await.unwrap();

        let calls = stub.detail_calls.lock().unwrap();
        assert_eq!(calls[0].0, "p1");
        assert_eq!(
            calls[0].1,
            [
                "name",
                "formatted_address",
                "rating",
                "geometry",
                "opening_hours",
                "price_level",
                "user_ratings_total"
            ]
        );
    }

    #[tokio::test]
    async fn full_details_map_onto_record() {
        let mut place = stub_place("p1");
        place.photos.push(Photo {
            photo_reference: "Aap_uE+ref/xyz".to_string(),
            height: Some(300),
            width: Some(400),
        });
        let details = PlaceDetails {
            name: Some("Bean There".to_string()),
            formatted_address: Some("1 George St, Sydney".to_string()),
            rating: Some(4.5),
            user_ratings_total: Some(321),
            price_level: Some(2),
            opening_hours: Some(OpeningHours {
                open_now: Some(false),
                weekday_text: Some(vec!["Monday: 7AM-3PM".to_string(), "Tuesday: Closed".to_string()]),
            }),
            geometry: geometry(-33.86, 151.2),
        };
        let (_, service) = service(StubMaps {
            places: vec![place],
            details: HashMap::from([("p1".to_string(), DetailOutcome::Found(details))]),
            ..Default::default()
        });

        let cafes = service.find_cafes(ORIGIN, 5000).await.unwrap();

        let cafe = &cafes[0];
        assert_eq!(cafe.name, "Bean There");
        assert_eq!(cafe.address, "1 George St, Sydney");
        assert_eq!(cafe.rating, Some(4.5));
        assert_eq!(cafe.user_ratings_total, Some(321));
        assert_eq!(cafe.price_level, Some(2));
        assert_eq!(cafe.is_open, Some(false));
        assert_eq!(cafe.hours.as_ref().unwrap()[1], "Tuesday: Closed");
        assert_eq!((cafe.lat, cafe.lng), (-33.86, 151.2));
        assert_eq!(
            cafe.photo_url.as_deref(),
            Some("https://maps.example.test/maps/api/place/photo?maxwidth=400&photoreference=Aap_uE+ref/xyz&key=test-key")
        );
    }

    #[tokio::test]
    async fn missing_details_degrade_to_defaults() {
        let (_, service) = service(StubMaps {
            places: vec![stub_place("p1")],
            ..Default::default()
        });

        let cafes = service.find_cafes(ORIGIN, 5000).await.unwrap();

        let cafe = &cafes[0];
        assert_eq!(cafe.name, "Unknown");
        assert_eq!(cafe.address, "Address not available");
        assert_eq!(cafe.place_id, "p1");
        assert_eq!((cafe.lat, cafe.lng), (-33.0, 151.0));
        assert!(cafe.rating.is_none());
        assert!(cafe.is_open.is_none());
        assert!(cafe.hours.is_none());
        assert!(cafe.photo_url.is_none());
    }

    #[tokio::test]
    async fn opening_hours_without_weekday_text() {
        let details = PlaceDetails {
            opening_hours: Some(OpeningHours { open_now: Some(true), weekday_text: None }),
            ..Default::default()
        };
        let (_, service) = service(StubMaps {
            places: vec![stub_place("p1")],
            details: HashMap::from([("p1".to_string(), DetailOutcome::Found(details))]),
            ..Default::default()
        });

        let cafes = service.find_cafes(ORIGIN, 5000).await.unwrap();

        assert_eq!(cafes[0].is_open, Some(true));
        assert!(cafes[0].hours.is_none());
    }

    #[tokio::test]
    async fn restricted_detail_call_surfaces_as_api_restricted() {
        let (_, service) = service(StubMaps {
            places: vec![stub_place("p1"), stub_place("p2"), stub_place("p3")],
            details: HashMap::from([("p2".to_string(), DetailOutcome::Denied)]),
            ..Default::default()
        });

        let result = service.find_cafes(ORIGIN, 5000).await;

        assert!(matches!(result, Err(LookupError::ApiRestricted)));
    }

    #[tokio::test]
    async fn other_detail_failure_yields_empty_list() {
        let (_, service) = service(StubMaps {
            places: vec![stub_place("p1"), stub_place("p2"), stub_place("p3")],
            details: HashMap::from([("p2".to_string(), DetailOutcome::Broken)]),
            ..Default::default()
        });

        let cafes = service.find_cafes(ORIGIN, 5000).await.unwrap();

        assert!(cafes.is_empty());
    }

    #[tokio::test]
    async fn restricted_search_surfaces_as_api_restricted() {
        let (stub, service) = service(StubMaps {
            places: vec![stub_place("p1")],
            search_failure: Some(denied),
            ..Default::default()
        });

        let result = service.lookup_by_coordinates(ORIGIN, 5000).await;

        assert!(matches!(result, Err(LookupError::ApiRestricted)));
        assert!(stub.detail_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn other_search_failure_yields_empty_list_without_detail_calls() {
        let (stub, service) = service(StubMaps {
            places: vec![stub_place("p1"), stub_place("p2")],
            search_failure: Some(broken),
            ..Default::default()
        });

        let cafes = service.lookup_by_coordinates(ORIGIN, 5000).await.unwrap();

        assert!(cafes.is_empty());
        assert_eq!(stub.search_calls.lock().unwrap().len(), 1);
        assert!(stub.detail_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn place_without_any_geometry_yields_empty_list() {
        let mut place = stub_place("p1");
        place.geometry = None;
        let (_, service) = service(StubMaps { places: vec![place], ..Default::default() });

        let cafes = service.find_cafes(ORIGIN, 5000).await.unwrap();

        assert!(cafes.is_empty());
    }

    #[tokio::test]
    async fn empty_geocode_is_location_not_found() {
        let (stub, service) = service(StubMaps::default());

        let result = service.lookup_by_location("Atlantis", 5000).await;

        assert!(matches!(result, Err(LookupError::LocationNotFound)));
        assert!(stub.search_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn geocode_uses_first_candidate() {
        let (stub, service) = service(StubMaps {
            geocode: vec![
                GeocodeCandidate { geometry: Geometry { location: ORIGIN } },
                GeocodeCandidate { geometry: Geometry { location: Location { lat: 1.0, lng: 1.0 } } },
            ],
            places: vec![stub_place("p1"), stub_place("p2")],
            ..Default::default()
        });

        let (coordinates, cafes) = service.lookup_by_location("Sydney, Australia", 3000).await.unwrap();

        assert_eq!(coordinates, ORIGIN);
        assert_eq!(cafes.len(), 2);
        assert_eq!(stub.search_calls.lock().unwrap()[0].0, ORIGIN);
    }
}
