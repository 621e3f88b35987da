use std::time::Duration;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use crate::models::place::{GeocodeCandidate, Location, PlaceDetails, PlaceSummary};
use crate::repositories::maps_repo::{MapsError, MapsRepo};

const GEOCODE_PATH: &str = "/maps/api/geocode/json";
const NEARBY_SEARCH_PATH: &str = "/maps/api/place/nearbysearch/json";
const PLACE_DETAILS_PATH: &str = "/maps/api/place/details/json";

#[derive(Deserialize)]
struct ResultsEnvelope<T> {
    status: String,
    error_message: Option<String>,
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Deserialize)]
struct ResultEnvelope<T> {
    status: String,
    error_message: Option<String>,
    result: Option<T>,
}

pub struct GoogleMapsRepo {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GoogleMapsRepo {
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build the Maps HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, MapsError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Calling Maps endpoint {}", path);

        // The key travels in the query string, so strip the URL from errors.
        let response = self.client
            .get(&url)
            .query(params)
            .query(&[("key", &self.api_key)])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| MapsError::Transport(e.without_url()))?;

        response
            .json::<T>()
            .await
            .map_err(|e| MapsError::Transport(e.without_url()))
    }
}

#[async_trait]
impl MapsRepo for GoogleMapsRepo {
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodeCandidate>, MapsError> {
        let envelope: ResultsEnvelope<GeocodeCandidate> = self
            .get_json(GEOCODE_PATH, &[("address", address.to_string())])
            .await?;

        MapsError::check_status(&envelope.status, envelope.error_message.as_deref())?;
        Ok(envelope.results)
    }

    async fn places_nearby(
        &self,
        location: Location,
        radius: u32,
        place_type: &str,
        limit: usize,
    ) -> Result<Vec<PlaceSummary>, MapsError> {
        let envelope: ResultsEnvelope<Value> = self
            .get_json(
                NEARBY_SEARCH_PATH,
                &[
                    ("location", format!("{},{}", location.lat, location.lng)),
                    ("radius", radius.to_string()),
                    ("type", place_type.to_string()),
                ],
            )
            .await?;

        MapsError::check_status(&envelope.status, envelope.error_message.as_deref())?;
        envelope.results
            .into_iter()
            .take(limit)
            .map(|result| {
                serde_json::from_value::<PlaceSummary>(result)
                    .map_err(|e| MapsError::Incomplete(format!("malformed nearby result: {}", e)))
            })
            .collect()
    }

    async fn place_details(
        &self,
        place_id: &str,
        fields: &[&str],
    ) -> Result<PlaceDetails, MapsError> {
        let envelope: ResultEnvelope<PlaceDetails> = self
            .get_json(
                PLACE_DETAILS_PATH,
                &[
                    ("place_id", place_id.to_string()),
                    ("fields", fields.join(",")),
                ],
            )
            .await?;

        MapsError::check_status(&envelope.status, envelope.error_message.as_deref())?;
        Ok(envelope.result.unwrap_or_default())
    }
}
