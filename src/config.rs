use std::net::{IpAddr, SocketAddr};
use anyhow::bail;
use clap::Parser;

/// Value shipped in the sample `.env`; treated the same as a missing key.
pub const PLACEHOLDER_API_KEY: &str = "your_actual_google_maps_api_key_here";

// Lookup defaults, consumed at the start of each handler.
pub const DEFAULT_LOCATION: &str = "Sydney, Australia";
pub const DEFAULT_RADIUS_METERS: u32 = 5000;
pub const PLACE_CATEGORY: &str = "cafe";
pub const MAX_CAFE_RESULTS: usize = 8;
pub const PHOTO_MAX_WIDTH: u32 = 400;
pub const DETAIL_FIELDS: [&str; 7] = [
    "name",
    "formatted_address",
    "rating",
    "geometry",
    "opening_hours",
    "price_level",
    "user_ratings_total",
];

#[derive(Parser, Clone)]
pub struct Config {
    #[clap(env, long)]
    pub google_maps_api_key: String,

    #[clap(env, long, default_value = "127.0.0.1")]
    pub bind_host: IpAddr,

    #[clap(env, long, default_value_t = 5001)]
    pub bind_port: u16,

    /// Root of the Google Maps web services, overridable for local stubs.
    #[clap(env, long, default_value = "https://maps.googleapis.com")]
    pub maps_base_url: String,

    #[clap(env, long, default_value_t = 10)]
    pub upstream_timeout_secs: u64,

    /// Upper bound on place-detail lookups in flight for one request.
    #[clap(env, long, default_value_t = 4)]
    pub detail_concurrency: usize,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        let key = self.google_maps_api_key.trim();
        if key.is_empty() || key == PLACEHOLDER_API_KEY {
            bail!("GOOGLE_MAPS_API_KEY is not set, add it to the environment or a .env file");
        }
        if self.detail_concurrency == 0 {
            bail!("DETAIL_CONCURRENCY must be at least 1");
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_host, self.bind_port)
    }
}
