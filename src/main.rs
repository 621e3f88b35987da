use std::sync::Arc;
use std::time::Duration;
use clap::Parser;
use dotenv::dotenv;
use cafe_lookup_backend::config::Config;
use cafe_lookup_backend::controller::{self, AppState};
use cafe_lookup_backend::repositories::google_maps_repo::GoogleMapsRepo;
use cafe_lookup_backend::services::cafe_service::CafeLookupService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::parse();
    config.validate()?;

    let maps_repo = Arc::new(GoogleMapsRepo::new(
        &config.maps_base_url,
        &config.google_maps_api_key,
        Duration::from_secs(config.upstream_timeout_secs),
    )?);

    let app_state = AppState {
        cafe_service: Arc::new(CafeLookupService::new(maps_repo, &config)),
        google_maps_api_key: config.google_maps_api_key.clone(),
    };

    controller::serve(app_state, &config).await
}
