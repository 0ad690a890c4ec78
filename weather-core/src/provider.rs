use crate::{
    config::ServicesConfig,
    error::LookupError,
    model::{CurrentConditions, GeoMatch},
    provider::open_meteo::{OpenMeteoForecast, OpenMeteoGeocoder},
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod open_meteo;

/// Resolves a free-text city name to its first match.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn geocode(&self, city: &str) -> Result<GeoMatch, LookupError>;
}

/// Fetches current conditions for a coordinate pair.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn current(&self, latitude: f64, longitude: f64)
    -> Result<CurrentConditions, LookupError>;
}

/// Build both Open-Meteo clients from config, sharing one HTTP connection pool.
pub fn clients_from_config(
    config: &ServicesConfig,
) -> anyhow::Result<(Arc<dyn Geocoder>, Arc<dyn ForecastProvider>)> {
    let http = reqwest::Client::builder()
        .timeout(config.timeout())
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

    let geocoder = OpenMeteoGeocoder::new(http.clone(), config.geocoding_url.clone());
    let forecast =
        OpenMeteoForecast::new(http, config.forecast_url.clone(), config.timezone.clone());

    Ok((Arc::new(geocoder), Arc::new(forecast)))
}
