use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{
    error::LookupError,
    model::{CurrentConditions, GeoMatch},
};

use super::{ForecastProvider, Geocoder};

#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    http: Client,
    url: String,
}

impl OpenMeteoGeocoder {
    pub fn new(http: Client, url: String) -> Self {
        Self { http, url }
    }
}

#[derive(Debug, Clone)]
pub struct OpenMeteoForecast {
    http: Client,
    url: String,
    timezone: String,
}

impl OpenMeteoForecast {
    pub fn new(http: Client, url: String, timezone: String) -> Self {
        Self { http, url, timezone }
    }
}

#[derive(Debug, Deserialize)]
struct OmGeoResponse {
    results: Option<Vec<OmGeoResult>>,
}

#[derive(Debug, Deserialize)]
struct OmGeoResult {
    latitude: f64,
    longitude: f64,
    country: String,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    current_weather: Option<Map<String, Value>>,
}

#[async_trait]
impl Geocoder for OpenMeteoGeocoder {
    async fn geocode(&self, city: &str) -> Result<GeoMatch, LookupError> {
        tracing::debug!("Geocoding {:?} via {}", city, self.url);

        let res = self.http.get(&self.url).query(&[("name", city), ("count", "1")]).send().await?;

        let status = res.status();
        let body = res.text().await?;
        let json = read_json("geocoding", status, &body)?;

        let parsed: OmGeoResponse = serde_json::from_value(json)
            .map_err(|e| LookupError::transient(format!("invalid geocoding JSON: {e}")))?;

        let first = parsed
            .results
            .and_then(|r| r.into_iter().next())
            .ok_or(LookupError::CityNotFound)?;

        Ok(GeoMatch { latitude: first.latitude, longitude: first.longitude, country: first.country })
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoForecast {
    async fn current(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentConditions, LookupError> {
        tracing::debug!("Fetching current weather for ({latitude}, {longitude}) via {}", self.url);

        let res = self
            .http
            .get(&self.url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current_weather", "true".to_string()),
                ("timezone", self.timezone.clone()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        let json = read_json("forecast", status, &body)?;

        let parsed: OmForecastResponse = serde_json::from_value(json)
            .map_err(|e| LookupError::transient(format!("invalid forecast JSON: {e}")))?;

        let data = parsed
            .current_weather
            .filter(|m| !m.is_empty())
            .ok_or(LookupError::WeatherUnavailable)?;

        serde_json::from_value(Value::Object(data))
            .map_err(|e| LookupError::transient(format!("invalid current_weather payload: {e}")))
    }
}

/// Parse a response body as JSON regardless of status.
///
/// Open-Meteo answers bad requests with a JSON object carrying `error` and
/// `reason`; such a body lacks the payload key and is classified by the caller.
/// Only a body that is not JSON at all becomes a transient fault.
fn read_json(what: &str, status: StatusCode, body: &str) -> Result<Value, LookupError> {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => {
            if !status.is_success() {
                tracing::debug!(
                    "{} request returned status {}: {}",
                    what,
                    status,
                    truncate_body(body)
                );
            }
            Ok(json)
        }
        Err(_) if !status.is_success() => Err(LookupError::Transient(format!(
            "{} request failed with status {}: {}",
            what,
            status,
            truncate_body(body),
        ))),
        Err(e) => Err(LookupError::transient(format!("invalid {what} JSON: {e}"))),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
