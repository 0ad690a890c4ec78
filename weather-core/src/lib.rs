//! Core library for the `weather` lookup service.
//!
//! This crate defines:
//! - Configuration handling
//! - Open-Meteo geocoding and current-weather clients behind traits
//! - The SQLite history table
//! - Request handling that ties the three together
//!
//! It is used by `weather-web`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod service;
pub mod store;

pub use config::Config;
pub use error::{LookupError, StoreError};
pub use model::{CurrentConditions, GeoMatch, NewWeatherRecord, PageModel, WeatherRecord, WeatherView};
pub use provider::{ForecastProvider, Geocoder, clients_from_config};
pub use service::WeatherService;
pub use store::{HISTORY_LIMIT, WeatherStore};
