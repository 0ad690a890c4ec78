//! Request handling: geocode, fetch current conditions, persist, load history.

use std::sync::Arc;

use crate::{
    error::{LookupError, StoreResult},
    model::{PageModel, WeatherRecord, WeatherView},
    provider::{ForecastProvider, Geocoder},
    store::{HISTORY_LIMIT, WeatherStore},
};

/// Orchestrates one page request against explicitly injected collaborators.
#[derive(Debug, Clone)]
pub struct WeatherService {
    geocoder: Arc<dyn Geocoder>,
    forecast: Arc<dyn ForecastProvider>,
    store: Arc<WeatherStore>,
}

impl WeatherService {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        forecast: Arc<dyn ForecastProvider>,
        store: Arc<WeatherStore>,
    ) -> Self {
        Self { geocoder, forecast, store }
    }

    pub fn store(&self) -> &WeatherStore {
        &self.store
    }

    /// Resolve a city to its current conditions without touching the store.
    ///
    /// The name is only trimmed; an empty name still goes to the geocoder.
    pub async fn lookup(&self, city: &str) -> Result<WeatherView, LookupError> {
        let city = city.trim();
        let geo = self.geocoder.geocode(city).await?;
        let current = self.forecast.current(geo.latitude, geo.longitude).await?;

        Ok(WeatherView::new(city, geo, current))
    }

    /// Handle a page request. `submission` is the raw `city` form field, or
    /// `None` for a plain page view.
    ///
    /// Lookup failures end up in `PageModel::error`; only storage faults are
    /// returned as `Err`.
    pub async fn handle(&self, submission: Option<&str>) -> StoreResult<PageModel> {
        let mut page = PageModel::default();

        if let Some(city) = submission {
            match self.lookup(city).await {
                Ok(view) => {
                    let row = self.store.insert(&view.to_record())?;
                    tracing::info!(
                        "Looked up {} ({}): {} °C, {} (row {})",
                        view.city,
                        view.country,
                        view.temperature,
                        view.description,
                        row.id
                    );
                    page.weather = Some(view);
                }
                Err(err) => {
                    tracing::warn!("Lookup for {:?} failed: {}", city.trim(), err);
                    page.error = Some(err.to_string());
                }
            }
        }

        page.history = self.history()?;
        Ok(page)
    }

    pub fn history(&self) -> StoreResult<Vec<WeatherRecord>> {
        self.store.list_recent(HISTORY_LIMIT)
    }

    pub fn clear_history(&self) -> StoreResult<usize> {
        let removed = self.store.clear_all()?;
        tracing::info!("Cleared {} history rows", removed);
        Ok(removed)
    }
}
