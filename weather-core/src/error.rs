use thiserror::Error;

/// Why a city submission produced no result.
///
/// The `Display` text of every variant is what the page shows to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("City not found!")]
    CityNotFound,

    #[error("Weather data unavailable.")]
    WeatherUnavailable,

    /// Network failure, bad status or malformed payload from either service.
    #[error("Error fetching data: {0}")]
    Transient(String),
}

impl LookupError {
    pub fn transient(detail: impl std::fmt::Display) -> Self {
        Self::Transient(detail.to_string())
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        Self::transient(err)
    }
}

/// Faults of the history table. These are not shown as form errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
