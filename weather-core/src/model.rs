use serde::Deserialize;

/// A persisted lookup, one row of the history table.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub id: i64,
    pub city: String,
    pub temperature: f64,
    pub description: String,
    pub time: String,
}

/// Fields of a record before the store assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWeatherRecord {
    pub city: String,
    pub temperature: f64,
    pub description: String,
    pub time: String,
}

/// First geocoding match for a city name.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoMatch {
    pub latitude: f64,
    pub longitude: f64,
    pub country: String,
}

/// Current conditions snapshot as returned by the forecast service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub windspeed: f64,
    pub weathercode: i32,
    /// Kept verbatim, never parsed.
    pub time: String,
}

/// Result of a successful lookup, shown for the current request only.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherView {
    pub city: String,
    pub country: String,
    pub temperature: f64,
    pub windspeed: f64,
    pub description: String,
    /// Human-readable WMO label, display only.
    pub condition: &'static str,
    pub time: String,
}

impl WeatherView {
    pub fn new(city: &str, geo: GeoMatch, current: CurrentConditions) -> Self {
        Self {
            city: title_case(city),
            country: geo.country,
            temperature: current.temperature,
            windspeed: current.windspeed,
            description: format!("Code {}", current.weathercode),
            condition: wmo_label(current.weathercode),
            time: current.time,
        }
    }

    /// The subset of the view that goes into the history table.
    pub fn to_record(&self) -> NewWeatherRecord {
        NewWeatherRecord {
            city: self.city.clone(),
            temperature: self.temperature,
            description: self.description.clone(),
            time: self.time.clone(),
        }
    }
}

/// Everything the page renderer needs for one response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageModel {
    pub weather: Option<WeatherView>,
    pub error: Option<String>,
    pub history: Vec<WeatherRecord>,
}

/// Upper-case the first letter of every run of letters, lower-case the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}

/// WMO weather interpretation codes.
/// See: https://open-meteo.com/en/docs#weathervariables
pub fn wmo_label(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        56 | 57 => "Freezing drizzle",
        61 | 63 | 65 => "Rain",
        66 | 67 => "Freezing rain",
        71 | 73 | 75 | 77 => "Snow",
        80..=82 => "Rain showers",
        85 | 86 => "Snow showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        _ => "Unknown",
    }
}
