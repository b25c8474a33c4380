use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// What to ask the weather provider for.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    City { name: String },
    Coordinates(Coordinates),
}

impl WeatherQuery {
    pub fn city(name: impl Into<String>) -> Self {
        WeatherQuery::City { name: name.into() }
    }

    pub fn coordinates(latitude: f64, longitude: f64) -> Self {
        WeatherQuery::Coordinates(Coordinates {
            latitude,
            longitude,
        })
    }
}

/// Coarse weather category used for theme selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionCode {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Snow,
    Other,
}

impl ConditionCode {
    /// Parse the provider's condition keyword (`weather[0].main`), ignoring case.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.to_ascii_lowercase().as_str() {
            "clear" => ConditionCode::Clear,
            "clouds" => ConditionCode::Clouds,
            "rain" => ConditionCode::Rain,
            "drizzle" => ConditionCode::Drizzle,
            "snow" => ConditionCode::Snow,
            _ => ConditionCode::Other,
        }
    }
}

/// One normalized weather snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub temperature_c: i32,
    pub condition: ConditionCode,
    pub condition_text: String,
    pub wind_speed_kmh: i32,
    pub display_city_name: String,
    pub observed_at: DateTime<Local>,
}

/// Which state the widget is in. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiState {
    #[default]
    Default,
    Loading,
    Loaded,
    LocationActive,
}

/// Round half up (`floor(x + 0.5)`), so `-2.5` becomes `-2`.
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// m/s to km/h, rounded.
pub fn wind_kmh(speed_ms: f64) -> i32 {
    round_half_up(speed_ms * 3.6)
}
