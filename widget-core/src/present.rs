//! Turning readings into panel text and a background theme.

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::model::{ConditionCode, WeatherReading};
use crate::surface::{DisplaySurface, Field};

const PLACEHOLDER: &str = "--";

/// Background theme of the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Theme {
    Rainy,
    Cloudy,
    Snow,
    NightClear,
    DayClear,
}

impl Theme {
    pub fn select(condition: ConditionCode, is_night: bool) -> Self {
        match condition {
            ConditionCode::Rain | ConditionCode::Drizzle => Theme::Rainy,
            ConditionCode::Clouds => Theme::Cloudy,
            ConditionCode::Snow => Theme::Snow,
            _ if is_night => Theme::NightClear,
            _ => Theme::DayClear,
        }
    }

    /// CSS background value for web-like hosts.
    pub fn background(&self) -> &'static str {
        match self {
            Theme::Rainy => "var(--gradient-rainy)",
            Theme::Cloudy => "var(--gradient-cloudy)",
            Theme::Snow => "linear-gradient(135deg, #e6e6e6, #ffffff)",
            Theme::NightClear => "var(--gradient-night-clear)",
            Theme::DayClear => "var(--gradient-day-clear)",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Rainy => "rainy",
            Theme::Cloudy => "cloudy",
            Theme::Snow => "snow",
            Theme::NightClear => "night-clear",
            Theme::DayClear => "day-clear",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Night is before 06:00 or after 18:59; hours 6 and 18 are both day.
pub fn is_night(hour: u32) -> bool {
    hour < 6 || hour > 18
}

/// Writes readings (or the placeholder) to a surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct Presenter;

impl Presenter {
    pub fn render<S: DisplaySurface + ?Sized>(
        &self,
        surface: &mut S,
        reading: Option<&WeatherReading>,
    ) {
        match reading {
            None => Self::render_placeholder(surface),
            Some(reading) => Self::render_reading(surface, reading),
        }
    }

    fn render_placeholder<S: DisplaySurface + ?Sized>(surface: &mut S) {
        surface.set_text(Field::LastUpdated, &last_updated_label(PLACEHOLDER));
        surface.set_text(Field::City, PLACEHOLDER);
        surface.set_text(Field::Temperature, &format!("{PLACEHOLDER}°C"));
        surface.set_text(Field::Condition, PLACEHOLDER);
        surface.set_text(Field::Wind, &wind_label(PLACEHOLDER));
        surface.set_text(Field::Summary, &summary_label(PLACEHOLDER));
    }

    fn render_reading<S: DisplaySurface + ?Sized>(surface: &mut S, reading: &WeatherReading) {
        let time = reading.observed_at.format("%H:%M").to_string();

        surface.set_text(Field::LastUpdated, &last_updated_label(&time));
        surface.set_text(Field::City, &reading.display_city_name);
        surface.set_text(Field::Temperature, &format!("{}°C", reading.temperature_c));
        surface.set_text(Field::Condition, &reading.condition_text);
        surface.set_text(Field::Wind, &wind_label(&reading.wind_speed_kmh.to_string()));
        surface.set_text(Field::Summary, &summary_label(&reading.condition_text));

        let night = is_night(reading.observed_at.hour());
        surface.set_theme(Theme::select(reading.condition, night));
    }
}

fn last_updated_label(time: &str) -> String {
    format!("마지막 업데이트: {time}")
}

fn wind_label(speed: &str) -> String {
    format!("바람: {speed}km/h")
}

fn summary_label(text: &str) -> String {
    format!("날씨: {text}")
}
