use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Local;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    city::CityDirectory,
    error::FetchError,
    model::{ConditionCode, WeatherQuery, WeatherReading, round_half_up, wind_kmh},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_LANG: &str = "kr";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    lang: String,
    directory: Arc<CityDirectory>,
    http: Client,
}

#[derive(Debug)]
pub struct OpenWeatherBuilder {
    api_key: String,
    base_url: String,
    lang: String,
    timeout: Option<Duration>,
    directory: Arc<CityDirectory>,
}

impl OpenWeatherBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<OpenWeatherProvider, reqwest::Error> {
        let mut http = Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }

        Ok(OpenWeatherProvider {
            api_key: self.api_key,
            base_url: self.base_url,
            lang: self.lang,
            directory: self.directory,
            http: http.build()?,
        })
    }
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, directory: Arc<CityDirectory>) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            lang: DEFAULT_LANG.to_string(),
            directory,
            http: Client::new(),
        }
    }

    pub fn builder(api_key: String, directory: Arc<CityDirectory>) -> OpenWeatherBuilder {
        OpenWeatherBuilder {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            lang: DEFAULT_LANG.to_string(),
            timeout: None,
            directory,
        }
    }

    fn query_params(&self, query: &WeatherQuery) -> Vec<(&'static str, String)> {
        let mut params = match query {
            WeatherQuery::City { name } => vec![("q", name.clone())],
            WeatherQuery::Coordinates(c) => vec![
                ("lat", c.latitude.to_string()),
                ("lon", c.longitude.to_string()),
            ],
        };

        params.push(("appid", self.api_key.clone()));
        params.push(("units", "metric".to_string()));
        params.push(("lang", self.lang.clone()));
        params
    }

    fn normalize(
        &self,
        parsed: OwCurrentResponse,
        display_name: Option<&str>,
    ) -> Result<WeatherReading, FetchError> {
        let weather = parsed.weather.first().ok_or_else(|| {
            FetchError::Network("OpenWeather response contained no weather entry".to_string())
        })?;

        let display_city_name = match display_name {
            Some(name) => name.to_string(),
            None => self
                .directory
                .local_for(&parsed.name)
                .map(str::to_string)
                .unwrap_or_else(|| parsed.name.clone()),
        };

        Ok(WeatherReading {
            temperature_c: round_half_up(parsed.main.temp),
            condition: ConditionCode::from_keyword(&weather.main),
            condition_text: weather.description.clone(),
            wind_speed_kmh: wind_kmh(parsed.wind.speed),
            display_city_name,
            observed_at: Local::now(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch(
        &self,
        query: &WeatherQuery,
        display_name: Option<&str>,
    ) -> Result<WeatherReading, FetchError> {
        debug!(?query, "requesting current weather from OpenWeather");

        let res = self
            .http
            .get(&self.base_url)
            .query(&self.query_params(query))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenWeather request failed");
                FetchError::Network(format!("Failed to send request to OpenWeather: {e}"))
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            FetchError::Network(format!("Failed to read OpenWeather response body: {e}"))
        })?;

        if !status.is_success() {
            warn!(%status, body = %truncate_body(&body), "OpenWeather rejected the request");
            return Err(FetchError::CityNotFound {
                status: status.as_u16(),
            });
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "OpenWeather response did not parse");
            FetchError::Network(format!("Failed to parse OpenWeather JSON: {e}"))
        })?;

        self.normalize(parsed, display_name)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenWeatherProvider {
        OpenWeatherProvider::new("KEY".to_string(), Arc::new(CityDirectory::korean()))
    }

    fn response(name: &str, weather: Vec<OwWeather>) -> OwCurrentResponse {
        OwCurrentResponse {
            name: name.to_string(),
            main: OwMain { temp: 23.7 },
            weather,
            wind: OwWind { speed: 2.0 },
        }
    }

    fn clear_sky() -> Vec<OwWeather> {
        vec![OwWeather {
            main: "Clear".to_string(),
            description: "clear sky".to_string(),
        }]
    }

    #[test]
    fn city_query_carries_metric_units_and_language() {
        let params = provider().query_params(&WeatherQuery::city("Seoul"));

        assert_eq!(params[0], ("q", "Seoul".to_string()));
        assert!(params.contains(&("appid", "KEY".to_string())));
        assert!(params.contains(&("units", "metric".to_string())));
        assert!(params.contains(&("lang", "kr".to_string())));
    }

    #[test]
    fn coordinate_query_uses_lat_and_lon() {
        let params = provider().query_params(&WeatherQuery::coordinates(37.5, 127.25));

        assert_eq!(params[0], ("lat", "37.5".to_string()));
        assert_eq!(params[1], ("lon", "127.25".to_string()));
        assert!(!params.iter().any(|(k, _)| *k == "q"));
    }

    #[test]
    fn display_name_prefers_caller_then_reverse_lookup() {
        let p = provider();

        let reading = p.normalize(response("Seoul", clear_sky()), None).unwrap();
        assert_eq!(reading.display_city_name, "서울");
        assert_eq!(reading.temperature_c, 24);
        assert_eq!(reading.wind_speed_kmh, 7);
        assert_eq!(reading.condition, ConditionCode::Clear);

        let reading = p.normalize(response("Seoul", clear_sky()), Some("Seoul")).unwrap();
        assert_eq!(reading.display_city_name, "Seoul");

        let reading = p.normalize(response("Tokyo", clear_sky()), None).unwrap();
        assert_eq!(reading.display_city_name, "Tokyo");
    }

    #[test]
    fn missing_weather_entry_is_a_network_error() {
        let err = provider().normalize(response("Seoul", Vec::new()), None).unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "날".repeat(300);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
