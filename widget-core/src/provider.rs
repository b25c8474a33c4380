use crate::{
    Config, WeatherQuery, WeatherReading,
    city::CityDirectory,
    error::FetchError,
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch current weather. `display_name`, when given, becomes the
    /// reading's city name instead of the provider's.
    async fn fetch(
        &self,
        query: &WeatherQuery,
        display_name: Option<&str>,
    ) -> Result<WeatherReading, FetchError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(
    config: &Config,
    directory: Arc<CityDirectory>,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key()?;
    let provider = OpenWeatherProvider::builder(api_key.to_owned(), directory)
        .base_url(config.base_url.clone())
        .lang(config.lang.clone())
        .timeout(config.timeout())
        .build()?;

    Ok(Box::new(provider))
}
