//! Device location: where positions come from and the on/off mode.

use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{error::GeolocationError, model::Coordinates};

pub const DEFAULT_GEOLOCATION_URL: &str = "http://ip-api.com/json/";

/// Something that can report the device's current position.
#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// A position given up front, e.g. from command-line flags.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

#[async_trait]
impl LocationSource for FixedPosition {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.0)
    }
}

/// Approximate position from the public IP address (ip-api.com JSON format).
#[derive(Debug, Clone)]
pub struct IpGeolocation {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

impl IpGeolocation {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            http,
        })
    }
}

#[async_trait]
impl LocationSource for IpGeolocation {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        debug!(url = %self.url, "looking up position by IP");

        let res = self
            .http
            .get(&self.url)
            .query(&[("fields", "status,message,lat,lon")])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "IP geolocation request failed");
                GeolocationError::Unavailable(format!("lookup request failed: {e}"))
            })?;

        if !res.status().is_success() {
            return Err(GeolocationError::Unavailable(format!(
                "lookup service answered with status {}",
                res.status()
            )));
        }

        let parsed: IpApiResponse = res
            .json()
            .await
            .map_err(|e| GeolocationError::Unavailable(format!("malformed lookup response: {e}")))?;

        if parsed.status != "success" {
            let reason = parsed.message.unwrap_or_else(|| parsed.status.clone());
            return Err(GeolocationError::Unavailable(reason));
        }

        match (parsed.lat, parsed.lon) {
            (Some(latitude), Some(longitude)) => Ok(Coordinates {
                latitude,
                longitude,
            }),
            _ => Err(GeolocationError::Unavailable(
                "lookup response had no coordinates".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocationMode {
    #[default]
    Manual,
    DeviceLocationActive,
}

/// Two-state location toggle. Fetching is left to the widget; this only
/// tracks which mode is current.
#[derive(Debug, Clone, Default)]
pub struct LocationController {
    mode: LocationMode,
}

impl LocationController {
    pub fn mode(&self) -> LocationMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.mode == LocationMode::DeviceLocationActive
    }

    /// A location-based fetch succeeded.
    pub fn activate(&mut self) {
        self.mode = LocationMode::DeviceLocationActive;
    }

    pub fn deactivate(&mut self) {
        self.mode = LocationMode::Manual;
    }
}
