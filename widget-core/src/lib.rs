//! Core library for the city weather widget.
//!
//! This crate defines:
//! - Korean/English city name resolution and incremental search
//! - The weather provider abstraction and its OpenWeather implementation
//! - Rendering of readings onto an abstract display surface
//! - Device-location mode and the widget that ties it all together
//!
//! It is used by `widget-cli`, but any host that implements
//! [`DisplaySurface`] can drive a [`Widget`].

pub mod city;
pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod present;
pub mod provider;
pub mod search;
pub mod surface;
pub mod widget;

pub use city::{CityAlias, CityDirectory, Resolved};
pub use config::Config;
pub use error::{FetchError, GeolocationError, WidgetError};
pub use location::{FixedPosition, IpGeolocation, LocationSource};
pub use model::{ConditionCode, Coordinates, UiState, WeatherQuery, WeatherReading};
pub use present::{Presenter, Theme};
pub use provider::WeatherProvider;
pub use surface::{DisplaySurface, Field, PanelSnapshot};
pub use widget::Widget;
