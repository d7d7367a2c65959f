//! Core library for the `weather-today` app.
//!
//! This crate defines:
//! - Shared domain models (coordinates, weather responses)
//! - The OpenWeatherMap client, repository and use case
//! - Location providers and the connectivity probe
//! - The controller that drives the single weather screen
//! - Configuration & credentials handling
//!
//! It is used by `weather-today`, but the controller can drive any front end.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod location;
pub mod model;
pub mod network;
#[cfg(test)]
mod properties;
pub mod repository;
pub mod usecase;

pub use client::{OpenWeatherClient, Units, WeatherApi};
pub use config::{Config, LocationConfig, LocationMode};
pub use controller::{RefreshOutcome, WeatherController, WeatherState};
pub use error::{LocationError, WeatherError};
pub use location::{GeoIpLocator, LocationProvider, StaticLocation};
pub use model::{Clouds, Condition, Coordinates, Measurements, Sys, WeatherResponse, Wind};
pub use network::{NetworkMonitor, TcpProbe};
pub use repository::WeatherRepository;
pub use usecase::{GetWeather, GetWeatherUseCase};
