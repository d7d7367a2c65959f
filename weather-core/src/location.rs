//! Sources of the user's current coordinates.
//!
//! A provider answers two questions: may we look up the location, and where
//! are we. Lookups are a single best-effort attempt; "don't know" is `Ok(None)`.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{Coordinates, LocationError};

pub const DEFAULT_GEOIP_URL: &str = "http://ip-api.com/json";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Whether location access is currently granted.
    fn has_permission(&self) -> bool;

    /// Best-known coordinates, or `None` when permission is absent or the
    /// source had nothing to report.
    async fn current_location(&self) -> Result<Option<Coordinates>, LocationError>;
}

/// Fixed coordinates, e.g. from the config file or command-line flags.
#[derive(Debug, Clone, Copy)]
pub struct StaticLocation {
    coordinates: Coordinates,
}

impl StaticLocation {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl LocationProvider for StaticLocation {
    fn has_permission(&self) -> bool {
        true
    }

    async fn current_location(&self) -> Result<Option<Coordinates>, LocationError> {
        Ok(Some(self.coordinates))
    }
}

#[derive(Debug, Deserialize)]
struct GeoIpResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Approximate location derived from the machine's public IP address.
///
/// Looking up the IP discloses it to a third party, so the locator only runs
/// once the user has consented.
#[derive(Debug)]
pub struct GeoIpLocator {
    url: String,
    http: Client,
    consent: AtomicBool,
}

impl GeoIpLocator {
    pub fn new(consent: bool) -> Self {
        Self::with_url(DEFAULT_GEOIP_URL, consent)
    }

    pub fn with_url(url: impl Into<String>, consent: bool) -> Self {
        Self {
            url: url.into(),
            http: Client::new(),
            consent: AtomicBool::new(consent),
        }
    }

    pub fn grant_permission(&self) {
        self.consent.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl LocationProvider for GeoIpLocator {
    fn has_permission(&self) -> bool {
        self.consent.load(Ordering::SeqCst)
    }

    async fn current_location(&self) -> Result<Option<Coordinates>, LocationError> {
        if !self.has_permission() {
            return Ok(None);
        }

        let response = match self
            .http
            .get(&self.url)
            .query(&[("fields", "status,message,lat,lon")])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "Location lookup failed");
                return Ok(None);
            }
        };

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            return Err(LocationError::PermissionDenied);
        }

        if !status.is_success() {
            tracing::debug!(%status, "Location lookup rejected");
            return Ok(None);
        }

        // A 2xx the service can't describe is a fault, not "nothing known".
        let body: GeoIpResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Service(e.without_url().to_string()))?;

        if body.status != "success" {
            tracing::debug!(
                reason = body.message.as_deref().unwrap_or("no reason given"),
                "Location lookup unsuccessful"
            );
            return Ok(None);
        }

        let coordinates = body.lat.zip(body.lon).map(|(lat, lon)| Coordinates::new(lat, lon));
        if let Some(c) = coordinates {
            tracing::info!(coordinates = %c, "Resolved approximate location");
        }

        Ok(coordinates)
    }
}
