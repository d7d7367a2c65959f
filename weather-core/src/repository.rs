use std::sync::Arc;

use crate::{
    WeatherError, WeatherResponse,
    client::{Units, WeatherApi},
};

/// Binds a weather client to the credentials and units it should be called with.
#[derive(Debug, Clone)]
pub struct WeatherRepository {
    api: Arc<dyn WeatherApi>,
    api_key: String,
    units: Units,
}

impl WeatherRepository {
    pub fn new(api: Arc<dyn WeatherApi>, api_key: impl Into<String>, units: Units) -> Self {
        let api_key = api_key.into();
        if api_key.is_empty() {
            tracing::warn!("No weather API key configured; requests will be rejected by the service");
        }

        Self { api, api_key, units }
    }

    pub async fn get_current_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherResponse, WeatherError> {
        self.api
            .get_current_weather(latitude, longitude, &self.api_key, self.units)
            .await
    }
}
