use async_trait::async_trait;
use reqwest::Client;

use crate::{WeatherError, WeatherResponse};

use super::{Units, WeatherApi};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at another host, e.g. a proxy or a test server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }
}

impl Default for OpenWeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WeatherApi for OpenWeatherClient {
    async fn get_current_weather(
        &self,
        latitude: f64,
        longitude: f64,
        api_key: &str,
        units: Units,
    ) -> Result<WeatherResponse, WeatherError> {
        let url = format!("{}/weather", self.base_url);

        tracing::debug!(%latitude, %longitude, %units, "Requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("appid", api_key.to_string()),
                ("units", units.as_str().to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::warn!(%status, "Weather request rejected");
            return Err(WeatherError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: WeatherResponse = serde_json::from_str(&body)?;

        tracing::info!(city = %parsed.name, temp = parsed.main.temperature, "Current weather received");
        Ok(parsed)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
