use async_trait::async_trait;

use crate::{WeatherError, WeatherResponse, repository::WeatherRepository};

/// The one operation the controller needs from the data layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GetWeather: Send + Sync {
    async fn invoke(&self, latitude: f64, longitude: f64) -> Result<WeatherResponse, WeatherError>;
}

#[derive(Debug, Clone)]
pub struct GetWeatherUseCase {
    repository: WeatherRepository,
}

impl GetWeatherUseCase {
    pub fn new(repository: WeatherRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl GetWeather for GetWeatherUseCase {
    async fn invoke(&self, latitude: f64, longitude: f64) -> Result<WeatherResponse, WeatherError> {
        self.repository.get_current_weather(latitude, longitude).await
    }
}
