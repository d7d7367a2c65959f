use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// One weather condition descriptor, e.g. `800 / Clear / clear sky / 01d`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    #[serde(rename = "temp")]
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: i64,
    pub humidity: i64,
    #[serde(default)]
    pub sea_level: Option<i64>,
    #[serde(default, rename = "grnd_level")]
    pub ground_level: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Wind {
    #[serde(default)]
    pub speed: f64,
    #[serde(default, rename = "deg")]
    pub direction: i64,
    #[serde(default)]
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Clouds {
    #[serde(default)]
    pub all: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Sys {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub sunrise: Option<i64>,
    #[serde(default)]
    pub sunset: Option<i64>,
}

/// Current weather as returned by the OpenWeatherMap `/weather` endpoint.
///
/// Immutable once received; nothing in the app mutates or persists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    #[serde(rename = "coord")]
    pub coordinates: Coordinates,
    pub weather: Vec<Condition>,
    #[serde(default)]
    pub base: String,
    pub main: Measurements,
    #[serde(default)]
    pub visibility: i64,
    #[serde(default)]
    pub wind: Wind,
    #[serde(default)]
    pub clouds: Clouds,
    pub dt: i64,
    #[serde(default)]
    pub sys: Sys,
    /// Shift from UTC in seconds.
    #[serde(default)]
    pub timezone: i32,
    pub id: i64,
    pub name: String,
    pub cod: i64,
}

impl WeatherResponse {
    /// The first condition the service listed, if any.
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.weather.first()
    }

    pub fn icon_url(&self) -> Option<String> {
        self.primary_condition()
            .map(|c| format!("{ICON_BASE_URL}/{}@2x.png", c.icon))
    }

    /// Description of the primary condition with its first letter upper-cased.
    pub fn description_capitalized(&self) -> String {
        let Some(condition) = self.primary_condition() else {
            return String::new();
        };

        let mut chars = condition.description.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.dt, 0)
    }

    /// Observation time in the city's own offset.
    pub fn local_observed_at(&self) -> Option<DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(self.timezone)?;
        self.observed_at().map(|utc| utc.with_timezone(&offset))
    }
}
