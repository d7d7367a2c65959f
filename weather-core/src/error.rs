use thiserror::Error;

/// Failures of a weather lookup.
///
/// The display text is what the user sees, so it carries the underlying
/// message as-is. Transport errors must never carry the request URL: its
/// query string holds the API key.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("{0}")]
    Http(#[source] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{0}")]
    Decode(#[from] serde_json::Error),

    /// Anything else; the message is shown to the user verbatim.
    #[error("{0}")]
    Other(String),
}

/// Faults raised by a location source.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Location permission not granted")]
    PermissionDenied,

    #[error("Location service failed: {0}")]
    Service(String),
}

impl From<reqwest::Error> for WeatherError {
    fn from(e: reqwest::Error) -> Self {
        WeatherError::Http(e.without_url())
    }
}
