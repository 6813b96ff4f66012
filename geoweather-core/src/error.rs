//! Error types surfaced by the weather and search clients.
//!
//! Every variant maps to a message that can be shown to the user as-is via
//! `user_message()`. The `Display` impl keeps the technical detail for logs.

use thiserror::Error;

/// Bad or missing coordinate input, reported before any network call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("latitude or longitude is empty")]
    MissingCoordinate,

    #[error("latitude or longitude is not a number: {0}")]
    NotANumber(String),

    #[error("coordinate out of range: latitude {latitude}, longitude {longitude}")]
    OutOfRange { latitude: f64, longitude: f64 },
}

impl ValidationError {
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCoordinate => "Please select a location on the map.".to_string(),
            Self::NotANumber(_) => "Latitude and Longitude must be valid numbers.".to_string(),
            Self::OutOfRange { .. } => "Coordinates are out of valid range. \
                 Latitude: -90 to 90, Longitude: -180 to 180."
                .to_string(),
        }
    }
}

/// Failures of the AI weather query.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("missing or invalid API key: {0}")]
    Credential(String),

    #[error("API quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("response is not the expected JSON object; snippet: {snippet}")]
    InvalidResponseFormat { snippet: String },

    #[error("request cancelled")]
    Cancelled,

    #[error("weather query failed: {0}")]
    Generic(String),
}

impl WeatherError {
    /// User-friendly message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.user_message(),
            Self::Credential(_) => "Invalid or missing Gemini API Key. Please check your \
                 configuration and ensure the key has correct permissions and is valid."
                .to_string(),
            Self::QuotaExceeded(_) => {
                "API quota exceeded. Please check your Gemini API usage and limits.".to_string()
            }
            Self::InvalidRequest(details) => format!(
                "The request to the weather service was invalid. \
                 This might be a configuration issue. Details: {details}"
            ),
            Self::InvalidResponseFormat { snippet } => format!(
                "Received an invalid JSON response from the weather service. \
                 The AI might not have returned valid JSON. Raw response snippet: {snippet}"
            ),
            Self::Cancelled => "The request was cancelled.".to_string(),
            Self::Generic(details) if details.is_empty() => {
                "Failed to fetch weather data. Please try again later.".to_string()
            }
            Self::Generic(details) => format!("Failed to fetch weather data. {details}"),
        }
    }

    /// Classify a failure reported by the AI service from its HTTP status and message.
    pub fn from_service(status: u16, service_status: Option<&str>, message: &str) -> Self {
        let lower = message.to_lowercase();

        if status == 401
            || status == 403
            || lower.contains("api key")
            || lower.contains("permission denied")
            || lower.contains("authentication")
        {
            return Self::Credential(message.to_string());
        }
        if status == 429 || lower.contains("quota") {
            return Self::QuotaExceeded(message.to_string());
        }
        if service_status == Some("INVALID_ARGUMENT") || message.contains("INVALID_ARGUMENT") {
            return Self::InvalidRequest(message.to_string());
        }

        Self::Generic(format!("status {status}: {message}"))
    }
}

/// Failures of the geocoding search.
///
/// An empty result set is not an error; see `LocationSearch::search_first`.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("search query is empty")]
    EmptyQuery,

    #[error("search service unavailable: {0}")]
    SearchUnavailable(String),

    #[error("search failed: {0}")]
    SearchFailed(String),
}

impl GeocodeError {
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyQuery => "Please enter a location to search.".to_string(),
            Self::SearchUnavailable(_) => "Could not connect to the location search service. \
                 Please try again later."
                .to_string(),
            Self::SearchFailed(_) => "An error occurred while searching for the location. \
                 Please check your connection and try again."
                .to_string(),
        }
    }
}
