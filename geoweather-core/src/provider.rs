use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config, coordinate::Coordinate, error::WeatherError, model::WeatherQueryResult,
    provider::gemini::GeminiProvider,
};

pub mod gemini;
pub mod parse;

pub use parse::{build_prompt, parse_weather_text, strip_code_fence};

/// Answers "what is the weather at this coordinate right now".
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn get_weather(&self, coordinate: &Coordinate)
    -> Result<WeatherQueryResult, WeatherError>;
}

/// Construct the Gemini provider from config (and the environment for the key).
pub fn gemini_from_config(config: &Config) -> Result<GeminiProvider, WeatherError> {
    let api_key = config.api_key().ok_or_else(|| {
        WeatherError::Credential(
            "Gemini API Key is not configured. \
             Hint: run `geoweather configure` or set the GEMINI_API_KEY environment variable."
                .to_string(),
        )
    })?;

    Ok(GeminiProvider::new(api_key)
        .with_model(config.model())
        .with_base_url(config.gemini_base_url()))
}
