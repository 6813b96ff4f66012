//! Prompt construction and best-effort extraction of the weather JSON from
//! free-form model output.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::{
    coordinate::Coordinate,
    error::WeatherError,
    model::{UNKNOWN_LOCATION, WeatherDetails},
};

const SNIPPET_CHARS: usize = 200;

static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```(?:json)?\s*\n?(.*?)\n?\s*```$").expect("fence regex is valid")
});

/// Fixed weather prompt for `coordinate`.
pub fn build_prompt(coordinate: &Coordinate) -> String {
    let latitude = coordinate.latitude_str();
    let longitude = coordinate.longitude_str();

    format!(
        r#"Using Google Search to find the most current and reliable information, provide real-time weather for latitude {latitude}, longitude {longitude}.
Prioritize official weather stations or very recent (e.g., within the last hour) weather reports for this specific location.

Your response MUST be a JSON object containing the following fields:
- "locationName": string (name of the location or nearest city. If not identifiable, use "Unknown Location" or similar)
- "condition": string (e.g., "Sunny", "Cloudy", "Rainy", "Partly Cloudy with Showers")
- "temperature": string (e.g., "22°C / 72°F")
- "humidity": string (e.g., "55%")
- "wind": string (e.g., "10 km/h NW", "5 mph from South")
- "source": array of strings (e.g., ["National Weather Service", "OpenWeatherMap API"])

Example JSON response:
{{
  "locationName": "Mountain View, CA, USA",
  "condition": "Partly Cloudy",
  "temperature": "18°C / 64°F",
  "humidity": "60%",
  "wind": "5 km/h West",
  "source": ["www.example.com", "weather station of bandara soekarno hatta"]
}}

Ensure your response is ONLY the JSON object, with no other text, comments, or markdown formatting (like ```json ... ```) around it.
If web sources are consulted via the search tool, ensure they are cited through the API's grounding mechanism."#
    )
}

/// Trim `raw` and drop a surrounding ```` ``` ```` or ```` ```json ```` fence, if any.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    match FENCE.captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) if !inner.as_str().is_empty() => inner.as_str().trim(),
        _ => trimmed,
    }
}

/// Parse the model's text into [`WeatherDetails`].
pub fn parse_weather_text(raw: &str) -> Result<WeatherDetails, WeatherError> {
    let invalid = || WeatherError::InvalidResponseFormat {
        snippet: snippet(raw),
    };

    let body = strip_code_fence(raw);
    if body.is_empty() {
        tracing::error!("weather service returned empty text");
        return Err(invalid());
    }

    let value: Value = serde_json::from_str(body).map_err(|e| {
        tracing::error!(error = %e, raw, "failed to parse weather JSON");
        invalid()
    })?;

    let Value::Object(fields) = value else {
        tracing::error!(raw, "weather JSON is not an object");
        return Err(invalid());
    };

    let location_name = fields
        .get("locationName")
        .filter(|v| !is_falsy(v))
        .and_then(scalar_text)
        .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());

    Ok(WeatherDetails {
        location_name,
        condition: fields.get("condition").and_then(scalar_text),
        temperature: fields.get("temperature").and_then(scalar_text),
        humidity: fields.get("humidity").and_then(scalar_text),
        wind: fields.get("wind").and_then(scalar_text),
        source: coerce_source(fields.get("source")),
    })
}

/// Array passes through, a lone value becomes a one-element list, falsy values an empty one.
fn coerce_source(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(other) if !is_falsy(other) => scalar_text(other).into_iter().collect(),
        _ => Vec::new(),
    }
}

/// `null`, `false`, `""` and zero count as "no value" in model output.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn snippet(raw: &str) -> String {
    if raw.is_empty() {
        return "undefined".to_string();
    }
    raw.chars().take(SNIPPET_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGAPORE: &str = r#"{"locationName":"Singapore","condition":"Clear","temperature":"30°C","humidity":"70%","wind":"5 km/h","source":"NEA"}"#;

    #[test]
    fn prompt_embeds_both_coordinates() {
        let c = Coordinate::new(1.234567, 103.456789).unwrap();
        let prompt = build_prompt(&c);
        assert!(prompt.contains("latitude 1.234567, longitude 103.456789"));
        assert!(prompt.contains("\"locationName\""));
        assert!(prompt.contains("ONLY the JSON object"));
        assert!(prompt.contains("weather station of bandara soekarno hatta"));
    }

    #[test]
    fn bare_string_source_becomes_single_element_list() {
        let details = parse_weather_text(SINGAPORE).unwrap();
        assert_eq!(details.source, vec!["NEA".to_string()]);
        assert_eq!(details.location_name, "Singapore");
        assert_eq!(details.temperature.as_deref(), Some("30°C"));
    }

    #[test]
    fn fenced_and_unfenced_parse_identically() {
        let plain = parse_weather_text(SINGAPORE).unwrap();
        for fenced in [
            format!("```json\n{SINGAPORE}\n```"),
            format!("```\n{SINGAPORE}\n```"),
            format!("  ```json{SINGAPORE}```  \n"),
        ] {
            assert_eq!(parse_weather_text(&fenced).unwrap(), plain, "input: {fenced}");
        }
    }

    #[test]
    fn source_array_passes_through_and_absent_is_empty() {
        let details = parse_weather_text(r#"{"locationName":"X","source":["a","b"]}"#).unwrap();
        assert_eq!(details.source, vec!["a", "b"]);

        let details = parse_weather_text(r#"{"locationName":"X"}"#).unwrap();
        assert!(details.source.is_empty());

        let details = parse_weather_text(r#"{"locationName":"X","source":""}"#).unwrap();
        assert!(details.source.is_empty());
    }

    #[test]
    fn missing_location_name_uses_sentinel() {
        let details = parse_weather_text(r#"{"condition":"Rain"}"#).unwrap();
        assert_eq!(details.location_name, UNKNOWN_LOCATION);
        assert_eq!(details.condition.as_deref(), Some("Rain"));
        assert!(details.wind.is_none());

        let details = parse_weather_text(r#"{"locationName":""}"#).unwrap();
        assert_eq!(details.location_name, UNKNOWN_LOCATION);
    }

    #[test]
    fn zero_and_false_count_as_missing() {
        let details = parse_weather_text(r#"{"locationName":0,"source":0}"#).unwrap();
        assert_eq!(details.location_name, UNKNOWN_LOCATION);
        assert!(details.source.is_empty());

        let details = parse_weather_text(r#"{"locationName":false,"source":false}"#).unwrap();
        assert_eq!(details.location_name, UNKNOWN_LOCATION);
        assert!(details.source.is_empty());

        let details = parse_weather_text(r#"{"locationName":7,"source":1.5}"#).unwrap();
        assert_eq!(details.location_name, "7");
        assert_eq!(details.source, vec!["1.5"]);
    }

    #[test]
    fn numeric_fields_are_stringified() {
        let details = parse_weather_text(r#"{"temperature":30,"humidity":null}"#).unwrap();
        assert_eq!(details.temperature.as_deref(), Some("30"));
        assert!(details.humidity.is_none());
    }

    #[test]
    fn invalid_json_carries_truncated_snippet() {
        let raw = format!("The weather is nice. {}", "x".repeat(500));
        let err = parse_weather_text(&raw).unwrap_err();
        match err {
            WeatherError::InvalidResponseFormat { snippet } => {
                assert_eq!(snippet.chars().count(), 200);
                assert!(snippet.starts_with("The weather is nice."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_and_non_object_responses_are_rejected() {
        assert!(matches!(
            parse_weather_text("   "),
            Err(WeatherError::InvalidResponseFormat { .. })
        ));
        assert!(matches!(
            parse_weather_text("[1, 2]"),
            Err(WeatherError::InvalidResponseFormat { .. })
        ));
    }

    #[test]
    fn snippet_respects_char_boundaries() {
        let raw = "°".repeat(300);
        let err = parse_weather_text(&raw).unwrap_err();
        let WeatherError::InvalidResponseFormat { snippet } = err else {
            panic!("expected format error");
        };
        assert_eq!(snippet.chars().count(), 200);
    }
}
