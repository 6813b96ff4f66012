use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{coordinate::Coordinate, error::ValidationError};

/// Placeholder used when the AI does not name the location.
pub const UNKNOWN_LOCATION: &str = "N/A";

/// Structured fields the AI was asked to return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherDetails {
    pub location_name: String,
    pub condition: Option<String>,
    pub temperature: Option<String>,
    pub humidity: Option<String>,
    pub wind: Option<String>,
    /// Sources the model wrote into its own answer.
    pub source: Vec<String>,
}

/// A citation attached by the service's search tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub uri: String,
    pub title: String,
}

/// Outcome of one weather query.
///
/// `details.source` and `grounding_sources` come from different places and are
/// kept apart, even when they name the same page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherQueryResult {
    pub coordinate: Coordinate,
    pub details: WeatherDetails,
    pub raw_text: String,
    pub grounding_sources: Vec<GroundingSource>,
    pub retrieved_at: DateTime<Utc>,
}

/// One geocoder hit. Coordinates stay as the strings the service returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodingMatch {
    pub latitude: String,
    pub longitude: String,
    pub display_name: String,
}

impl GeocodingMatch {
    pub fn coordinate(&self) -> Result<Coordinate, ValidationError> {
        Coordinate::parse(&self.latitude, &self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geocoding_match_converts_to_coordinate() {
        let m = GeocodingMatch {
            latitude: "1.2904753".into(),
            longitude: "103.8520359".into(),
            display_name: "Singapore".into(),
        };
        let c = m.coordinate().unwrap();
        assert_eq!(c.latitude(), 1.2904753);

        let bad = GeocodingMatch {
            latitude: "x".into(),
            ..m
        };
        assert!(bad.coordinate().is_err());
    }

    #[test]
    fn details_serialize_with_wire_field_names() {
        let details = WeatherDetails {
            location_name: "Singapore".into(),
            condition: Some("Clear".into()),
            temperature: None,
            humidity: None,
            wind: None,
            source: vec!["NEA".into()],
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["locationName"], "Singapore");
        assert_eq!(json["source"][0], "NEA");
    }
}
