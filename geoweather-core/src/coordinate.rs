use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A range-checked geographic point in decimal degrees.
///
/// Values can only be built through [`Coordinate::new`] or [`Coordinate::parse`],
/// so latitude is always within [-90, 90] and longitude within [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = ValidationError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    /// Used when no device location is available.
    pub const DEFAULT: Coordinate = Coordinate {
        latitude: 0.0,
        longitude: 0.0,
    };

    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        // NaN fails both range checks.
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::OutOfRange { latitude, longitude });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse user-supplied text fields.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, ValidationError> {
        let (lat, lon) = (latitude.trim(), longitude.trim());
        if lat.is_empty() || lon.is_empty() {
            return Err(ValidationError::MissingCoordinate);
        }

        let parse = |s: &str| {
            s.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ValidationError::NotANumber(s.to_string()))
        };

        Self::new(parse(lat)?, parse(lon)?)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn is_default(&self) -> bool {
        *self == Self::DEFAULT
    }

    /// Latitude at the 6-decimal precision used in prompts and marker moves.
    pub fn latitude_str(&self) -> String {
        format!("{:.6}", self.latitude)
    }

    pub fn longitude_str(&self) -> String {
        format!("{:.6}", self.longitude)
    }

    /// Same point rounded to 6 decimals.
    pub fn rounded(&self) -> Self {
        let round = |v: f64| (v * 1e6).round() / 1e6;
        Self {
            latitude: round(self.latitude),
            longitude: round(self.longitude),
        }
    }

    /// Four-decimal "Latitude: .., Longitude: .." line.
    pub fn short_display(&self) -> String {
        format!("Latitude: {:.4}, Longitude: {:.4}", self.latitude, self.longitude)
    }

    /// Great-circle distance in metres.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_M * c
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude_str(), self.longitude_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_full_valid_range() {
        for (lat, lon) in [(-90.0, -180.0), (90.0, 180.0), (0.0, 0.0), (45.5, -122.6)] {
            assert!(Coordinate::new(lat, lon).is_ok(), "({lat}, {lon}) should be valid");
        }
    }

    #[test]
    fn rejects_out_of_range() {
        for (lat, lon) in [
            (90.0001, 0.0),
            (-91.0, 0.0),
            (0.0, 180.5),
            (0.0, -181.0),
            (f64::NAN, 0.0),
        ] {
            let err = Coordinate::new(lat, lon).unwrap_err();
            assert!(matches!(err, ValidationError::OutOfRange { .. }));
        }
    }

    #[test]
    fn parse_reports_each_failure_kind() {
        assert_eq!(Coordinate::parse("  ", "10").unwrap_err(), ValidationError::MissingCoordinate);
        assert!(matches!(Coordinate::parse("abc", "10"), Err(ValidationError::NotANumber(_))));
        assert!(matches!(Coordinate::parse("inf", "10"), Err(ValidationError::NotANumber(_))));
        assert!(matches!(Coordinate::parse("95", "10"), Err(ValidationError::OutOfRange { .. })));

        let c = Coordinate::parse(" 1.5 ", "-2.25").unwrap();
        assert_eq!(c.latitude(), 1.5);
        assert_eq!(c.longitude(), -2.25);
    }

    #[test]
    fn formats_at_display_precision() {
        let c = Coordinate::new(1.234567, 103.456789).unwrap();
        assert_eq!(c.latitude_str(), "1.234567");
        assert_eq!(c.longitude_str(), "103.456789");
        assert_eq!(c.short_display(), "Latitude: 1.2346, Longitude: 103.4568");
    }

    #[test]
    fn haversine_distance_is_plausible() {
        let berlin = Coordinate::new(52.5200, 13.4050).unwrap();
        let paris = Coordinate::new(48.8566, 2.3522).unwrap();
        let km = berlin.distance_to(&paris) / 1000.0;
        assert!((km - 878.0).abs() < 10.0, "got {km}");
        assert_eq!(berlin.distance_to(&berlin), 0.0);
    }

    #[test]
    fn deserialize_validates_range() {
        let ok: Result<Coordinate, _> = serde_json::from_str(r#"{"latitude":1.0,"longitude":2.0}"#);
        assert!(ok.is_ok());
        let bad: Result<Coordinate, _> =
            serde_json::from_str(r#"{"latitude":100.0,"longitude":2.0}"#);
        assert!(bad.is_err());
    }
}
