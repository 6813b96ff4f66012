//! Initial coordinate resolution: device location first, default otherwise.

use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};
use thiserror::Error;

use crate::coordinate::Coordinate;

/// How long a one-shot position request may take before falling back.
pub const GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(10);

pub const STATUS_FOUND: &str = "Location found!";
pub const STATUS_FALLBACK: &str =
    "Could not get location. Using default. Please grant permission or select manually.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location service unavailable")]
    Unavailable,

    #[error("location request timed out")]
    Timeout,
}

#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinate, LocationError>;
}

/// Location taken from the user's configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredLocation {
    home: Option<Coordinate>,
}

impl ConfiguredLocation {
    pub fn new(home: Option<Coordinate>) -> Self {
        Self { home }
    }
}

#[async_trait]
impl LocationSource for ConfiguredLocation {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        self.home.ok_or(LocationError::Unavailable)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitialLocation {
    pub coordinate: Coordinate,
    pub status: String,
    pub found: bool,
}

impl InitialLocation {
    pub fn fallback() -> Self {
        Self {
            coordinate: Coordinate::DEFAULT,
            status: STATUS_FALLBACK.to_string(),
            found: false,
        }
    }
}

/// One-shot position request bounded by `timeout`. Never fails.
pub async fn resolve_initial(source: &dyn LocationSource, timeout: Duration) -> InitialLocation {
    let result = match tokio::time::timeout(timeout, source.current_position()).await {
        Ok(r) => r,
        Err(_) => Err(LocationError::Timeout),
    };

    match result {
        Ok(coordinate) => {
            tracing::debug!(%coordinate, "device location resolved");
            InitialLocation {
                coordinate: coordinate.rounded(),
                status: STATUS_FOUND.to_string(),
                found: true,
            }
        }
        Err(e) => {
            tracing::warn!("Geolocation error: {e}");
            InitialLocation::fallback()
        }
    }
}
