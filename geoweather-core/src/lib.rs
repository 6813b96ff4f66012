//! Core library for the `geoweather` CLI.
//!
//! This crate defines:
//! - Coordinates and the initial location lookup
//! - The Gemini weather client and the Nominatim search client
//! - Marker/viewport synchronization and the session state object
//! - Configuration & credentials handling
//!
//! It is used by `geoweather-cli`, but can also be reused by other front ends.

pub mod config;
pub mod coordinate;
pub mod error;
pub mod geocode;
pub mod inflight;
pub mod location;
pub mod model;
pub mod provider;
pub mod report;
pub mod session;
pub mod sync;

pub use config::Config;
pub use coordinate::Coordinate;
pub use error::{GeocodeError, ValidationError, WeatherError};
pub use geocode::{LocationSearch, NominatimClient};
pub use inflight::{RequestSlot, SlotBusy};
pub use location::{ConfiguredLocation, InitialLocation, LocationSource, resolve_initial};
pub use model::{GeocodingMatch, GroundingSource, WeatherDetails, WeatherQueryResult};
pub use provider::{WeatherProvider, gemini::GeminiProvider, gemini_from_config};
pub use session::{QueryState, SearchOutcome, Session, View};
pub use sync::{MapView, SyncError, ViewChange};
