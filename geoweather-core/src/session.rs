//! The one state object behind the app's single page.
//!
//! `Session` owns the current coordinate, the map viewport, the query and
//! search status and the active view. Renderers borrow it read-only.

use crate::{
    coordinate::Coordinate,
    error::{GeocodeError, WeatherError},
    geocode::LocationSearch,
    inflight::RequestSlot,
    location::InitialLocation,
    model::{GeocodingMatch, WeatherQueryResult},
    provider::WeatherProvider,
    sync::{MapView, SyncError, ViewChange},
};

/// Weather query status. Exactly one holds at a time.
#[derive(Debug, Clone, Default)]
pub enum QueryState {
    #[default]
    Idle,
    Loading,
    Failed(String),
    Ready(Box<WeatherQueryResult>),
}

impl QueryState {
    pub fn result(&self) -> Option<&WeatherQueryResult> {
        match self {
            Self::Ready(result) => Some(result.as_ref()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

/// In-page navigation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Main,
    Terms,
    Privacy,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Moved {
        found: GeocodingMatch,
        change: ViewChange,
    },
    NoResults,
}

#[derive(Debug)]
pub struct Session<P, S> {
    provider: P,
    search: S,
    coordinate: Coordinate,
    map: MapView,
    query: QueryState,
    search_error: Option<String>,
    location_status: Option<String>,
    view: View,
    weather_slot: RequestSlot,
    search_slot: RequestSlot,
}

impl<P: WeatherProvider, S: LocationSearch> Session<P, S> {
    pub fn new(provider: P, search: S, initial: InitialLocation) -> Self {
        Self {
            provider,
            search,
            coordinate: initial.coordinate,
            map: MapView::new(initial.coordinate),
            query: QueryState::Idle,
            search_error: None,
            location_status: Some(initial.status),
            view: View::Main,
            weather_slot: RequestSlot::new(),
            search_slot: RequestSlot::new(),
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub fn map(&self) -> &MapView {
        &self.map
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn search_error(&self) -> Option<&str> {
        self.search_error.as_deref()
    }

    pub fn location_status(&self) -> Option<&str> {
        self.location_status.as_deref()
    }

    pub fn clear_location_status(&mut self) {
        self.location_status = None;
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn is_busy(&self) -> bool {
        self.weather_slot.is_busy() || self.search_slot.is_busy()
    }

    /// Handle to the weather slot, for cancelling from another task.
    pub fn weather_slot(&self) -> RequestSlot {
        self.weather_slot.clone()
    }

    /// Handle to the search slot.
    pub fn search_slot(&self) -> RequestSlot {
        self.search_slot.clone()
    }

    pub fn navigate(&mut self, view: View) {
        tracing::debug!(?view, "navigate");
        self.view = view;
    }

    /// Re-apply a device location after returning to the main view.
    pub fn apply_location(&mut self, location: InitialLocation) -> ViewChange {
        self.location_status = Some(location.status);
        if location.found {
            self.set_coordinate(location.coordinate)
        } else {
            ViewChange::None
        }
    }

    /// External coordinate update (device location, search hit).
    pub fn set_coordinate(&mut self, coordinate: Coordinate) -> ViewChange {
        self.coordinate = coordinate;
        self.map.sync_to(coordinate)
    }

    /// Manually typed coordinates. Bad input lands in the query state as an
    /// inline error and nothing else changes.
    pub fn enter_coordinates(
        &mut self,
        latitude: &str,
        longitude: &str,
    ) -> Result<ViewChange, WeatherError> {
        match Coordinate::parse(latitude, longitude) {
            Ok(coordinate) => Ok(self.set_coordinate(coordinate)),
            Err(e) => {
                let err = WeatherError::from(e);
                self.query = QueryState::Failed(err.user_message());
                Err(err)
            }
        }
    }

    /// User drags the marker.
    pub fn drag_marker(&mut self, to: Coordinate) -> Result<ViewChange, SyncError> {
        let adopted = self.map.drag_marker(to)?;
        self.search_error = None;
        Ok(self.set_coordinate(adopted))
    }

    /// Search for `query` and move to its best match.
    pub async fn search(&mut self, query: &str) -> Result<SearchOutcome, GeocodeError> {
        let outcome = self.run_search(query).await;
        self.search_error = match &outcome {
            Ok(SearchOutcome::NoResults) => Some(format!(
                "No results found for \"{}\". Please try a different location.",
                query.trim()
            )),
            Ok(SearchOutcome::Moved { .. }) => None,
            Err(e) => Some(e.user_message()),
        };
        outcome
    }

    async fn run_search(&mut self, query: &str) -> Result<SearchOutcome, GeocodeError> {
        if query.trim().is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }
        let Ok(guard) = self.search_slot.try_acquire() else {
            return Err(GeocodeError::SearchFailed("a search is already in progress".into()));
        };

        self.map.set_busy(true);
        let found = guard.run(self.search.search_first(query)).await;
        drop(guard);
        self.map.set_busy(self.weather_slot.is_busy());

        let found = match found {
            Some(result) => result?,
            None => return Err(GeocodeError::SearchFailed("search cancelled".into())),
        };

        let Some(found) = found else {
            tracing::info!(query, "no geocoding results");
            return Ok(SearchOutcome::NoResults);
        };

        let coordinate = found.coordinate().map_err(|e| {
            tracing::error!(error = %e, ?found, "geocoder returned an unusable coordinate");
            GeocodeError::SearchFailed(e.to_string())
        })?;

        let change = self.set_coordinate(coordinate);
        Ok(SearchOutcome::Moved { found, change })
    }

    /// Query the weather for the current coordinate.
    ///
    /// The state goes `Loading` then `Ready` or `Failed`, and the map is
    /// unlocked on every path. A second call while one is in flight is ignored.
    pub async fn fetch_weather(&mut self) -> &QueryState {
        let coordinate = self.coordinate;

        let Ok(guard) = self.weather_slot.try_acquire() else {
            tracing::warn!("weather query already in flight");
            return &self.query;
        };

        self.query = QueryState::Loading;
        self.map.set_busy(true);

        let outcome = guard
            .run(self.provider.get_weather(&coordinate))
            .await
            .unwrap_or(Err(WeatherError::Cancelled));
        drop(guard);
        self.map.set_busy(self.search_slot.is_busy());

        self.query = match outcome {
            Ok(result) => QueryState::Ready(Box::new(result)),
            Err(e) => {
                tracing::error!(error = %e, "weather query failed");
                QueryState::Failed(e.user_message())
            }
        };
        &self.query
    }
}
