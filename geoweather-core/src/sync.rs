//! Headless map viewport: keeps one marker in step with the current
//! coordinate and locks user manipulation while a request is pending.

use thiserror::Error;

use crate::coordinate::Coordinate;

/// Distance from the view center beyond which an external update recenters the view.
pub const RECENTER_THRESHOLD_METERS: f64 = 1000.0;

pub const MIN_ZOOM: u8 = 2;
pub const MAX_ZOOM: u8 = 18;
const WORLD_ZOOM: u8 = 2;
const LOCAL_ZOOM: u8 = 12;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("map is locked while a request is in flight")]
    Locked,
}

/// What an update did to the visible map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewChange {
    None,
    MarkerMoved { marker: Coordinate },
    Recentered { center: Coordinate, zoom: u8 },
}

#[derive(Debug, Clone)]
pub struct MapView {
    center: Coordinate,
    zoom: u8,
    marker: Coordinate,
    interactive: bool,
    /// Set once the first external coordinate has been applied.
    placed: bool,
}

impl MapView {
    pub fn new(initial: Coordinate) -> Self {
        let zoom = if initial.is_default() {
            WORLD_ZOOM
        } else {
            LOCAL_ZOOM
        };
        Self {
            center: initial,
            zoom,
            marker: initial,
            interactive: true,
            placed: false,
        }
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn marker(&self) -> Coordinate {
        self.marker
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Apply a coordinate that originated outside the map.
    ///
    /// A value equal to the marker's position is a no-op, which is what stops a
    /// drag from echoing back as a recenter.
    pub fn sync_to(&mut self, coordinate: Coordinate) -> ViewChange {
        if coordinate == self.marker {
            return ViewChange::None;
        }
        self.marker = coordinate;

        let first = !self.placed;
        self.placed = true;

        let is_default = coordinate.is_default();
        let far = self.center.distance_to(&coordinate) > RECENTER_THRESHOLD_METERS;

        if first || far {
            let zoom = if is_default && self.zoom < 5 {
                WORLD_ZOOM
            } else if self.zoom < 10 {
                LOCAL_ZOOM
            } else {
                self.zoom
            };
            return self.set_view(coordinate, zoom);
        }

        if is_default && self.zoom > 3 {
            return self.set_view(coordinate, WORLD_ZOOM);
        }

        ViewChange::MarkerMoved { marker: coordinate }
    }

    /// User drags the marker. Returns the coordinate the session should adopt.
    pub fn drag_marker(&mut self, to: Coordinate) -> Result<Coordinate, SyncError> {
        self.ensure_interactive()?;
        self.marker = to.rounded();
        self.placed = true;
        Ok(self.marker)
    }

    pub fn pan(&mut self, center: Coordinate) -> Result<(), SyncError> {
        self.ensure_interactive()?;
        self.center = center;
        Ok(())
    }

    pub fn zoom_to(&mut self, zoom: u8) -> Result<(), SyncError> {
        self.ensure_interactive()?;
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        Ok(())
    }

    /// Lock or unlock pan, zoom and drag.
    pub fn set_busy(&mut self, busy: bool) {
        self.interactive = !busy;
    }

    fn set_view(&mut self, center: Coordinate, zoom: u8) -> ViewChange {
        self.center = center;
        self.zoom = zoom;
        ViewChange::Recentered { center, zoom }
    }

    fn ensure_interactive(&self) -> Result<(), SyncError> {
        if self.interactive {
            Ok(())
        } else {
            Err(SyncError::Locked)
        }
    }
}
