//! Text rendering of session state for the terminal.

use chrono::{Datelike, Utc};
use geoweather_core::{
    Coordinate, GeocodingMatch, QueryState, ViewChange, WeatherQueryResult,
    report::{self, NO_SOURCES_NOTE, SummaryView, Tab},
};
use std::fmt::Write;

pub fn header() -> String {
    "GeoWeather Realtime\n\
     Search, move the pin, or use your home location for real-time weather updates.\n"
        .to_string()
}

pub fn footer() -> String {
    format!(
        "Powered by Google Gemini API & OpenStreetMap. \
         Weather data is subject to API availability and accuracy.\n\
         © {} GeoWeather Realtime",
        Utc::now().year()
    )
}

pub fn selected(coordinate: &Coordinate) -> String {
    format!("Selected Coordinates: {}", coordinate.short_display())
}

pub fn view_change(change: &ViewChange) -> Option<String> {
    match change {
        ViewChange::None => None,
        ViewChange::MarkerMoved { marker } => Some(format!("Pin moved to {marker}")),
        ViewChange::Recentered { center, zoom } => {
            Some(format!("Map centered on {center} (zoom {zoom})"))
        }
    }
}

pub fn query_state(state: &QueryState, tab: Tab) -> String {
    match state {
        QueryState::Idle => String::new(),
        QueryState::Loading => "Fetching Weather...".to_string(),
        QueryState::Failed(message) => error(message),
        QueryState::Ready(result) => weather(result, tab),
    }
}

pub fn error(message: &str) -> String {
    format!("Oops! An Error Occurred\n  {message}")
}

pub fn weather(result: &WeatherQueryResult, tab: Tab) -> String {
    let mut out = String::new();
    let tabs = [Tab::Summary, Tab::Raw]
        .iter()
        .map(|t| {
            if *t == tab {
                format!("[{}]", t.label())
            } else {
                format!(" {} ", t.label())
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(out, "{tabs}");
    let _ = writeln!(out, "{}", "-".repeat(40));

    match tab {
        Tab::Summary => summary(&mut out, result),
        Tab::Raw => {
            let _ = writeln!(out, "Raw JSON Data");
            let _ = writeln!(out, "{}", report::raw_text(result));
        }
    }
    out
}

fn summary(out: &mut String, result: &WeatherQueryResult) {
    let view = SummaryView::from_result(result);

    let _ = writeln!(out, "Weather Report");
    if view.rows.is_empty() {
        let _ = writeln!(out, "  Weather details are not available.");
    }
    for (label, value) in &view.rows {
        let _ = writeln!(out, "  {label:<12} {value}");
    }

    if !view.has_sources() {
        let _ = writeln!(out, "\n{NO_SOURCES_NOTE}");
        return;
    }

    let _ = writeln!(out, "\nData Sources");
    if !view.ai_sources.is_empty() {
        let _ = writeln!(out, "  Cited by AI:");
        for s in &view.ai_sources {
            let marker = if s.is_link { "->" } else { "-" };
            let _ = writeln!(out, "    {marker} {}", s.text);
        }
    }
    if !view.web_references.is_empty() {
        let _ = writeln!(out, "  Web References Consulted:");
        for r in &view.web_references {
            if r.label == r.uri {
                let _ = writeln!(out, "    - {}", r.uri);
            } else {
                let _ = writeln!(out, "    - {} <{}>", r.label, r.uri);
            }
        }
    }
}

pub fn matches(query: &str, found: &[GeocodingMatch]) -> String {
    if found.is_empty() {
        return format!("No results found for \"{query}\". Please try a different location.\n");
    }
    let mut out = String::new();
    for (i, m) in found.iter().enumerate() {
        let used = if i == 0 { "*" } else { " " };
        let _ = writeln!(out, "{used} {}  ({}, {})", m.display_name, m.latitude, m.longitude);
    }
    out
}
