//! Menu-driven session mirroring the single-page app: one state object, a
//! pin that follows every coordinate change, and a summary/raw result view.

use anyhow::{Context, anyhow};
use geoweather_core::{
    Config, ConfiguredLocation, Coordinate, GeminiProvider, LocationSearch, NominatimClient,
    QueryState, SearchOutcome, Session, View, WeatherProvider, gemini_from_config,
    location::GEOLOCATION_TIMEOUT,
    report::{self, Tab},
    resolve_initial,
};
use inquire::{InquireError, Select, Text};
use std::fmt;

use crate::{cli::spawn_canceller, render};

/// Pin nudge step in degrees (roughly 1 km at the equator).
const NUDGE_DEGREES: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    GetWeather,
    Search,
    EnterCoordinates,
    NudgePin,
    SwitchTab,
    Terms,
    Privacy,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::GetWeather => "Get Weather",
            Action::Search => "Search for a location",
            Action::EnterCoordinates => "Enter coordinates",
            Action::NudgePin => "Drag the pin",
            Action::SwitchTab => "Switch result tab",
            Action::Terms => "Terms of Service",
            Action::Privacy => "Privacy Policy",
            Action::Quit => "Quit",
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    North,
    South,
    East,
    West,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let provider = gemini_from_config(&config).map_err(|e| anyhow!(e.user_message()))?;
    let search = NominatimClient::from_config(&config);
    let location = ConfiguredLocation::new(config.home_coordinate()?);

    let initial = resolve_initial(&location, GEOLOCATION_TIMEOUT).await;
    let mut session = Session::new(provider, search, initial);

    println!("{}", render::header());
    if let Some(status) = session.location_status() {
        println!("{status}");
    }
    session.clear_location_status();

    let ctrl_c = spawn_canceller(session.weather_slot(), session.search_slot());
    let outcome = menu_loop(&mut session, &location).await;
    ctrl_c.abort();
    outcome?;

    println!("\n{}", render::footer());
    Ok(())
}

async fn menu_loop(
    session: &mut Session<GeminiProvider, NominatimClient>,
    location: &ConfiguredLocation,
) -> anyhow::Result<()> {
    let mut tab = Tab::Summary;
    loop {
        println!("\n{}", render::selected(&session.coordinate()));

        let action = match Select::new("What next?", actions(session)).prompt() {
            Ok(action) => action,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read menu choice"),
        };

        match action {
            Action::GetWeather => {
                println!("{}", render::query_state(&QueryState::Loading, tab));
                session.fetch_weather().await;
                println!("{}", render::query_state(session.query(), tab));
            }
            Action::Search => search_location(session).await?,
            Action::EnterCoordinates => enter_coordinates(session)?,
            Action::NudgePin => nudge_pin(session)?,
            Action::SwitchTab => {
                tab = tab.toggled();
                println!("{}", render::query_state(session.query(), tab));
            }
            Action::Terms => show_page(session, location, View::Terms).await?,
            Action::Privacy => show_page(session, location, View::Privacy).await?,
            Action::Quit => break,
        }
    }
    Ok(())
}

fn actions<P: WeatherProvider, S: LocationSearch>(session: &Session<P, S>) -> Vec<Action> {
    let mut actions = vec![
        Action::GetWeather,
        Action::Search,
        Action::EnterCoordinates,
        Action::NudgePin,
    ];
    if session.query().result().is_some() {
        actions.push(Action::SwitchTab);
    }
    actions.extend([Action::Terms, Action::Privacy, Action::Quit]);
    actions
}

async fn search_location<P: WeatherProvider, S: LocationSearch>(
    session: &mut Session<P, S>,
) -> anyhow::Result<()> {
    let query = Text::new("Search city, address, or landmark:")
        .prompt()
        .context("Failed to read search query")?;

    match session.search(&query).await {
        Ok(SearchOutcome::Moved { found, change }) => {
            println!("Found: {}", found.display_name);
            if let Some(line) = render::view_change(&change) {
                println!("{line}");
            }
        }
        Ok(SearchOutcome::NoResults) | Err(_) => {
            if let Some(message) = session.search_error() {
                println!("{message}");
            }
        }
    }
    Ok(())
}

fn enter_coordinates<P: WeatherProvider, S: LocationSearch>(
    session: &mut Session<P, S>,
) -> anyhow::Result<()> {
    let current = session.coordinate();
    let latitude = Text::new("Latitude:")
        .with_default(&current.latitude_str())
        .prompt()
        .context("Failed to read latitude")?;
    let longitude = Text::new("Longitude:")
        .with_default(&current.longitude_str())
        .prompt()
        .context("Failed to read longitude")?;

    match session.enter_coordinates(&latitude, &longitude) {
        Ok(change) => {
            if let Some(line) = render::view_change(&change) {
                println!("{line}");
            }
        }
        Err(e) => println!("{}", render::error(&e.user_message())),
    }
    Ok(())
}

fn nudge_pin<P: WeatherProvider, S: LocationSearch>(
    session: &mut Session<P, S>,
) -> anyhow::Result<()> {
    let direction = Select::new(
        "Drag the pin which way?",
        vec![Direction::North, Direction::South, Direction::East, Direction::West],
    )
    .prompt()
    .context("Failed to read direction")?;

    let from = session.map().marker();
    let (lat, lon) = match direction {
        Direction::North => (from.latitude() + NUDGE_DEGREES, from.longitude()),
        Direction::South => (from.latitude() - NUDGE_DEGREES, from.longitude()),
        Direction::East => (from.latitude(), from.longitude() + NUDGE_DEGREES),
        Direction::West => (from.latitude(), from.longitude() - NUDGE_DEGREES),
    };

    let to = match Coordinate::new(lat, lon) {
        Ok(to) => to,
        Err(e) => {
            println!("{}", e.user_message());
            return Ok(());
        }
    };

    match session.drag_marker(to) {
        Ok(change) => {
            if let Some(line) = render::view_change(&change) {
                println!("{line}");
            }
        }
        Err(e) => println!("Map is busy: {e}"),
    }
    Ok(())
}

async fn show_page<P: WeatherProvider, S: LocationSearch>(
    session: &mut Session<P, S>,
    location: &ConfiguredLocation,
    view: View,
) -> anyhow::Result<()> {
    session.navigate(view);
    let text = match view {
        View::Terms => report::TERMS_OF_SERVICE,
        View::Privacy => report::PRIVACY_POLICY,
        View::Main => return Ok(()),
    };
    println!("\n{text}");

    Select::new("", vec!["Back to App"])
        .prompt()
        .context("Failed to read choice")?;

    // Coming back to the main view looks the location up again.
    session.navigate(View::Main);
    let change = session.apply_location(resolve_initial(location, GEOLOCATION_TIMEOUT).await);
    if let Some(status) = session.location_status() {
        println!("{status}");
    }
    if let Some(line) = render::view_change(&change) {
        println!("{line}");
    }
    session.clear_location_status();
    Ok(())
}
