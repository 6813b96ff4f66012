use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use geoweather_core::{
    Config, ConfiguredLocation, Coordinate, GeminiProvider, InitialLocation, LocationSearch,
    NominatimClient, QueryState, RequestSlot, SearchOutcome, Session, gemini_from_config,
    location::GEOLOCATION_TIMEOUT,
    report::{self, Tab},
    resolve_initial,
};
use inquire::{Confirm, CustomType, Password, PasswordDisplayMode, Text};
use tokio::task::JoinHandle;

use crate::{interactive, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "geoweather", version, about = "Real-time weather for any coordinate, via Gemini")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the Gemini API key, model and home location.
    Configure,

    /// Show weather for a coordinate, a searched place, or the home location.
    Show {
        /// Latitude in decimal degrees.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<String>,

        /// Longitude in decimal degrees.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<String>,

        /// Place to search for instead of giving coordinates.
        #[arg(long, conflicts_with = "lat")]
        search: Option<String>,

        /// Which view of the result to print.
        #[arg(long, value_enum, default_value_t = TabArg::Summary)]
        tab: TabArg,

        /// Print the full result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Look up a place and list the best matches.
    Search {
        /// City, address, or landmark.
        query: String,
    },

    /// Interactive session: search, move the pin, fetch weather.
    Interactive,

    /// Print the terms of service.
    Terms,

    /// Print the privacy policy.
    Privacy,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TabArg {
    Summary,
    Raw,
}

impl From<TabArg> for Tab {
    fn from(value: TabArg) -> Self {
        match value {
            TabArg::Summary => Tab::Summary,
            TabArg::Raw => Tab::Raw,
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                lat,
                lon,
                search,
                tab,
                json,
            } => show(lat.zip(lon), search, tab.into(), json).await,
            Command::Search { query } => search(&query).await,
            Command::Interactive => interactive::run(Config::load()?).await,
            Command::Terms => {
                println!("{}", report::TERMS_OF_SERVICE);
                Ok(())
            }
            Command::Privacy => {
                println!("{}", report::PRIVACY_POLICY);
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("Gemini API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    let model = Text::new("Gemini model:")
        .with_default(config.model())
        .prompt()
        .context("Failed to read model name")?;
    config.gemini.model = Some(model);

    let use_home = Confirm::new("Set a home location (used instead of device location)?")
        .with_default(config.home.is_some())
        .prompt()
        .context("Failed to read answer")?;

    if use_home {
        let latitude = CustomType::<f64>::new("Home latitude:")
            .with_error_message("Please enter a number between -90 and 90")
            .prompt()
            .context("Failed to read latitude")?;
        let longitude = CustomType::<f64>::new("Home longitude:")
            .with_error_message("Please enter a number between -180 and 180")
            .prompt()
            .context("Failed to read longitude")?;
        let home = Coordinate::new(latitude, longitude).map_err(|e| anyhow!(e.user_message()))?;
        config.set_home(Some(home));
    } else {
        config.set_home(None);
    }

    let user_agent = Text::new("User agent for location search:")
        .with_default(config.user_agent())
        .prompt()
        .context("Failed to read user agent")?;
    config.geocoder.user_agent = Some(user_agent);

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

async fn show(
    coordinates: Option<(String, String)>,
    query: Option<String>,
    tab: Tab,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = gemini_from_config(&config).map_err(|e| anyhow!(e.user_message()))?;
    let search = NominatimClient::from_config(&config);

    let initial = match coordinates {
        Some((lat, lon)) => InitialLocation {
            coordinate: Coordinate::parse(&lat, &lon).map_err(|e| anyhow!(e.user_message()))?,
            status: "Using coordinates from the command line.".to_string(),
            found: true,
        },
        None => {
            let source = ConfiguredLocation::new(config.home_coordinate()?);
            resolve_initial(&source, GEOLOCATION_TIMEOUT).await
        }
    };

    let mut session = Session::new(provider, search, initial);
    let ctrl_c = spawn_canceller(session.weather_slot(), session.search_slot());
    let outcome = fetch_and_print(&mut session, query, tab, json).await;
    ctrl_c.abort();
    outcome
}

async fn fetch_and_print(
    session: &mut Session<GeminiProvider, NominatimClient>,
    query: Option<String>,
    tab: Tab,
    json: bool,
) -> anyhow::Result<()> {
    if query.is_none() {
        if let Some(status) = session.location_status() {
            eprintln!("{status}");
        }
    }

    if let Some(query) = query {
        match session.search(&query).await {
            Ok(SearchOutcome::Moved { found, .. }) => eprintln!("Found: {}", found.display_name),
            Ok(SearchOutcome::NoResults) => {
                bail!("{}", session.search_error().unwrap_or("No results found."))
            }
            Err(e) => bail!("{}", e.user_message()),
        }
    }

    eprintln!("{}", render::selected(&session.coordinate()));
    eprintln!("Fetching Weather...");

    match session.fetch_weather().await {
        QueryState::Ready(result) if json => {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
        QueryState::Ready(result) => print!("{}", render::weather(result, tab)),
        QueryState::Failed(message) => bail!("{message}"),
        QueryState::Idle | QueryState::Loading => bail!("Weather query did not complete"),
    }
    Ok(())
}

/// Route every Ctrl-C to whatever request is in flight.
///
/// A SIGINT listener replaces the default handler for the rest of the
/// process, so a single listener serves both slots.
pub(crate) fn spawn_canceller(weather: RequestSlot, search: RequestSlot) -> JoinHandle<()> {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            let cancelled = cancel_in_flight(&[&weather, &search]);
            tracing::debug!(cancelled, "interrupt received");
        }
    })
}

fn cancel_in_flight(slots: &[&RequestSlot]) -> bool {
    slots.iter().fold(false, |any, slot| slot.cancel() | any)
}

async fn search(query: &str) -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = NominatimClient::from_config(&config);

    let matches = client.search(query).await.map_err(|e| anyhow!(e.user_message()))?;
    print!("{}", render::matches(query.trim(), &matches));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_cancels_search_as_well_as_weather() {
        let weather = RequestSlot::new();
        let search = RequestSlot::new();

        let pending = search.try_acquire().unwrap();
        assert!(cancel_in_flight(&[&weather, &search]));
        assert!(pending.token().is_cancelled());

        let pending = weather.try_acquire().unwrap();
        assert!(cancel_in_flight(&[&weather, &search]));
        assert!(pending.token().is_cancelled());
    }

    #[test]
    fn interrupt_with_nothing_in_flight_is_a_no_op() {
        assert!(!cancel_in_flight(&[&RequestSlot::new(), &RequestSlot::new()]));
    }
}
