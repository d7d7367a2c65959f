use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{
    Confirm, CustomType, CustomUserError, InquireError, Select, Text, validator::Validation,
};
use weather_today_core::{
    Config, Coordinates, GeoIpLocator, GetWeatherUseCase, LocationMode, LocationProvider,
    OpenWeatherClient, RefreshOutcome, StaticLocation, TcpProbe, Units, WeatherController,
    WeatherRepository,
};

use crate::render::{self, Screen};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-today", version, about = "Current weather for where you are")]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current weather for your location (the default).
    Show(ShowArgs),

    /// Configure API key, units and how your location is found.
    Configure,

    /// Print where the config file lives.
    ConfigPath,
}

#[derive(Debug, Default, clap::Args)]
pub struct ShowArgs {
    /// Latitude to use instead of the configured location.
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude to use instead of the configured location.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// "metric", "imperial" or "standard"; overrides the config file.
    #[arg(long)]
    pub units: Option<String>,

    /// Render once and exit instead of offering a refresh.
    #[arg(long)]
    pub once: bool,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Show(ShowArgs::default())) {
            Command::Show(args) => show(args).await,
            Command::Configure => configure(),
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

async fn show(args: ShowArgs) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let units = match args.units.as_deref() {
        Some(u) => Units::try_from(u)?,
        None => config.units,
    };

    let client = Arc::new(OpenWeatherClient::with_base_url(config.base_url()));
    let repository = WeatherRepository::new(client, config.api_key(), units);
    let use_case = Arc::new(GetWeatherUseCase::new(repository));
    let network = Arc::new(TcpProbe::for_url(config.base_url())?);

    let flag_coordinates = args.lat.zip(args.lon).map(|(lat, lon)| Coordinates::new(lat, lon));
    let (location, geoip) = location_provider(&config, flag_coordinates)?;

    let controller = WeatherController::new(use_case, location, network);
    tracing::debug!(%units, base_url = config.base_url(), "Weather screen ready");

    loop {
        println!("{}", render::render(&Screen::Weather(&controller.current_state()), units));

        let outcome = controller.refresh().await;
        let step = next_step(outcome, geoip.as_deref(), ask_location_consent)?;

        let state = controller.current_state();
        let screen = match step {
            Step::RetryWithConsent => {
                config.use_geoip_location(true);
                config.save()?;
                tracing::info!("Location consent granted and saved");
                continue;
            }
            Step::Show(View::NoNetwork) => Screen::NoNetwork,
            Step::Show(View::PermissionRequired) => Screen::PermissionRequired,
            Step::Show(View::Weather) => Screen::Weather(&state),
        };

        println!("{}", render::render(&screen, units));

        if args.once || !ask_refresh()? {
            break;
        }

        controller.set_loading();
    }

    Ok(())
}

/// Which screen follows a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    NoNetwork,
    PermissionRequired,
    Weather,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Show(View),
    /// Consent was just granted; run the sequence again.
    RetryWithConsent,
}

/// Decides what follows a refresh. `ask` is only called when location access
/// is missing and can be granted here; on acceptance the locator is unlocked.
fn next_step(
    outcome: RefreshOutcome,
    locator: Option<&GeoIpLocator>,
    ask: impl FnOnce() -> anyhow::Result<bool>,
) -> anyhow::Result<Step> {
    let step = match outcome {
        RefreshOutcome::NoNetwork => Step::Show(View::NoNetwork),
        RefreshOutcome::Completed => Step::Show(View::Weather),
        RefreshOutcome::PermissionRequired => match locator {
            Some(locator) if ask()? => {
                locator.grant_permission();
                Step::RetryWithConsent
            }
            _ => Step::Show(View::PermissionRequired),
        },
    };

    Ok(step)
}

/// Picks the location source; the locator is also returned when consent can be granted.
fn location_provider(
    config: &Config,
    flag_coordinates: Option<Coordinates>,
) -> anyhow::Result<(Arc<dyn LocationProvider>, Option<Arc<GeoIpLocator>>)> {
    if let Some(coordinates) = flag_coordinates {
        let provider: Arc<dyn LocationProvider> = Arc::new(StaticLocation::new(coordinates));
        return Ok((provider, None));
    }

    match config.location.mode {
        LocationMode::Fixed => {
            let coordinates = config.location.fixed_coordinates().ok_or_else(|| {
                anyhow!(
                    "Fixed location mode needs latitude and longitude.\n\
                     Hint: run `weather-today configure` or pass --lat/--lon."
                )
            })?;
            let provider: Arc<dyn LocationProvider> = Arc::new(StaticLocation::new(coordinates));
            Ok((provider, None))
        }
        LocationMode::GeoIp => {
            let locator = Arc::new(GeoIpLocator::new(config.location.consent));
            let provider: Arc<dyn LocationProvider> = locator.clone();
            Ok((provider, Some(locator)))
        }
    }
}

fn ask_location_consent() -> anyhow::Result<bool> {
    let answer = Confirm::new(
        "Allow weather-today to look up your approximate location from your IP address?",
    )
    .with_default(true)
    .prompt();

    declined_on_cancel(answer)
}

fn ask_refresh() -> anyhow::Result<bool> {
    let answer = Select::new("", vec!["Refresh", "Quit"]).prompt();

    match answer {
        Ok(choice) => Ok(choice == "Refresh"),
        Err(e) => declined_on_cancel(Err(e)),
    }
}

/// Treat Esc, Ctrl-C and a missing terminal as "no".
fn declined_on_cancel(answer: Result<bool, InquireError>) -> anyhow::Result<bool> {
    match answer {
        Ok(value) => Ok(value),
        Err(
            InquireError::OperationCanceled
            | InquireError::OperationInterrupted
            | InquireError::NotTTY,
        ) => Ok(false),
        Err(e) => Err(e).context("Prompt failed"),
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let current_key = config.api_key.clone().unwrap_or_default();
    let api_key = Text::new("OpenWeatherMap API key:")
        .with_initial_value(&current_key)
        .with_help_message("Leave empty to use the key built into this binary")
        .prompt()?;
    config.set_api_key(api_key);

    let units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(Units::all().iter().position(|u| *u == config.units).unwrap_or(0))
        .prompt()?;
    config.units = units;

    let modes = vec!["Approximate location from my IP address", "Fixed coordinates"];
    let mode = Select::new("How should your location be found?", modes).prompt()?;

    if mode.starts_with("Fixed") {
        let latitude = prompt_degrees("Latitude", 90.0)?;
        let longitude = prompt_degrees("Longitude", 180.0)?;
        config.use_fixed_location(Coordinates::new(latitude, longitude));
    } else {
        let consent = Confirm::new("Allow IP-based location lookups from now on?")
            .with_default(true)
            .prompt()?;
        config.use_geoip_location(consent);
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

fn prompt_degrees(label: &str, limit: f64) -> anyhow::Result<f64> {
    let prompt = format!("{label}:");
    let message = format!("{label} must be within ±{limit}");

    let value = CustomType::<f64>::new(&prompt)
        .with_validator(move |v: &f64| -> Result<Validation, CustomUserError> {
            if v.abs() <= limit {
                Ok(Validation::Valid)
            } else {
                Ok(Validation::Invalid(message.clone().into()))
            }
        })
        .prompt()?;

    Ok(value)
}
