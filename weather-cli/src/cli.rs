use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::error::InquireResult;
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};
use tracing::debug;
use weather_dash_core::{
    Config, CurrentQuery, Dashboard, HistoricalQuery, MarineQuery, Query, RequestState, Tab,
    View, WeatherClient, WeatherUnit, dashboard::TITLE,
};

use crate::logging::LogFormat;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dash", version, about = "Current, historical and marine weather")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the provider access key.
    Configure,

    /// Show present conditions for a location.
    Current {
        /// City name or other free-text location.
        location: String,
    },

    /// Show one past day for a location.
    Historical {
        /// City name or other free-text location.
        location: String,

        /// Calendar date, YYYY-MM-DD, not later than today.
        #[arg(long)]
        date: String,
    },

    /// Show the marine forecast with tides for a coordinate.
    Marine {
        #[arg(long, allow_hyphen_values = true)]
        lat: String,

        #[arg(long, allow_hyphen_values = true)]
        lon: String,
    },

    /// Interactive dashboard with tabs for all three views.
    Dashboard,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let query: Query = match self.command {
            Command::Configure => return configure(),
            Command::Dashboard => return run_dashboard().await,
            Command::Current { location } => CurrentQuery { location }.into(),
            Command::Historical { location, date } => HistoricalQuery { location, date }.into(),
            Command::Marine { lat, lon } => MarineQuery { latitude: lat, longitude: lon }.into(),
        };

        let config = Config::load()?;
        let client = Arc::new(build_client(&config)?);
        let unit = WeatherUnit::new(query.kind(), client);

        let state = unit.submit(query).await;
        print!("{}", unit.view());

        if let RequestState::Failure(_) = state {
            bail!("{} request failed", unit.kind().label());
        }
        Ok(())
    }
}

fn build_client(config: &Config) -> anyhow::Result<WeatherClient> {
    let credential = config.credential()?;
    debug!(base_url = config.base_url(), "using provider");
    Ok(WeatherClient::http(credential, config.base_url()))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = Password::new("weatherstack access key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read access key")?;

    let key = key.trim().to_string();
    if key.is_empty() {
        bail!("Access key must not be empty");
    }

    config.set_access_key(key);
    let path = config.save()?;
    println!("Saved access key to {}", path.display());

    Ok(())
}

const QUIT: &str = "Quit";

async fn run_dashboard() -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = Arc::new(build_client(&config)?);
    let mut dashboard = Dashboard::new(client, config.default_tab()?);

    println!("{TITLE}");

    loop {
        let mut options: Vec<String> = Tab::all().iter().map(Tab::to_string).collect();
        options.push(QUIT.to_string());
        let start = dashboard.selected() as usize;

        // Esc at the tab prompt leaves the dashboard.
        let selection = Select::new("Tab:", options).with_starting_cursor(start).prompt();
        let Some(choice) = unless_canceled(selection).context("Failed to read tab selection")?
        else {
            return Ok(());
        };

        let Some(tab) = Tab::all().iter().copied().find(|t| t.label() == choice) else {
            return Ok(());
        };
        dashboard.select(tab);

        let unit = dashboard.active_unit();
        print!("{}", unit.view());

        // Esc at an input prompt goes back to tab selection.
        let Some(query) = unless_canceled(prompt_query(tab)).context("Failed to read input")?
        else {
            println!();
            continue;
        };
        println!("Loading...");
        unit.submit(query).await;

        match unit.view() {
            View::Empty => println!("No data returned."),
            view => print!("{view}"),
        }
        println!();
    }
}

/// `Ok(None)` when the user pressed Esc.
fn unless_canceled<T>(result: InquireResult<T>) -> InquireResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(err) => Err(err),
    }
}

fn prompt_query(tab: Tab) -> InquireResult<Query> {
    let query = match tab {
        Tab::Current => {
            CurrentQuery { location: prompt_text("Location:", "Enter city name...")? }.into()
        }
        Tab::Historical => {
            let location = prompt_text("Location:", "Enter city name...")?;
            let date = Text::new("Date (YYYY-MM-DD):")
                .with_default(&Local::now().date_naive().format("%Y-%m-%d").to_string())
                .prompt()?;
            HistoricalQuery { location, date }.into()
        }
        Tab::Marine => MarineQuery {
            latitude: prompt_text("Latitude:", "e.g., 45.00")?,
            longitude: prompt_text("Longitude:", "e.g., -2.00")?,
        }
        .into(),
    };
    Ok(query)
}

fn prompt_text(message: &str, placeholder: &str) -> InquireResult<String> {
    Text::new(message).with_placeholder(placeholder).prompt()
}
