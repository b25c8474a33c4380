use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use widget_core::{
    CityAlias, Config, Coordinates, FixedPosition, IpGeolocation, LocationSource, Widget,
    WidgetError, provider::provider_from_config, search::SearchController,
};

use crate::{prompt, terminal::TerminalSurface};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-widget", version, about = "City weather widget for the terminal")]
pub struct Cli {
    /// Print debug logs to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Explicit coordinates; without them, location comes from IP lookup.
#[derive(Debug, Clone, Copy, Args)]
pub struct PositionArgs {
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,
}

impl PositionArgs {
    fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key and language.
    Configure,

    /// Show current weather for a city (Korean or English name).
    Show {
        city: String,

        /// Print the reading as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List known cities matching a query.
    Search {
        query: String,

        /// Fetch weather for the N-th candidate (starting at 1).
        #[arg(long)]
        pick: Option<usize>,
    },

    /// Show weather for the current location.
    Locate {
        #[command(flatten)]
        position: PositionArgs,

        #[arg(long)]
        json: bool,
    },

    /// Prompt for cities until quit.
    Interactive {
        #[command(flatten)]
        position: PositionArgs,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, json } => {
                let widget = build_widget(None, TerminalSurface::one_shot())?;
                let result = widget.submit(&city).await;
                finish(&widget, result, json)
            }
            Command::Search { query, pick: None } => {
                let config = Config::load()?;
                let mut search = SearchController::new(Arc::new(config.directory()?));
                print_candidates(search.on_query_changed(&query));
                Ok(())
            }
            Command::Search { query, pick: Some(n) } => {
                let widget = build_widget(None, TerminalSurface::one_shot())?;
                widget.type_query(&query);

                let count = widget.surface().panel().results.as_ref().map_or(0, Vec::len);
                if n == 0 || n > count {
                    bail!("--pick must be between 1 and {count}");
                }

                let result = widget.select_candidate(n - 1).await;
                finish(&widget, result, false)
            }
            Command::Locate { position, json } => {
                let widget = build_widget(position.coordinates(), TerminalSurface::one_shot())?;
                let result = widget.toggle_location().await;
                finish(&widget, result, json)
            }
            Command::Interactive { position } => {
                let widget = build_widget(position.coordinates(), TerminalSurface::interactive())?;
                prompt::run(&widget).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load_file()?;

    let api_key = Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()?;
    let api_key = api_key.trim();
    if api_key.is_empty() {
        bail!("API key must not be empty");
    }
    config.set_api_key(api_key.to_string());

    let lang = Text::new("Language hint for descriptions:")
        .with_default(&config.lang)
        .prompt()?;
    config.lang = lang.trim().to_string();

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn build_widget(
    position: Option<Coordinates>,
    surface: TerminalSurface,
) -> anyhow::Result<Widget<TerminalSurface>> {
    let config = Config::load()?;
    let directory = Arc::new(config.directory()?);
    let provider = provider_from_config(&config, Arc::clone(&directory))?;

    let locator: Box<dyn LocationSource> = match position {
        Some(coords) => Box::new(FixedPosition(coords)),
        None => Box::new(
            IpGeolocation::new(config.geolocation_url.clone(), config.timeout())
                .context("Failed to build geolocation client")?,
        ),
    };

    Ok(Widget::new(directory, provider, locator, surface))
}

/// Print the outcome of a one-shot command. On failure the user-facing
/// message becomes the exit error, with the technical cause beneath it.
fn finish(
    widget: &Widget<TerminalSurface>,
    result: Result<(), WidgetError>,
    json: bool,
) -> anyhow::Result<()> {
    result.map_err(exit_error)?;

    if json {
        let reading = widget.reading().context("Lookup finished without a reading")?;
        println!("{}", serde_json::to_string_pretty(&reading)?);
    } else {
        widget.surface().draw();
    }
    Ok(())
}

fn exit_error(err: WidgetError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}

fn print_candidates(candidates: &[CityAlias]) {
    for (i, alias) in candidates.iter().enumerate() {
        println!("{:>2}. {}", i + 1, alias.label());
    }
}
