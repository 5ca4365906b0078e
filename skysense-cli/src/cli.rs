use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use skysense_core::{AppState, Config, Location, MapView, ResultsView, Session};
use std::{fmt, str::FromStr};
use tracing::debug;

use crate::prompt;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "skysense",
    version,
    about = "Check the weather outlook for an activity at a place and date"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Explicit coordinates; both or neither.
#[derive(Debug, Args)]
pub struct PlaceArgs {
    /// Latitude in decimal degrees.
    #[arg(long, allow_negative_numbers = true, requires = "lon")]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees.
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    pub lon: Option<f64>,
}

impl PlaceArgs {
    fn location(&self) -> anyhow::Result<Option<Location>> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => {
                Ok(Some(Location::new(lat, lon).context("Invalid coordinates")?))
            }
            _ => Ok(None),
        }
    }
}

/// A viewport pixel written as `x,y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
}

impl FromStr for Pixel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s.split_once(',').ok_or_else(|| format!("expected `x,y`, got '{s}'"))?;
        let parse = |v: &str| v.trim().parse::<f64>().map_err(|e| format!("bad pixel value '{v}': {e}"));

        Ok(Self { x: parse(x)?, y: parse(y)? })
    }
}

impl fmt::Display for Pixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Edit endpoint, defaults and map settings interactively.
    Configure,

    /// Run one analysis and print the result.
    Analyze {
        #[command(flatten)]
        place: PlaceArgs,

        /// Event date, YYYY-MM-DD.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Free-text description of the activity.
        #[arg(long)]
        activity: Option<String>,

        /// Use the current location instead of coordinates. If the lookup
        /// fails, the error is printed and no analysis is run.
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        locate: bool,
    },

    /// Print the current location as reported by geolocation.
    Locate,

    /// Describe the map around a location, optionally clicking a pixel on it.
    Map {
        #[command(flatten)]
        place: PlaceArgs,

        /// Viewport width in pixels.
        #[arg(long)]
        width: Option<u32>,

        /// Viewport height in pixels.
        #[arg(long)]
        height: Option<u32>,

        /// Click at viewport pixel `x,y` and move the location there.
        #[arg(long)]
        click: Option<Pixel>,
    },

    /// Fill in the form step by step.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => prompt::configure(),
            Command::Analyze { place, date, activity, locate } => {
                let config = load_config()?;
                let session = Session::from_config(&config)?;

                if let Some(location) = place.location()? {
                    session.click_map(location);
                }
                if let Some(date) = date {
                    session.set_date(date);
                }
                if let Some(activity) = activity {
                    session.set_activity(activity);
                }

                println!("{}", analyze_form(&session, locate).await?);
                Ok(())
            }
            Command::Locate => {
                let config = load_config()?;
                let session = Session::from_config(&config)?;

                let location = session.locate().await?;
                println!("{location}");
                Ok(())
            }
            Command::Map { place, width, height, click } => {
                let mut config = load_config()?;
                if let Some(width) = width {
                    config.map.width = width;
                }
                if let Some(height) = height {
                    config.map.height = height;
                }

                let session = Session::from_config(&config)?;
                if let Some(location) = place.location()? {
                    session.click_map(location);
                }

                let mut map = MapView::from_config(session.snapshot().location, &config.map);
                if let Some(pixel) = click {
                    let clicked = map
                        .location_at(pixel.x, pixel.y)
                        .with_context(|| format!("Click at {pixel} is off the map"))?;
                    session.click_map(clicked);
                    map.recenter(session.snapshot().location);
                    println!("Clicked: {clicked}");
                }

                println!("{}", describe_map(&map));
                Ok(())
            }
            Command::Interactive => {
                let config = load_config()?;
                let session = Session::from_config(&config)?;
                prompt::interactive(&session, &config).await
            }
        }
    }
}

fn load_config() -> anyhow::Result<Config> {
    let path = Config::config_file_path()?;
    debug!(path = %path.display(), "loading configuration");
    Config::load_from(&path)
}

/// Optionally look up the current location, then analyze and render the form.
///
/// A failed lookup is shown on the error line and the analysis is skipped.
pub(crate) async fn analyze_form(session: &Session, locate: bool) -> anyhow::Result<String> {
    let located = if locate {
        match session.locate().await {
            Ok(location) => {
                debug!(%location, "using current location");
                true
            }
            Err(e) => {
                debug!(error = %e, "location lookup failed; skipping analysis");
                false
            }
        }
    } else {
        true
    };

    if located {
        session.analyze().await?;
    }

    let state = session.snapshot();
    Ok(format!("{}\n{}", describe_form(&state), ResultsView::render(&state)))
}

pub fn describe_form(state: &AppState) -> String {
    format!(
        "Location: {}\nDate: {}\nActivity: {}",
        state.location, state.form.date, state.form.activity
    )
}

pub fn describe_map(map: &MapView) -> String {
    let (width, height) = map.size();
    let mut out = format!(
        "Center: {}\nMarker: {}\nZoom: {}\nViewport: {width}x{height}\nAttribution: {}\nTiles:",
        map.center(),
        map.marker(),
        map.zoom(),
        map.attribution()
    );
    for url in map.visible_tile_urls() {
        out.push_str("\n  ");
        out.push_str(&url);
    }
    out
}
