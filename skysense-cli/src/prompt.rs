//! Interactive prompts: the configuration editor and the form loop.

use anyhow::Context;
use chrono::NaiveDate;
use inquire::{Confirm, CustomType, Select, Text};
use skysense_core::{Config, Location, MapView, ResultsView, Session};
use std::fmt;
use tracing::debug;

use crate::cli::{Pixel, describe_form};

pub fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    config.endpoint = Text::new("Analysis endpoint:")
        .with_default(&config.endpoint)
        .prompt()
        .context("Failed to read endpoint")?;

    let timeout = CustomType::<u64>::new("Request timeout in seconds (0 = none):")
        .with_default(config.request_timeout_secs.unwrap_or(0))
        .with_error_message("Please type a whole number of seconds")
        .prompt()
        .context("Failed to read timeout")?;
    config.request_timeout_secs = (timeout > 0).then_some(timeout);

    let location = prompt_location(config.initial_location()?)?;
    config.defaults.lat = location.lat();
    config.defaults.lng = location.lng();

    config.defaults.date = prompt_date(config.defaults.date)?;
    config.defaults.activity = Text::new("Default activity:")
        .with_default(&config.defaults.activity)
        .prompt()
        .context("Failed to read activity")?;

    config.geolocation.enabled = Confirm::new("Allow looking up the current location?")
        .with_default(config.geolocation.enabled)
        .prompt()
        .context("Failed to read geolocation choice")?;

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    ClickMap,
    EnterCoordinates,
    UseCurrentLocation,
    EditDate,
    EditActivity,
    Analyze,
    Quit,
}

impl Action {
    const ALL: [Action; 7] = [
        Action::ClickMap,
        Action::EnterCoordinates,
        Action::UseCurrentLocation,
        Action::EditDate,
        Action::EditActivity,
        Action::Analyze,
        Action::Quit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::ClickMap => "Click on the map",
            Action::EnterCoordinates => "Enter coordinates",
            Action::UseCurrentLocation => "Use my current location",
            Action::EditDate => "Change date",
            Action::EditActivity => "Describe activity",
            Action::Analyze => "Analyze",
            Action::Quit => "Quit",
        };
        f.write_str(label)
    }
}

pub async fn interactive(session: &Session, config: &Config) -> anyhow::Result<()> {
    loop {
        let state = session.snapshot();
        let map = MapView::from_config(state.location, &config.map);
        let (width, height) = map.size();

        println!();
        println!("{}", describe_form(&state));
        println!("Map tile: {}", map.center_tile_url());
        println!("{}", ResultsView::render(&state));

        let action = Select::new("What next?", Action::ALL.to_vec())
            .prompt()
            .context("Failed to read action")?;

        match action {
            Action::ClickMap => {
                let pixel = CustomType::<Pixel>::new(&format!(
                    "Click at pixel x,y (viewport {width}x{height}, marker at centre):"
                ))
                .with_error_message("Please type two numbers separated by a comma")
                .prompt()
                .context("Failed to read click")?;

                match map.location_at(pixel.x, pixel.y) {
                    Ok(location) => session.click_map(location),
                    Err(e) => println!("That click is off the map: {e}"),
                }
            }
            Action::EnterCoordinates => session.click_map(prompt_location(state.location)?),
            Action::UseCurrentLocation => {
                // Failures are also on the error line shown on the next pass.
                if let Err(e) = session.locate().await {
                    debug!(error = %e, "location lookup failed");
                }
            }
            Action::EditDate => session.set_date(prompt_date(state.form.date)?),
            Action::EditActivity => {
                let activity = Text::new("Describe your activity:")
                    .with_default(&state.form.activity)
                    .prompt()
                    .context("Failed to read activity")?;
                session.set_activity(activity);
            }
            Action::Analyze => {
                println!("Analyzing...");
                session.analyze().await?;
            }
            Action::Quit => return Ok(()),
        }
    }
}

fn prompt_location(current: Location) -> anyhow::Result<Location> {
    loop {
        let lat = CustomType::<f64>::new("Latitude:")
            .with_default(current.lat())
            .prompt()
            .context("Failed to read latitude")?;
        let lng = CustomType::<f64>::new("Longitude:")
            .with_default(current.lng())
            .prompt()
            .context("Failed to read longitude")?;

        match Location::new(lat, lng) {
            Ok(location) => return Ok(location),
            Err(e) => println!("{e}; try again."),
        }
    }
}

fn prompt_date(current: NaiveDate) -> anyhow::Result<NaiveDate> {
    CustomType::<NaiveDate>::new("Date (YYYY-MM-DD):")
        .with_default(current)
        .with_error_message("Please type a date like 2025-10-11")
        .prompt()
        .context("Failed to read date")
}
