//! Core library for the `skysense` CLI.
//!
//! This crate defines:
//! - The form state (location, date, activity) and the analysis outcome
//! - The client for the remote analysis endpoint
//! - Geolocation lookups
//! - Map and results view models
//! - Configuration handling
//!
//! It is used by `skysense-cli`, but can also be reused by other front ends.

pub mod backend;
pub mod config;
pub mod geolocation;
pub mod map;
pub mod model;
pub mod session;
pub mod state;
pub mod view;

#[cfg(test)]
mod test_support;

pub use backend::{AnalysisBackend, AnalysisError, HttpAnalysisBackend};
pub use config::Config;
pub use geolocation::{GeolocationError, Geolocator};
pub use map::{MapView, TileCoord};
pub use model::{AnalysisPayload, AnalysisQuery, AnalysisReport, CoordinateError, FormInput, Location, WeatherDetails};
pub use session::Session;
pub use state::{AnalyzeError, AppState, Outcome};
pub use view::ResultsView;
