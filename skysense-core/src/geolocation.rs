use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, sync::Arc};
use thiserror::Error;
use tracing::{info, warn};

use crate::{config::GeolocationConfig, model::Location};

pub const DEFAULT_GEOLOCATION_URL: &str = "http://ip-api.com/json";

/// Failure of a positional lookup. The messages are shown to the user as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Geolocation is not supported by this browser.")]
    Unsupported,

    #[error("Unable to retrieve location. Please enable location services in your browser.")]
    Unavailable,
}

/// Source of "where am I right now".
///
/// Lookups are plain futures: dropping one before it resolves cancels it.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Location, GeolocationError>;
}

/// Approximate position from the public IP address, via ip-api.com.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    url: String,
    http: Client,
}

impl IpGeolocator {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), http: Client::new() }
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn current_position(&self) -> Result<Location, GeolocationError> {
        let res = self.http.get(&self.url).send().await.map_err(|e| {
            warn!(error = %e, "geolocation service unreachable");
            GeolocationError::Unavailable
        })?;

        let status = res.status();
        if !status.is_success() {
            warn!(%status, "geolocation service returned an error status");
            return Err(GeolocationError::Unavailable);
        }

        let parsed: IpApiResponse = res.json().await.map_err(|e| {
            warn!(error = %e, "geolocation response could not be parsed");
            GeolocationError::Unavailable
        })?;

        let (lat, lon) = match (parsed.status.as_str(), parsed.lat, parsed.lon) {
            ("success", Some(lat), Some(lon)) => (lat, lon),
            _ => {
                warn!(
                    status = %parsed.status,
                    message = parsed.message.as_deref().unwrap_or(""),
                    "geolocation lookup was not successful"
                );
                return Err(GeolocationError::Unavailable);
            }
        };

        let location = Location::new(lat, lon).map_err(|e| {
            warn!(error = %e, "geolocation service returned invalid coordinates");
            GeolocationError::Unavailable
        })?;

        info!(lat, lon, "geolocation resolved");
        Ok(location)
    }
}

/// Used when lookups are switched off; every lookup reports no support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

#[async_trait]
impl Geolocator for NoGeolocation {
    async fn current_position(&self) -> Result<Location, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

pub fn geolocator_from_config(config: &GeolocationConfig) -> Arc<dyn Geolocator> {
    if config.enabled {
        Arc::new(IpGeolocator::new(config.url.clone()))
    } else {
        Arc::new(NoGeolocation)
    }
}
