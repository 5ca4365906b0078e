use anyhow::Context;
use chrono::NaiveDate;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::{
    backend::{AnalysisBackend, HttpAnalysisBackend},
    config::Config,
    geolocation::{GeolocationError, Geolocator, geolocator_from_config},
    model::Location,
    state::{AnalyzeError, AppState, Outcome, Store, Ticket},
};

/// One user's form: the state store plus the collaborators it talks to.
///
/// The store lock is only taken between awaits, so concurrent calls on a shared
/// session observe each other's transitions (e.g. `Loading`) immediately.
#[derive(Debug)]
pub struct Session {
    store: Mutex<Store>,
    backend: Arc<dyn AnalysisBackend>,
    locator: Arc<dyn Geolocator>,
}

impl Session {
    pub fn new(
        initial: AppState,
        backend: Arc<dyn AnalysisBackend>,
        locator: Arc<dyn Geolocator>,
    ) -> Self {
        Self { store: Mutex::new(Store::new(initial)), backend, locator }
    }

    /// Build a session talking to the configured endpoint and geolocation service.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let backend = match config.request_timeout() {
            Some(timeout) => HttpAnalysisBackend::with_timeout(config.endpoint.clone(), timeout)
                .context("Failed to build HTTP client")?,
            None => HttpAnalysisBackend::new(config.endpoint.clone()),
        };

        Ok(Self::new(
            config.initial_state()?,
            Arc::new(backend),
            geolocator_from_config(&config.geolocation),
        ))
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        // Transitions never panic halfway, so a poisoned store is still consistent.
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> AppState {
        self.store().state().clone()
    }

    /// A click on the map at `location`.
    pub fn click_map(&self, location: Location) {
        debug!(lat = location.lat(), lng = location.lng(), "map clicked");
        self.store().set_location(location);
    }

    pub fn set_date(&self, date: NaiveDate) {
        self.store().set_date(date);
    }

    pub fn set_activity(&self, activity: impl Into<String>) {
        self.store().set_activity(activity.into());
    }

    /// Ask the geolocator where we are and move there on success.
    ///
    /// A failure leaves the location alone and puts the error on screen.
    pub async fn locate(&self) -> Result<Location, GeolocationError> {
        let ticket = self.store().begin_lookup();
        let result = self.locator.current_position().await;

        if !self.store().finish_lookup(ticket, result) {
            debug!("geolocation result superseded; ignoring");
        }
        result
    }

    /// Run one analysis for the current form and return the outcome it settled on.
    pub async fn analyze(&self) -> Result<Outcome, AnalyzeError> {
        let (ticket, query) = self.store().begin_analysis()?;
        info!(
            lat = query.lat,
            lon = query.lon,
            date = %query.date,
            activity = %query.activity,
            "analysis started"
        );

        let pending = PendingAnalysis { session: self, ticket: Some(ticket) };
        let result = self.backend.analyze(&query).await;
        pending.disarm();

        match &result {
            Ok(_) => info!("analysis settled"),
            Err(e) => warn!(error = %e, "analysis failed"),
        }

        let mut store = self.store();
        store.finish_analysis(ticket, result);
        Ok(store.state().outcome.clone())
    }
}

/// Releases the in-flight slot if the `analyze()` future is dropped mid-request.
struct PendingAnalysis<'a> {
    session: &'a Session,
    ticket: Option<Ticket>,
}

impl PendingAnalysis<'_> {
    fn disarm(mut self) {
        self.ticket = None;
    }
}

impl Drop for PendingAnalysis<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            if self.session.store().abandon_analysis(ticket) {
                debug!("analysis dropped before it settled");
            }
        }
    }
}
