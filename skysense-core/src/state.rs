//! Single-owner UI state and the transitions allowed on it.
//!
//! Asynchronous work is split into a `begin_*` call that hands out a [`Ticket`]
//! and a `finish_*` call that applies the result only if that ticket is still
//! the current one. Nothing here awaits.

use chrono::NaiveDate;
use thiserror::Error;

use crate::{
    backend::AnalysisError,
    geolocation::GeolocationError,
    model::{AnalysisPayload, AnalysisQuery, FormInput, Location},
};

/// Shown for every transport or server failure, whatever the cause.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch data. Is your Python server running?";

#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// What the user sees.
    pub message: String,
    /// What actually went wrong.
    pub cause: String,
}

impl Failure {
    fn from_error(err: &AnalysisError) -> Self {
        Self { message: FETCH_FAILED_MESSAGE.to_string(), cause: err.to_string() }
    }
}

/// Result of the most recent analysis attempt.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Outcome {
    #[default]
    Idle,
    Loading,
    Success(AnalysisPayload),
    Failure(Failure),
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Outcome::Success(_) | Outcome::Failure(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub location: Location,
    pub form: FormInput,
    pub outcome: Outcome,
    /// The error line currently on screen, from either geolocation or analysis.
    pub error: Option<String>,
}

impl AppState {
    pub fn new(location: Location, form: FormInput) -> Self {
        Self { location, form, outcome: Outcome::Idle, error: None }
    }

    pub fn is_loading(&self) -> bool {
        self.outcome == Outcome::Loading
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AnalyzeError {
    #[error("an analysis is already in flight")]
    InFlight,
}

/// Identifies one asynchronous operation started on a [`Store`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
pub struct Store {
    state: AppState,
    issued: u64,
    analysis: Option<Ticket>,
    lookup: Option<Ticket>,
}

impl Store {
    pub fn new(state: AppState) -> Self {
        Self { state, issued: 0, analysis: None, lookup: None }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Map click: last click wins, and it also supersedes a pending lookup.
    pub fn set_location(&mut self, location: Location) {
        self.state.location = location;
        self.lookup = None;
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.state.form.date = date;
    }

    pub fn set_activity(&mut self, activity: String) {
        self.state.form.activity = activity;
    }

    pub fn begin_lookup(&mut self) -> Ticket {
        let ticket = self.issue();
        self.lookup = Some(ticket);
        ticket
    }

    /// Returns `false` when the lookup was superseded and its result dropped.
    pub fn finish_lookup(
        &mut self,
        ticket: Ticket,
        result: Result<Location, GeolocationError>,
    ) -> bool {
        if self.lookup != Some(ticket) {
            return false;
        }
        self.lookup = None;

        match result {
            Ok(location) => self.state.location = location,
            Err(err) => self.state.error = Some(err.to_string()),
        }
        true
    }

    /// Enter `Loading`, clear the on-screen error, and snapshot the query.
    pub fn begin_analysis(&mut self) -> Result<(Ticket, AnalysisQuery), AnalyzeError> {
        if self.analysis.is_some() {
            return Err(AnalyzeError::InFlight);
        }

        let ticket = self.issue();
        self.analysis = Some(ticket);
        self.state.outcome = Outcome::Loading;
        self.state.error = None;

        Ok((ticket, AnalysisQuery::new(&self.state.location, &self.state.form)))
    }

    /// Settle the analysis started with `ticket`. Returns `false` for a stale ticket.
    pub fn finish_analysis(
        &mut self,
        ticket: Ticket,
        result: Result<AnalysisPayload, AnalysisError>,
    ) -> bool {
        if self.analysis != Some(ticket) {
            return false;
        }
        self.analysis = None;

        self.state.outcome = match result {
            Ok(payload) => Outcome::Success(payload),
            Err(err) => {
                let failure = Failure::from_error(&err);
                self.state.error = Some(failure.message.clone());
                Outcome::Failure(failure)
            }
        };
        true
    }

    /// Forget an analysis whose caller went away before it settled.
    ///
    /// The outcome drops back to `Idle` and a new analysis may start. Returns
    /// `false` for a stale ticket.
    pub fn abandon_analysis(&mut self, ticket: Ticket) -> bool {
        if self.analysis != Some(ticket) {
            return false;
        }
        self.analysis = None;
        self.state.outcome = Outcome::Idle;
        true
    }
}
