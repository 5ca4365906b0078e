use std::fmt;

use crate::{
    model::{AnalysisPayload, WeatherDetails},
    state::{AppState, Outcome},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerControl {
    pub label: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultCard {
    /// The server answered, but with an `error` field.
    Error(String),
    Report { source: String, advice: String, details: WeatherDetails },
}

impl ResultCard {
    pub fn detail_lines(details: &WeatherDetails) -> [String; 3] {
        [
            format!("🌡️ Temp: {}°C", details.temp),
            format!("💧 Rain: {} mm", details.rain_mm),
            format!("💨 Wind: {} km/h", details.wind_kph),
        ]
    }
}

/// What the page shows below the form, derived from state only.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    pub trigger: TriggerControl,
    pub error: Option<String>,
    pub card: Option<ResultCard>,
}

impl ResultsView {
    pub fn render(state: &AppState) -> Self {
        let trigger = if state.is_loading() {
            TriggerControl { label: "Analyzing...", enabled: false }
        } else {
            TriggerControl { label: "Analyze", enabled: true }
        };

        let card = match &state.outcome {
            Outcome::Success(AnalysisPayload::Rejected { error }) => {
                Some(ResultCard::Error(error.clone()))
            }
            Outcome::Success(AnalysisPayload::Report(report)) => Some(ResultCard::Report {
                source: report.source.clone(),
                advice: report.advice.clone(),
                details: report.details.clone(),
            }),
            Outcome::Idle | Outcome::Loading | Outcome::Failure(_) => None,
        };

        Self { trigger, error: state.error.clone(), card }
    }
}

impl fmt::Display for ResultsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.trigger.label)?;

        if let Some(error) = &self.error {
            write!(f, "\nError: {error}")?;
        }

        match &self.card {
            None => {}
            Some(ResultCard::Error(error)) => write!(f, "\nError: {error}")?,
            Some(ResultCard::Report { source, advice, details }) => {
                write!(f, "\nAnalysis from: {source}\n{advice}")?;
                for line in ResultCard::detail_lines(details) {
                    write!(f, "\n  {line}")?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{AnalysisReport, FormInput, Location},
        state::{FETCH_FAILED_MESSAGE, Failure},
    };
    use chrono::NaiveDate;

    fn state(outcome: Outcome, error: Option<&str>) -> AppState {
        AppState {
            location: Location::new(9.82, 77.18).unwrap(),
            form: FormInput {
                date: NaiveDate::from_ymd_opt(2025, 10, 11).unwrap(),
                activity: "Indoor games".into(),
            },
            outcome,
            error: error.map(str::to_string),
        }
    }

    fn report() -> AnalysisPayload {
        AnalysisPayload::Report(AnalysisReport {
            source: "NASA".into(),
            advice: "Bring an umbrella".into(),
            details: WeatherDetails { temp: 22.0, rain_mm: 5.5, wind_kph: 10.0 },
        })
    }

    #[test]
    fn idle_shows_enabled_trigger_only() {
        let view = ResultsView::render(&state(Outcome::Idle, None));

        assert_eq!(view.trigger, TriggerControl { label: "Analyze", enabled: true });
        assert_eq!(view.error, None);
        assert_eq!(view.card, None);
        assert_eq!(view.to_string(), "[Analyze]");
    }

    #[test]
    fn loading_disables_trigger() {
        let view = ResultsView::render(&state(Outcome::Loading, None));

        assert_eq!(view.trigger, TriggerControl { label: "Analyzing...", enabled: false });
        assert_eq!(view.card, None);
    }

    #[test]
    fn failure_shows_error_line_without_card() {
        let failure = Failure { message: FETCH_FAILED_MESSAGE.into(), cause: "status 500".into() };
        let view = ResultsView::render(&state(Outcome::Failure(failure), Some(FETCH_FAILED_MESSAGE)));

        assert_eq!(view.error.as_deref(), Some(FETCH_FAILED_MESSAGE));
        assert_eq!(view.card, None);
        assert!(view.to_string().contains("Error: Failed to fetch data. Is your Python server running?"));
    }

    #[test]
    fn server_reported_error_replaces_report_layout() {
        let payload = AnalysisPayload::Rejected { error: "No data for this location".into() };
        let view = ResultsView::render(&state(Outcome::Success(payload), None));

        assert_eq!(view.card, Some(ResultCard::Error("No data for this location".into())));
        let text = view.to_string();
        assert!(text.contains("Error: No data for this location"));
        assert!(!text.contains("Analysis from"));
    }

    #[test]
    fn report_shows_source_advice_and_units() {
        let view = ResultsView::render(&state(Outcome::Success(report()), None));

        assert_eq!(
            view.to_string(),
            "[Analyze]\nAnalysis from: NASA\nBring an umbrella\n  🌡️ Temp: 22°C\n  💧 Rain: 5.5 mm\n  💨 Wind: 10 km/h"
        );
    }

    #[test]
    fn lookup_error_and_previous_report_both_show() {
        let view = ResultsView::render(&state(
            Outcome::Success(report()),
            Some("Geolocation is not supported by this browser."),
        ));

        assert!(view.error.is_some());
        assert!(matches!(view.card, Some(ResultCard::Report { .. })));
    }
}
