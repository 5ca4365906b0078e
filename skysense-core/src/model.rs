use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejection reasons for a latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("latitude {0} is outside -90..=90")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside -180..=180")]
    LongitudeOutOfRange(f64),
}

/// A point of interest in decimal degrees (WGS84).
///
/// Always replaced as a whole; there are no setters for individual fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLocation")]
pub struct Location {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct RawLocation {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawLocation> for Location {
    type Error = CoordinateError;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        Location::new(raw.lat, raw.lng)
    }
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        // `contains` is false for NaN, so non-finite input is rejected here too.
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(CoordinateError::LongitudeOutOfRange(lng));
        }

        Ok(Self { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.lat, self.lng)
    }
}

/// What the user typed into the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInput {
    pub date: NaiveDate,
    pub activity: String,
}

/// Query sent to the analysis endpoint. Field names are the wire names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisQuery {
    pub lat: f64,
    pub lon: f64,
    pub date: NaiveDate,
    pub activity: String,
}

impl AnalysisQuery {
    pub fn new(location: &Location, form: &FormInput) -> Self {
        Self {
            lat: location.lat(),
            lon: location.lng(),
            date: form.date,
            activity: form.activity.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherDetails {
    pub temp: f64,
    pub rain_mm: f64,
    pub wind_kph: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub source: String,
    pub advice: String,
    pub details: WeatherDetails,
}

/// Body of a successful HTTP response from the analysis endpoint.
///
/// The server reports application-level problems (no data, date out of range)
/// with a 200 and an `error` field; that shape is tried first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisPayload {
    Rejected { error: String },
    Report(AnalysisReport),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_accepts_bounds_and_rejects_outside() {
        assert!(Location::new(90.0, 180.0).is_ok());
        assert!(Location::new(-90.0, -180.0).is_ok());

        assert_eq!(
            Location::new(90.5, 0.0).unwrap_err(),
            CoordinateError::LatitudeOutOfRange(90.5)
        );
        assert_eq!(
            Location::new(0.0, -181.0).unwrap_err(),
            CoordinateError::LongitudeOutOfRange(-181.0)
        );
        assert!(Location::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn location_deserialization_validates() {
        let ok: Location = serde_json::from_str(r#"{"lat": 9.82, "lng": 77.18}"#).unwrap();
        assert_eq!(ok, Location::new(9.82, 77.18).unwrap());

        let err = serde_json::from_str::<Location>(r#"{"lat": 123.0, "lng": 0.0}"#).unwrap_err();
        assert!(err.to_string().contains("latitude 123"));
    }

    #[test]
    fn query_uses_lon_wire_name_and_iso_date() {
        let location = Location::new(9.82, 77.18).unwrap();
        let form = FormInput {
            date: NaiveDate::from_ymd_opt(2025, 10, 11).unwrap(),
            activity: "Indoor games".into(),
        };

        let json = serde_json::to_value(AnalysisQuery::new(&location, &form)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "lat": 9.82,
                "lon": 77.18,
                "date": "2025-10-11",
                "activity": "Indoor games",
            })
        );
    }

    #[test]
    fn payload_parses_report() {
        let body = r#"{"source":"NASA","advice":"Bring an umbrella","details":{"temp":22,"rain_mm":5,"wind_kph":10}}"#;
        let payload: AnalysisPayload = serde_json::from_str(body).unwrap();

        assert_eq!(
            payload,
            AnalysisPayload::Report(AnalysisReport {
                source: "NASA".into(),
                advice: "Bring an umbrella".into(),
                details: WeatherDetails { temp: 22.0, rain_mm: 5.0, wind_kph: 10.0 },
            })
        );
    }

    #[test]
    fn payload_prefers_error_field() {
        let payload: AnalysisPayload =
            serde_json::from_str(r#"{"error":"No data for this location"}"#).unwrap();
        assert_eq!(payload, AnalysisPayload::Rejected { error: "No data for this location".into() });
    }

    #[test]
    fn payload_rejects_missing_details() {
        let err = serde_json::from_str::<AnalysisPayload>(r#"{"source":"NASA","advice":"ok"}"#);
        assert!(err.is_err());
    }
}
