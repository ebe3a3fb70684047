//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Availability, Coordinates};

/// Query string accepted by the station listing.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    /// Comma-separated availability filters (`bike`, `slot`, `tickets`)
    pub filters: Option<String>,
}

impl FilterQuery {
    /// Parsed filters; unknown names are ignored.
    pub fn availability(&self) -> Vec<Availability> {
        self.filters
            .as_deref()
            .map(Availability::parse_list)
            .unwrap_or_default()
    }
}

/// Query string accepted by the proximity listing.
#[derive(Debug, Default, Deserialize)]
pub struct NearQuery {
    /// Comma-separated availability filters
    pub filters: Option<String>,

    /// Maximum number of stations to return; ignored unless it parses
    pub n: Option<String>,
}

impl NearQuery {
    pub fn limit(&self) -> Option<usize> {
        self.n.as_deref().and_then(|n| n.trim().parse().ok())
    }

    pub fn availability(&self) -> Vec<Availability> {
        self.filters
            .as_deref()
            .map(Availability::parse_list)
            .unwrap_or_default()
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Number of known stations
    pub stations: usize,

    /// Last successful roster update
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Error returned when a location path segment doesn't parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid location: {0:?}")]
pub struct InvalidLocation(String);

/// Parse a location of the form `@lat,lng`.
pub fn parse_location(location: &str) -> Result<Coordinates, InvalidLocation> {
    let invalid = || InvalidLocation(location.to_string());

    let (lat, lng) = location
        .strip_prefix('@')
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(invalid)?;

    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lng: f64 = lng.trim().parse().map_err(|_| invalid())?;
    if !lat.is_finite() || !lng.is_finite() {
        return Err(invalid());
    }

    Ok(Coordinates::new(lat, lng))
}
