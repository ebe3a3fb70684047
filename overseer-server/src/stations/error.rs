//! Station feed and registry error types.

use crate::domain::StationId;

/// Errors that can occur while fetching, decoding, or caching station data.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("API error {status} from {url}")]
    Api { status: u16, url: String },

    /// Roster or detail document could not be decoded
    #[error("decode error: {message}")]
    Decode { message: String },

    /// Detail update requested for a station missing from the roster
    #[error("unknown station {0}")]
    UnknownStation(StationId),

    /// Snapshot file could not be read or written
    #[error("cache operation failed: {message}")]
    Cache { message: String },
}

impl StationError {
    pub(crate) fn decode(message: impl Into<String>) -> Self {
        StationError::Decode {
            message: message.into(),
        }
    }

    pub(crate) fn cache(message: impl Into<String>) -> Self {
        StationError::Cache {
            message: message.into(),
        }
    }

    /// True if the upstream endpoint could not be reached or refused the request.
    pub fn is_fetch(&self) -> bool {
        matches!(self, StationError::Http(_) | StationError::Api { .. })
    }

    pub fn is_cache(&self) -> bool {
        matches!(self, StationError::Cache { .. })
    }
}
