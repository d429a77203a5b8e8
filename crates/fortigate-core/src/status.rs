//! Classification of appliance HTTP status codes.
//!
//! The appliance answers `200` when a change is applied and `500` when it
//! refuses the data (usually because the object already exists). Anything
//! else is surfaced as unknown so an operator can look at it.

use serde::Serialize;
use tracing::{info, warn};

/// Outcome of a single appliance request, as far as the status code tells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ApiStatus {
    /// HTTP 200
    Success,
    /// HTTP 500: duplicate or invalid configuration
    ConfigRejected,
    /// Any other answer; `None` when the raw code was not numeric
    UnknownHttpError(Option<u16>),
}

impl ApiStatus {
    /// Classify a numeric status code without emitting anything.
    #[must_use]
    pub const fn from_code(code: u16) -> Self {
        match code {
            200 => Self::Success,
            500 => Self::ConfigRejected,
            other => Self::UnknownHttpError(Some(other)),
        }
    }

    /// Classify a raw status value as reported by a caller.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        raw.trim()
            .parse::<u16>()
            .map_or(Self::UnknownHttpError(None), Self::from_code)
    }

    /// True when the appliance accepted the request.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Console marker for this outcome.
    #[must_use]
    pub const fn marker(&self) -> &'static str {
        match self {
            Self::Success => "✔",
            Self::ConfigRejected => "X",
            Self::UnknownHttpError(_) => "?",
        }
    }

    /// Numeric code used by older tooling: 1 applied, 0 rejected, 2 unknown.
    #[must_use]
    pub const fn legacy_code(&self) -> u8 {
        match self {
            Self::Success => 1,
            Self::ConfigRejected => 0,
            Self::UnknownHttpError(_) => 2,
        }
    }
}

impl std::fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::ConfigRejected => write!(f, "configuration rejected (500)"),
            Self::UnknownHttpError(Some(code)) => write!(f, "unexpected status {code}"),
            Self::UnknownHttpError(None) => write!(f, "unexpected status"),
        }
    }
}

impl From<reqwest::StatusCode> for ApiStatus {
    fn from(status: reqwest::StatusCode) -> Self {
        Self::from_code(status.as_u16())
    }
}

/// Classify `code` and emit the operator-facing status line.
pub fn check_status(code: u16) -> ApiStatus {
    let status = ApiStatus::from_code(code);
    report(status, &code.to_string());
    status
}

/// Same as [`check_status`] for a value that may not be numeric.
pub fn check_status_raw(raw: &str) -> ApiStatus {
    let status = ApiStatus::from_raw(raw);
    report(status, raw);
    status
}

fn report(status: ApiStatus, raw: &str) {
    if status.is_success() {
        info!(marker = status.marker(), "appliance accepted the request");
    } else {
        warn!(marker = status.marker(), code = %raw, "Error: {raw}");
    }
}
