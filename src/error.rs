use std::fmt;

use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{error, warn};

use crate::models::analytic_data::ApiStatus;

pub type AppResult<T> = Result<T, AppError>;

/// Transport-level failure reported by a fetch capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// DNS or connection failure.
    Internet,
    /// The API rejected the query (bad token, malformed parameters).
    Query,
    /// Anything else, including an unreadable response body.
    Other,
}

impl FetchErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FetchErrorKind::Internet => "InternetError",
            FetchErrorKind::Query => "QueryError",
            FetchErrorKind::Other => "OtherError",
        }
    }
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,
}

impl FetchError {
    pub fn internet(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Internet,
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Query,
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Other,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("User input error: {message}")]
    Validation {
        message: String,
        details: Option<JsonValue>,
    },

    #[error("{field} cannot be obtained from the fetched data")]
    MissingField { field: &'static str },

    #[error("unexpected data from API: {message}")]
    UnexpectedData { message: String },

    #[error("{}", .status.message())]
    DataUnavailable { status: ApiStatus },

    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, "validation error");
        AppError::Validation {
            message,
            details: None,
        }
    }

    pub fn validation_with_details(message: impl Into<String>, details: JsonValue) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, details = %details, "validation error with details");
        AppError::Validation {
            message,
            details: Some(details),
        }
    }

    pub fn missing_field(field: &'static str) -> Self {
        error!(target: "app::pulse", field, "row is missing a required field");
        AppError::MissingField { field }
    }

    pub fn unexpected_data(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::api", %message, "unexpected data shape");
        AppError::UnexpectedData { message }
    }

    pub fn data_unavailable(status: ApiStatus) -> Self {
        warn!(target: "app::data_service", status = status.as_str(), "data could not be obtained");
        AppError::DataUnavailable { status }
    }

    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::other", %message, "other error");
        AppError::Other(message)
    }

    pub fn status(&self) -> Option<ApiStatus> {
        match self {
            AppError::DataUnavailable { status } => Some(*status),
            _ => None,
        }
    }
}
