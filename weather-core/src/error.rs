use thiserror::Error;

use crate::unit::UnitKind;

/// Message shown for any failure below the provider (network, malformed body).
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

/// Missing or malformed input, detected before any request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a location")]
    MissingLocation,

    #[error("Please enter both location and date")]
    MissingLocationOrDate,

    #[error("Please enter a valid date (YYYY-MM-DD)")]
    InvalidDate,

    #[error("Date cannot be later than today")]
    FutureDate,

    #[error("Please enter both latitude and longitude")]
    MissingCoordinates,

    #[error("{} input cannot be submitted to {}", .got.label(), .expected.label())]
    WrongUnit { expected: UnitKind, got: UnitKind },
}

/// Failure below the provider: the exchange itself did not produce a JSON body.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("response body is not valid JSON: {0}")]
    Body(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Outcome of a request that was actually sent.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The provider answered with an `error` object.
    #[error("provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl FetchError {
    /// The single inline message presented next to the input controls.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Provider(detail) => detail.clone(),
            FetchError::Transport(_) => NETWORK_ERROR_MESSAGE.to_string(),
        }
    }
}
