use crate::http::FetchError;
use cekbpom_core::ConfigError;
use thiserror::Error;

/// Envelope status for caller input errors.
pub const STATUS_INPUT_ERROR: u16 = 400;

/// Envelope status for transport failures that carry no upstream status.
pub const STATUS_TRANSPORT_FAILURE: u16 = 500;

/// Envelope status for upstream markup contract violations.
pub const STATUS_PROTOCOL_ERROR: u16 = 543;

/// An expected structural marker was missing from an upstream response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("session token not found")]
    SessionTokenNotFound,

    #[error("{0}")]
    InvalidSessionToken(String),

    #[error("signature not found")]
    SignatureNotFound,

    #[error("row shortfall: parsed {parsed} of {expected} declared rows")]
    RowShortfall { expected: usize, parsed: usize },

    #[error("manufacturer line not found")]
    ManufacturerNotFound,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid input: {0}")]
    Input(String),

    #[error("upstream HTTP {status}: {message}")]
    Transport { status: u16, message: String },

    #[error("protocol error: {0}")]
    Protocol(ProtocolViolation),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ScanError {
    /// Status code this error is surfaced with in a result envelope.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Input(_) | Self::Config(_) => STATUS_INPUT_ERROR,
            Self::Transport { status, .. } => *status,
            Self::Protocol(_) => STATUS_PROTOCOL_ERROR,
        }
    }
}

impl From<ProtocolViolation> for ScanError {
    fn from(violation: ProtocolViolation) -> Self {
        Self::Protocol(violation)
    }
}

impl From<FetchError> for ScanError {
    fn from(err: FetchError) -> Self {
        Self::Transport {
            status: STATUS_TRANSPORT_FAILURE,
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ScanError::Input("no queries given".into()).status_code(), 400);
        assert_eq!(
            ScanError::Transport {
                status: 503,
                message: "Service Unavailable".into()
            }
            .status_code(),
            503
        );
        assert_eq!(
            ScanError::from(ProtocolViolation::SignatureNotFound).status_code(),
            543
        );
    }

    #[test]
    fn test_error_display() {
        let err = ScanError::from(ProtocolViolation::SessionTokenNotFound);
        assert_eq!(err.to_string(), "protocol error: session token not found");

        let err = ScanError::from(ProtocolViolation::RowShortfall {
            expected: 10,
            parsed: 8,
        });
        assert_eq!(
            err.to_string(),
            "protocol error: row shortfall: parsed 8 of 10 declared rows"
        );
    }
}
