//! Error types for a single request against the insights resource.

/// Failure of one request attempt. The fetcher uses [FetchError::is_retryable] to decide
/// whether another attempt is worth it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Base url {0} can't hold a path")]
    InvalidUrl(String),
}

pub const PAYMENT_REQUIRED: u16 = 402;

/// Rate limiting and transient upstream failures.
const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Status { status, .. } => RETRYABLE_STATUSES.contains(status),
            FetchError::Network(_) => true,
            FetchError::Decode(_) | FetchError::InvalidUrl(_) => false,
        }
    }

    pub fn is_payment_required(&self) -> bool {
        matches!(self, FetchError::Status { status, .. } if *status == PAYMENT_REQUIRED)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}
