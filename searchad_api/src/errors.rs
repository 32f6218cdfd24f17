//! Error types for the API client.

/// Errors that can occur when making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An HTTP request failed (network error, timeout, or unreadable body).
    #[error("Request failed")]
    RequestFailed,
    /// The API returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The API answered with a success status but the body did not parse.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// The request URL could not be built from the configured base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// The request could not be signed or carried an invalid header value.
    #[error("Signature error: {0}")]
    Signature(String),
}

impl Error {
    /// Whether retrying the same request may succeed (transport failures,
    /// throttling and server-side errors).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidResponse(_) | Self::InvalidUrl(_) | Self::Signature(_) => false,
        }
    }
}
