use thiserror::Error;

/// Errors from the coach API client.
///
/// Every remote call fails into exactly one of these classes so callers can
/// turn failures into user-facing text without inspecting transport details.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure; no HTTP response was received.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    Http { status: u16, message: String },

    /// The response body did not match the expected schema.
    #[error("parse error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Wrap a transport failure from reqwest.
    pub(crate) fn network(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
