use thiserror::Error;

/// Why one client-side page load did not produce a page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("gateway responded with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed ideas payload: {0}")]
    Decode(#[from] serde_json::Error),
}
