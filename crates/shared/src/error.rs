use serde::{Deserialize, Serialize};

pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch data";

/// Uniform failure envelope returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    pub fn fetch_failed() -> Self {
        Self::new(FETCH_FAILED_MESSAGE)
    }
}
