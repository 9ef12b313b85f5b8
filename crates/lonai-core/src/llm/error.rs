use thiserror::Error;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LLMError {
    #[error("API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Rate limited. Try again later.")]
    RateLimited,

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Model returned an empty response")]
    EmptyResponse,
}

impl LLMError {
    /// Whether a second attempt could reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            LLMError::RateLimited | LLMError::Timeout | LLMError::Network(_) => true,
            LLMError::ApiError { status, .. } => *status >= 500,
            LLMError::ParseError(_) | LLMError::EmptyResponse => false,
        }
    }
}

impl From<reqwest::Error> for LLMError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LLMError::Timeout
        } else {
            LLMError::Network(err.to_string())
        }
    }
}
