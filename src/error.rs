use thiserror::Error;

/// Unified error type for proxy selection and request dispatch
#[derive(Error, Debug)]
pub enum FetchError {
    // Proxy source errors
    #[error("Proxy list not found: {path} (create it and put one proxy per line)")]
    ConfigurationMissing { path: String },

    #[error("No proxies available")]
    NoProxiesAvailable,

    #[error("Invalid proxy format: {0}")]
    InvalidProxyFormat(String),

    // Session configuration errors
    #[error("Invalid proxy: {0}")]
    InvalidProxy(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Cannot encode credentials: {0}")]
    Credentials(String),

    // Request errors
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Server responded with status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Response body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Expected a JSON response, got content type {content_type:?}")]
    UnexpectedContentType { content_type: String },

    #[error("Session already closed")]
    SessionClosed,

    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for fetchproxy operations
pub type Result<T> = std::result::Result<T, FetchError>;

impl FetchError {
    /// Conditions raised while choosing a proxy; the caller cannot proceed without one
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FetchError::ConfigurationMissing { .. }
                | FetchError::NoProxiesAvailable
                | FetchError::InvalidProxyFormat(_)
        )
    }

    /// Failures produced inside a single `fetch` call
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            FetchError::InvalidProxy(_)
                | FetchError::InvalidHeader(_)
                | FetchError::Credentials(_)
                | FetchError::Client(_)
                | FetchError::Status { .. }
                | FetchError::Decode(_)
                | FetchError::UnexpectedContentType { .. }
                | FetchError::SessionClosed
                | FetchError::Timeout(_)
        )
    }

    /// Whether repeating the same request could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Client(e) => !e.is_builder() && !e.is_decode(),
            FetchError::Status { status, .. } => *status >= 500 || *status == 429,
            FetchError::Timeout(_) => true,
            _ => false,
        }
    }

    /// HTTP status attached to the failure, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Client(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<url::ParseError> for FetchError {
    fn from(err: url::ParseError) -> Self {
        FetchError::InvalidProxy(err.to_string())
    }
}
