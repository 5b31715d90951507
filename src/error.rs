/// The main error type for Postflow client operations
#[derive(Debug, thiserror::Error)]
pub enum PostflowError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    #[error("Operation already in flight: {0}")]
    InFlight(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl PostflowError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::ServiceUnavailable(msg.into())
    }

    pub fn request_timeout() -> Self {
        Self::RequestTimeout
    }

    pub fn in_flight(msg: impl Into<String>) -> Self {
        Self::InFlight(msg.into())
    }

    /// Whether this error came from the transport layer rather than the
    /// backend rejecting the request.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_) | Self::RequestTimeout)
    }
}

/// Result type alias for Postflow client operations
pub type Result<T> = std::result::Result<T, PostflowError>;

// Common error type conversions

impl From<serde_json::Error> for PostflowError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            PostflowError::BadRequest(format!("JSON error: {}", err))
        } else {
            PostflowError::Internal(format!("JSON serialization error: {}", err))
        }
    }
}

impl From<reqwest::Error> for PostflowError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PostflowError::RequestTimeout
        } else if err.is_connect() {
            PostflowError::ServiceUnavailable(format!("Connection error: {}", err))
        } else if err.is_status() {
            // Map HTTP status codes reported by the backend
            if let Some(status) = err.status() {
                match status.as_u16() {
                    400 => PostflowError::BadRequest("Backend rejected the request".to_string()),
                    401 => PostflowError::Unauthorized("Backend authentication failed".to_string()),
                    403 => PostflowError::Forbidden("Backend access denied".to_string()),
                    404 => PostflowError::NotFound("Backend resource not found".to_string()),
                    429 => PostflowError::TooManyRequests("Backend rate limit exceeded".to_string()),
                    503 => PostflowError::ServiceUnavailable("Backend unavailable".to_string()),
                    _ => PostflowError::Internal(format!("Backend error: {}", err)),
                }
            } else {
                PostflowError::Internal(format!("HTTP error: {}", err))
            }
        } else {
            PostflowError::Internal(format!("Request error: {}", err))
        }
    }
}

impl From<url::ParseError> for PostflowError {
    fn from(err: url::ParseError) -> Self {
        PostflowError::BadRequest(format!("Invalid URL: {}", err))
    }
}
