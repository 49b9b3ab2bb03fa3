use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl GatewayError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let truncated: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
            format!("{}... (truncated, {} total bytes)", truncated, body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => GatewayError::Unauthorized,
            403 => GatewayError::AccessDenied(truncated),
            404 => GatewayError::NotFound(truncated),
            429 => GatewayError::RateLimited,
            500..=599 => GatewayError::ServerError(truncated),
            _ => GatewayError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(matches!(
            GatewayError::from_status(reqwest::StatusCode::UNAUTHORIZED, ""),
            GatewayError::Unauthorized
        ));
        assert!(matches!(
            GatewayError::from_status(reqwest::StatusCode::NOT_FOUND, "missing"),
            GatewayError::NotFound(_)
        ));
        assert!(matches!(
            GatewayError::from_status(reqwest::StatusCode::TOO_MANY_REQUESTS, ""),
            GatewayError::RateLimited
        ));
        assert!(matches!(
            GatewayError::from_status(reqwest::StatusCode::BAD_GATEWAY, "oops"),
            GatewayError::ServerError(_)
        ));
    }

    #[test]
    fn test_truncate_body() {
        let long_body = "x".repeat(600);
        let err = GatewayError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, &long_body);
        let message = err.to_string();
        assert!(message.contains("truncated"));
        assert!(message.contains("600 total bytes"));
    }
}
