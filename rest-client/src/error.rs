//! Error types for the REST client

use thiserror::Error;

/// Errors that can occur during Outlook REST communication
#[derive(Debug, Error)]
pub enum RestError {
    /// Network or HTTP transport error
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// Response body could not be read or parsed as JSON
    #[error("Response parsing error: {0}")]
    Parse(String),

    /// Non-success HTTP status returned by the server
    #[error("HTTP status {code}")]
    Status {
        /// HTTP status code
        code: u16,
        /// Response body, if one could be read
        body: String,
    },
}

impl RestError {
    /// HTTP status code for `Status` errors, `None` otherwise
    pub fn status_code(&self) -> Option<u16> {
        match self {
            RestError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_error_display() {
        let error = RestError::Network("connection refused".to_string());
        assert_eq!(error.to_string(), "Network/HTTP error: connection refused");

        let error = RestError::Parse("unexpected token".to_string());
        assert_eq!(error.to_string(), "Response parsing error: unexpected token");

        let error = RestError::Status {
            code: 404,
            body: "not found".to_string(),
        };
        assert_eq!(error.to_string(), "HTTP status 404");
    }

    #[test]
    fn test_status_code_accessor() {
        let error = RestError::Status {
            code: 429,
            body: String::new(),
        };
        assert_eq!(error.status_code(), Some(429));

        let error = RestError::Network("timeout".to_string());
        assert_eq!(error.status_code(), None);
    }
}
