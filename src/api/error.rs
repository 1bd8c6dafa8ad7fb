use std::fmt;

/// API errors with user-friendly messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Network-level failure (connection, DNS, reset)
    Network(String),
    /// Request did not complete within the configured timeout
    Timeout,
    /// HTTP error response (4xx, 5xx) with the server's message, if it sent one
    HttpStatus(u16, String),
    /// Failed to parse response
    Parse(String),
    /// Session persistence failure
    Storage(String),
}

impl ApiError {
    /// Returns a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(details) => {
                if details.contains("dns") || details.contains("resolve") {
                    "Network error: Could not reach server.".into()
                } else {
                    format!("Network error: {details}")
                }
            }
            Self::Timeout => "Request timed out. Please try again.".into(),
            Self::HttpStatus(_, msg) if !msg.is_empty() => msg.clone(),
            Self::HttpStatus(401 | 403, _) => "Not authorized. Please log in again.".into(),
            Self::HttpStatus(404, _) => "Not found.".into(),
            Self::HttpStatus(429, _) => "Rate limited. Please wait a moment.".into(),
            Self::HttpStatus(500..=599, _) => "Server error. Please try again later.".into(),
            Self::HttpStatus(code, _) => format!("HTTP error {code}"),
            Self::Parse(details) => format!("Failed to parse response: {details}"),
            Self::Storage(details) => format!("Storage error: {details}"),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Network("connection failed".into())
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            Self::HttpStatus(
                status.as_u16(),
                status.canonical_reason().unwrap_or("").into(),
            )
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<crate::storage::StorageError> for ApiError {
    fn from(err: crate::storage::StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_is_shown_for_client_errors() {
        let err = ApiError::HttpStatus(400, "Page out of range".into());
        assert_eq!(err.user_message(), "Page out of range");
    }

    #[test]
    fn server_message_wins_for_every_status() {
        for code in [401, 404, 429, 503] {
            let err = ApiError::HttpStatus(code, "Feed service is restarting".into());
            assert_eq!(err.user_message(), "Feed service is restarting");
        }
    }

    #[test]
    fn canned_text_when_server_sent_nothing() {
        assert_eq!(
            ApiError::HttpStatus(503, String::new()).user_message(),
            "Server error. Please try again later."
        );
        assert_eq!(
            ApiError::HttpStatus(401, String::new()).user_message(),
            "Not authorized. Please log in again."
        );
        assert_eq!(ApiError::HttpStatus(404, String::new()).user_message(), "Not found.");
    }

    #[test]
    fn empty_status_message_falls_back_to_code() {
        let err = ApiError::HttpStatus(418, String::new());
        assert_eq!(err.user_message(), "HTTP error 418");
    }
}
