//! API client error types.

use thiserror::Error;

/// Errors surfaced by [`crate::ApiClient`] calls.
///
/// Transient causes (transport failures, HTTP 5xx) are retried inside the
/// client before one of these is returned; once surfaced, the error is
/// terminal for the invocation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service rejected the request (HTTP 4xx). Never retried.
    #[error("client error: HTTP {status}: {body}")]
    Client {
        /// HTTP status code, preserved from the response.
        status: u16,
        /// Response body, included for diagnostics.
        body: String,
    },

    /// The service failed (HTTP 5xx), still failing after retries.
    #[error("server error: HTTP {status}: {body}")]
    Server {
        /// HTTP status code of the final attempt.
        status: u16,
        /// Response body of the final attempt.
        body: String,
    },

    /// The service could not be reached within the retry budget.
    #[error("service unreachable: {reason}")]
    Unreachable {
        /// Transport-level failure description.
        reason: String,
    },

    /// The request could not be built or the response could not be
    /// decoded. Terminal, not retried.
    #[error("invalid request or response: {reason}")]
    Invalid {
        /// What was malformed.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_preserves_status_code() {
        let err = ApiError::Client {
            status: 404,
            body: "no such host".to_string(),
        };
        assert_eq!(err.to_string(), "client error: HTTP 404: no such host");
    }

    #[test]
    fn display_mentions_unreachable() {
        let err = ApiError::Unreachable {
            reason: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("unreachable"));
    }
}
