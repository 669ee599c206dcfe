//! OTP client error types.

/// Errors from the OTP HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider reports the stop identifier does not exist
    #[error("unknown stop")]
    StopUnknown,

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// JSON deserialization failed
    #[error("JSON parse error: {message}")]
    Json { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(OtpError::StopUnknown.to_string(), "unknown stop");
        let err = OtpError::Api {
            status: 500,
            message: "Internal Server Error".into(),
        };
        assert_eq!(err.to_string(), "API error 500: Internal Server Error");
    }
}
