//! Transport error types.

/// Errors from message create/edit/delete operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The message no longer exists (deleted by the user, expired, never sent)
    #[error("message not found")]
    NotFound,

    /// Edit with identical content; harmless
    #[error("message not modified")]
    NotModified,

    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The messaging API rejected the operation
    #[error("API error: {0}")]
    Api(String),
}

impl TransportError {
    /// True for failures that leave the message id known-stale: the tracked
    /// identifier should be dropped rather than retried.
    pub fn is_rejection(&self) -> bool {
        matches!(self, TransportError::NotFound | TransportError::Api(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_classification() {
        assert!(TransportError::NotFound.is_rejection());
        assert!(TransportError::Api("bad request".into()).is_rejection());
        assert!(!TransportError::NotModified.is_rejection());
    }
}
