//! State store error types.

/// Errors reading or writing persisted user state.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("state IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("state encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}
