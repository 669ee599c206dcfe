//! Domain error types.

/// Validation errors for trip configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Stop identifier is empty or whitespace
    #[error("stop identifier must not be empty")]
    EmptyStopId,

    /// Invalid leg construction
    #[error("invalid leg: {0}")]
    InvalidLeg(&'static str),

    /// Combo has no legs
    #[error("combo must have at least one leg")]
    EmptyCombo,

    /// Trip or combo name is empty
    #[error("name must not be empty")]
    EmptyName,
}
