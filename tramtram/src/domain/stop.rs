//! Stop identifier type.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::DomainError;

/// A GTT stop identifier (e.g. `"1132"`).
///
/// Stop identifiers are opaque strings handed to the arrival data provider;
/// the only invariant is that they are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopId(String);

impl StopId {
    /// Create a stop identifier, rejecting empty or whitespace-only input.
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyStopId);
        }
        Ok(StopId(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty() {
        assert_eq!(StopId::new(""), Err(DomainError::EmptyStopId));
        assert_eq!(StopId::new("   "), Err(DomainError::EmptyStopId));
    }

    #[test]
    fn trims_whitespace() {
        let id = StopId::new(" 1132 ").unwrap();
        assert_eq!(id.as_str(), "1132");
    }

    #[test]
    fn serde_transparent() {
        let id = StopId::new("472").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"472\"");
        let back: StopId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
