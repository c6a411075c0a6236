use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;

/// Identifier of a portfolio document.
///
/// Opaque to callers: they hand it around as a string and it is only
/// ever turned back into a `PortfolioId` through [`PortfolioId::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortfolioId(Uuid);

impl PortfolioId {
    /// Generate a fresh, globally unique identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier received from the outside.
    /// Fails with `CoreError::InvalidPortfolioId` on anything that is not a UUID.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| CoreError::InvalidPortfolioId(value.to_string()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PortfolioId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PortfolioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl std::str::FromStr for PortfolioId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for PortfolioId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}
