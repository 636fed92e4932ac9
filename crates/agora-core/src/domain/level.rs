use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A validated privilege tier in `0..=9`.
///
/// Raw levels come from storage and request bodies as plain integers; they
/// must pass through [`Level::new`] before any permission decision is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub struct Level(u8);

impl Level {
    pub const MIN: Level = Level(0);
    pub const MAX: Level = Level(9);

    /// Unverified accounts: read-only participants.
    pub const UNVERIFIED: Level = Level(0);
    /// First verified tier, granted by a verifier's approval.
    pub const VERIFIED: Level = Level(1);
    /// The dedicated verifier tier.
    pub const VERIFIER: Level = Level(5);

    pub fn new(raw: i16) -> Result<Self, DomainError> {
        if (0..=9).contains(&raw) {
            Ok(Level(raw as u8))
        } else {
            Err(DomainError::InvalidLevel(raw))
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// Every valid level in ascending order.
    pub fn all() -> impl Iterator<Item = Level> {
        (0..=9u8).map(Level)
    }
}

impl TryFrom<i16> for Level {
    type Error = DomainError;

    fn try_from(raw: i16) -> Result<Self, Self::Error> {
        Level::new(raw)
    }
}

impl From<Level> for i16 {
    fn from(level: Level) -> Self {
        level.0 as i16
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_full_range() {
        for raw in 0..=9 {
            assert_eq!(Level::new(raw).unwrap().value() as i16, raw);
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(Level::new(-1), Err(DomainError::InvalidLevel(-1))));
        assert!(matches!(Level::new(10), Err(DomainError::InvalidLevel(10))));
    }

    #[test]
    fn test_deserialize_validates() {
        let level: Level = serde_json::from_str("7").unwrap();
        assert_eq!(level.value(), 7);
        assert!(serde_json::from_str::<Level>("12").is_err());
    }
}
