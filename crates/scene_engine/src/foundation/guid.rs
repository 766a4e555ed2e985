//! Globally unique identifiers used to cross-reference objects in scene descriptions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Globally unique identifier for scenes and game objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guid(Uuid);

impl Guid {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The all-zero identifier
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Parse an identifier from its hyphenated (or simple) text form
    pub fn parse(text: &str) -> Option<Self> {
        Uuid::parse_str(text.trim()).ok().map(Self)
    }

    /// Whether this is the all-zero identifier
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// Access the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for Guid {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for Guid {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for Guid {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let text = "6f1c2a8e-3b4d-4c5e-9f60-718293a4b5c6";
        let guid = Guid::parse(text).expect("valid guid");
        assert_eq!(guid.to_string(), text);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Guid::parse("not-a-guid").is_none());
        assert!("1234".parse::<Guid>().is_err());
    }

    #[test]
    fn test_new_guids_are_unique() {
        assert_ne!(Guid::new(), Guid::new());
        assert!(Guid::nil().is_nil());
    }
}
