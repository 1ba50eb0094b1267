//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Normalized asset serial number.
///
/// The only way to build one is through [`SerialNumber::parse`], which trims
/// surrounding whitespace and uppercases. An empty result is rejected, so every
/// value of this type is a valid, comparable key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SerialNumber(String);

impl SerialNumber {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(DomainError::validation("serial_number cannot be blank"));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SerialNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for SerialNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SerialNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

// Deserialization goes through `parse` so a stored key can never skip normalization.
impl<'de> Deserialize<'de> for SerialNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Store-assigned event identifier.
///
/// Globally unique and monotonically increasing in insertion order; breaks ties
/// between events recorded on the same calendar date.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(u64);

impl EventId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for EventId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for EventId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<EventId> for u64 {
    fn from(value: EventId) -> Self {
        value.0
    }
}

impl FromStr for EventId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = u64::from_str(s.trim())
            .map_err(|e| DomainError::validation(format!("EventId: {e}")))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn variants_of_one_serial_share_a_key() {
        let a = SerialNumber::parse(" ab12 ").unwrap();
        let b = SerialNumber::parse("AB12").unwrap();
        let c = SerialNumber::parse("ab12").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.as_str(), "AB12");
    }

    #[test]
    fn blank_serial_is_rejected() {
        for raw in ["", "   ", "\t\n"] {
            match SerialNumber::parse(raw) {
                Err(DomainError::Validation(_)) => {}
                other => panic!("expected validation error for {raw:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn deserialize_normalizes() {
        let serial: SerialNumber = serde_json::from_str("\" pc-42 \"").unwrap();
        assert_eq!(serial.as_str(), "PC-42");
        assert!(serde_json::from_str::<SerialNumber>("\"  \"").is_err());
    }

    #[test]
    fn event_id_parses_and_orders() {
        let a: EventId = "1".parse().unwrap();
        let b = EventId::new(2);
        assert!(a < b);
        assert!("x".parse::<EventId>().is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: normalizing an already-normalized serial is a no-op.
        #[test]
        fn normalization_is_idempotent(raw in "[ \t]{0,3}[a-zA-Z0-9-]{1,16}[ \t]{0,3}") {
            let once = SerialNumber::parse(&raw).unwrap();
            let twice = SerialNumber::parse(once.as_str()).unwrap();
            prop_assert_eq!(&once, &twice);
            prop_assert_eq!(once.as_str(), raw.trim().to_uppercase());
        }
    }
}
