use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MegaphoneError;

/// Every announcement the app knows how to show.
///
/// Adding a variant forces a branch in [`crate::factory::MegaphoneFactory::for_record`] and
/// an entry in [`crate::catalog::Catalog`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub enum Event {
    Reactions,
    PinsForAll,
}

impl Event {
    pub const ALL: [Event; 2] = [Event::Reactions, Event::PinsForAll];

    /// Stable key used by the persistence layer.
    pub fn key(self) -> &'static str {
        match self {
            Event::Reactions => "reactions",
            Event::PinsForAll => "pins_for_all",
        }
    }

    pub fn from_key(key: &str) -> Result<Self, MegaphoneError> {
        Self::ALL
            .into_iter()
            .find(|event| event.key() == key)
            .ok_or_else(|| MegaphoneError::UnknownKey(key.to_string()))
    }

    pub fn has_key(key: &str) -> bool {
        Self::ALL.iter().any(|event| event.key() == key)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Event {
    type Err = MegaphoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s)
    }
}

impl TryFrom<String> for Event {
    type Error = MegaphoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_key(&value)
    }
}

impl From<Event> for String {
    fn from(event: Event) -> Self {
        event.key().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_resolve_back_to_events() {
        for event in Event::ALL {
            assert!(Event::has_key(event.key()));
            assert_eq!(Event::from_key(event.key()).unwrap(), event);
        }
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(!Event::has_key("profile_names"));
        let err = Event::from_key("profile_names").unwrap_err();
        assert!(matches!(err, MegaphoneError::UnknownKey(ref key) if key == "profile_names"));
        assert_eq!(err.to_string(), "no megaphone event for key `profile_names`");
    }

    #[test]
    fn serializes_as_persistence_key() {
        let json = serde_json::to_string(&Event::PinsForAll).unwrap();
        assert_eq!(json, "\"pins_for_all\"");
        let parsed: Event = serde_json::from_str("\"reactions\"").unwrap();
        assert_eq!(parsed, Event::Reactions);
        assert!(serde_json::from_str::<Event>("\"retired\"").is_err());
    }
}
