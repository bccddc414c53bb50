use thiserror::Error;

use crate::event::Event;

#[derive(Debug, Error)]
pub enum MegaphoneError {
    /// Persisted data references an event that no longer exists.
    #[error("no megaphone event for key `{0}`")]
    UnknownKey(String),
    /// The history snapshot is out of sync with the catalog.
    #[error("no display record for cataloged megaphone `{0}`")]
    MissingRecord(Event),
    #[error("megaphone `{0}` is missing from the catalog")]
    Uncataloged(Event),
    #[error("megaphone `{0}` is cataloged more than once")]
    DuplicateEntry(Event),
    #[error("record for `{found}` stored under `{expected}`")]
    EventMismatch { expected: Event, found: Event },
    #[error("malformed history snapshot: {0}")]
    InvalidSnapshot(#[from] serde_json::Error),
}
