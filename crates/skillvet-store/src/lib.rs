//! skillvet-store — the persistence boundary.
//!
//! Sessions cross this boundary as flat snapshot records keyed by session
//! id. A failure here is surfaced to the caller and never rolls back
//! in-memory session state; only durability is affected.

use thiserror::Error;

pub mod json;
pub mod snapshot;

pub use json::JsonSessionStore;
pub use snapshot::{
    AnalyticsRecord, QuestionRecord, ResponseRecord, SessionHeader, SessionSnapshot,
};

/// Errors crossing the persistence boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no stored session with id {0}")]
    NotFound(String),

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot (de)serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Store for session snapshots, keyed by session id.
pub trait SessionStore: Send + Sync {
    fn save(&self, snapshot: &SessionSnapshot) -> Result<(), StoreError>;
    fn load(&self, session_id: &str) -> Result<SessionSnapshot, StoreError>;
    fn list(&self) -> Result<Vec<String>, StoreError>;
}
