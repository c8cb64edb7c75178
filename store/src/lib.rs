//! Persistence for the single enrolled voiceprint.
//!
//! Exactly one record exists for the one supported identity. It is created
//! or overwritten only by explicit enrollment, read on every
//! authentication attempt, and deleted only by explicit reset. The store
//! is injected into the authentication machine; there is no ambient
//! global holding the print.
//!
//! [`MemoryStore`] keeps the record in memory (testing/ephemeral);
//! [`JsonFileStore`] persists it as one JSON document on disk.

pub mod json;
pub mod memory;

use thiserror::Error;
use voicegate_features::VoicePrint;

/// Errors that can occur in voiceprint store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store: io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store: serialization error: {0}")]
    Serialization(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Owner of the enrolled voiceprint.
///
/// `put` is a whole-record atomic replace: concurrent readers observe
/// either the fully-old or the fully-new print, never a partial write.
/// Implementations must be safe for concurrent use.
pub trait VoicePrintStore: Send + Sync {
    /// Returns the enrolled print, or `None` when nothing is enrolled.
    fn get(&self) -> StoreResult<Option<VoicePrint>>;

    /// Replaces the enrolled print with `print`.
    fn put(&self, print: &VoicePrint) -> StoreResult<()>;

    /// Removes the enrolled print. Deleting an empty store is not an error.
    fn delete(&self) -> StoreResult<()>;
}

pub use json::JsonFileStore;
pub use memory::MemoryStore;
