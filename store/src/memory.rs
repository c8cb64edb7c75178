use std::sync::RwLock;

use voicegate_features::VoicePrint;

use crate::{StoreResult, VoicePrintStore};

/// In-memory [`VoicePrintStore`] implementation.
/// The record is lost on restart. Suitable for testing or ephemeral use.
pub struct MemoryStore {
    inner: RwLock<Option<VoicePrint>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VoicePrintStore for MemoryStore {
    fn get(&self) -> StoreResult<Option<VoicePrint>> {
        Ok(self.inner.read().unwrap().clone())
    }

    fn put(&self, print: &VoicePrint) -> StoreResult<()> {
        // Whole-record swap under the write lock: readers never observe a
        // partially updated print.
        *self.inner.write().unwrap() = Some(print.clone());
        Ok(())
    }

    fn delete(&self) -> StoreResult<()> {
        *self.inner.write().unwrap() = None;
        Ok(())
    }
}
