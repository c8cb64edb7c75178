use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use voicegate_features::VoicePrint;

use crate::{StoreError, StoreResult, VoicePrintStore};

/// File-backed [`VoicePrintStore`] holding one JSON document.
///
/// The path plays the role of the fixed identity key: whatever print is at
/// that path is the enrollment. Writes land in a temp file next to the
/// target and are renamed into place, so readers see either the old or the
/// new document in full. A missing file reads as "nothing enrolled".
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the persisted record.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VoicePrintStore for JsonFileStore {
    fn get(&self) -> StoreResult<Option<VoicePrint>> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let print = serde_json::from_slice(&data)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Some(print))
    }

    fn put(&self, print: &VoicePrint) -> StoreResult<()> {
        let data = serde_json::to_vec_pretty(print)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        // Write-then-rename keeps the replace atomic on the same filesystem.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &data)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn delete(&self) -> StoreResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
