//! File-backed box store.
//!
//! [`JsonBoxStore`] keeps boxes in memory and writes a JSON snapshot of
//! hex-encoded names and values after every mutation. A snapshot is written
//! to a temporary file and renamed into place, so readers never observe a
//! half-written file. If the snapshot fails, the in-memory change is undone
//! and the error is returned, leaving the store as it was.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::store::BoxStore;

/// On-disk snapshot layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    /// Hex box name to hex box value.
    boxes: BTreeMap<String, String>,
}

/// Box store persisted as a JSON snapshot file.
#[derive(Debug)]
pub struct JsonBoxStore {
    path: PathBuf,
    boxes: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl JsonBoxStore {
    /// Opens the snapshot at `path`, starting empty if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or decoded.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let boxes = if path.exists() {
            read_snapshot(&path)?
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), count = boxes.len(), "opened box store");
        Ok(Self { path, boxes })
    }

    /// Path of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of boxes held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Returns true if no boxes are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    fn snapshot(&self) -> Result<(), StoreError> {
        let snapshot = Snapshot {
            boxes: self
                .boxes
                .iter()
                .map(|(k, v)| (hex::encode(k), hex::encode(v)))
                .collect(),
        };
        let json = serde_json::to_vec_pretty(&snapshot)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.temp_path();
        let written = fs::File::create(&tmp).and_then(|mut file| {
            file.write_all(&json)?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|()| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    /// Sibling of the snapshot file with `.tmp` appended to its name.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(|| OsString::from("boxes"), ToOwned::to_owned);
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Reads and decodes a snapshot file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid JSON, or holds
/// non-hex names or values.
pub fn read_snapshot(path: &Path) -> Result<BTreeMap<Vec<u8>, Vec<u8>>, StoreError> {
    let raw = fs::read(path)?;
    let snapshot: Snapshot = serde_json::from_slice(&raw)?;
    snapshot
        .boxes
        .into_iter()
        .map(|(k, v)| -> Result<(Vec<u8>, Vec<u8>), StoreError> {
            let name = hex::decode(&k)
                .map_err(|e| StoreError::Corrupt(format!("box name {k}: {e}")))?;
            let value = hex::decode(&v)
                .map_err(|e| StoreError::Corrupt(format!("box value for {k}: {e}")))?;
            Ok((name, value))
        })
        .collect()
}

impl BoxStore for JsonBoxStore {
    fn get(&self, name: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.boxes.get(name).cloned())
    }

    fn put(&mut self, name: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let previous = self.boxes.insert(name.to_vec(), value.to_vec());
        if let Err(e) = self.snapshot() {
            warn!(error = %e, path = %self.path.display(), "failed to snapshot box store");
            match previous {
                Some(old) => self.boxes.insert(name.to_vec(), old),
                None => self.boxes.remove(name),
            };
            return Err(e);
        }
        Ok(())
    }

    fn delete(&mut self, name: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let Some(previous) = self.boxes.remove(name) else {
            return Ok(None);
        };
        if let Err(e) = self.snapshot() {
            warn!(error = %e, path = %self.path.display(), "failed to snapshot box store");
            self.boxes.insert(name.to_vec(), previous);
            return Err(e);
        }
        Ok(Some(previous))
    }

    fn entries(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        Ok(self
            .boxes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn contains(&self, name: &[u8]) -> Result<bool, StoreError> {
        Ok(self.boxes.contains_key(name))
    }
}
