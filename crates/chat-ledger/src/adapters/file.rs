//! File-backed key-value store.
//!
//! Persists the whole ledger to one binary file. Each batch is applied in
//! memory, written to a temp file, fsynced and renamed over the ledger file,
//! and the directory is fsynced after the rename. If any step of the save fails, the in-memory changes are undone, so the
//! batch has no effect at all.
//!
//! An exclusive `fs2` lock on `<path>.lock` keeps a second process from
//! opening the same ledger.

use crate::adapters::memory::scan_prefix;
use crate::errors::StoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore, ScanResult};
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File-backed key-value store.
pub struct FileBackedKVStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
    path: PathBuf,
    // Held for the lifetime of the store; the OS lock is released on drop.
    _lock: File,
}

impl FileBackedKVStore {
    /// Opens (or creates) the store at `path`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Locked`] if another process holds the ledger.
    /// - [`StoreError::Corruption`] if the file cannot be parsed.
    /// - [`StoreError::Io`] on filesystem failures.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_error)?;
            }
        }

        let lock_path = path.with_extension("lock");
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(io_error)?;
        lock.try_lock_exclusive().map_err(|_| StoreError::Locked {
            path: lock_path.display().to_string(),
        })?;

        let data = Self::load_from_file(&path)?;
        if data.is_empty() {
            info!(path = %path.display(), "Opened empty ledger store");
        } else {
            info!(path = %path.display(), keys = data.len(), "Loaded ledger store");
        }

        Ok(Self {
            data,
            path,
            _lock: lock,
        })
    }

    /// Path of the ledger file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the ledger file.
    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn load_from_file(path: &Path) -> Result<BTreeMap<Vec<u8>, Vec<u8>>, StoreError> {
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(io_error(e)),
        };
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(io_error)?;

        // Format: [key_len:u32 LE][key][value_len:u32 LE][value]...
        let mut data = BTreeMap::new();
        let mut cursor = 0usize;
        while cursor < bytes.len() {
            let key = read_chunk(&bytes, &mut cursor)?;
            let value = read_chunk(&bytes, &mut cursor)?;
            data.insert(key, value);
        }
        Ok(data)
    }

    fn save_to_file(&self) -> Result<(), StoreError> {
        let mut bytes = Vec::new();
        for (key, value) in &self.data {
            write_chunk(&mut bytes, key)?;
            write_chunk(&mut bytes, value)?;
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = File::create(&temp_path).map_err(io_error)?;
        file.write_all(&bytes).map_err(io_error)?;
        file.sync_all().map_err(io_error)?;
        std::fs::rename(&temp_path, &self.path).map_err(io_error)?;
        sync_dir(self.parent_dir())?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "Ledger store saved");
        Ok(())
    }
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, StoreError> {
        Ok(self.data.contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, StoreError> {
        Ok(scan_prefix(&self.data, prefix))
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), StoreError> {
        let mut undo = Vec::with_capacity(operations.len());
        for op in operations {
            let previous = self.data.insert(op.key.clone(), op.value);
            undo.push((op.key, previous));
        }

        if let Err(err) = self.save_to_file() {
            // Reverse order so a key written twice ends at its original value
            for (key, previous) in undo.into_iter().rev() {
                match previous {
                    Some(value) => {
                        self.data.insert(key, value);
                    }
                    None => {
                        self.data.remove(&key);
                    }
                }
            }
            return Err(err);
        }
        Ok(())
    }
}

fn io_error(e: std::io::Error) -> StoreError {
    StoreError::Io {
        message: e.to_string(),
    }
}

/// Flushes a directory entry so a completed rename survives power loss.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<(), StoreError> {
    File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(io_error)
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<(), StoreError> {
    Ok(())
}

fn read_chunk(bytes: &[u8], cursor: &mut usize) -> Result<Vec<u8>, StoreError> {
    let corrupt = |what: &str| StoreError::Corruption {
        message: format!("truncated {what} at offset {cursor}"),
    };
    let len_end = cursor.checked_add(4).ok_or_else(|| corrupt("length"))?;
    let len_bytes: [u8; 4] = bytes
        .get(*cursor..len_end)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| corrupt("length"))?;
    let len = u32::from_le_bytes(len_bytes) as usize;
    let end = len_end.checked_add(len).ok_or_else(|| corrupt("chunk"))?;
    let chunk = bytes.get(len_end..end).ok_or_else(|| corrupt("chunk"))?;
    *cursor = end;
    Ok(chunk.to_vec())
}

fn write_chunk(out: &mut Vec<u8>, chunk: &[u8]) -> Result<(), StoreError> {
    let len = u32::try_from(chunk.len()).map_err(|_| StoreError::Io {
        message: format!("record of {} bytes exceeds format limit", chunk.len()),
    })?;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(chunk);
    Ok(())
}
