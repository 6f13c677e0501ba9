//! On-disk storage backend
//!
//! One file per key under a base directory; the filename is the hex
//! encoding of the key, so arbitrary key bytes map to valid filenames.
//! 256 striped locks (selected by XOR-folding the key) serialize
//! access to a key without a global lock.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use parking_lot::RwLock;

use super::Storage;
use crate::error::StorageError;

/// File-per-key storage
pub struct DiskStorage {
    base_dir: PathBuf,
    locks: Vec<RwLock<()>>,
}

impl DiskStorage {
    /// Open a store rooted at `base_dir`, creating the directory if
    /// needed
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;

        let locks = (0..256).map(|_| RwLock::new(())).collect();

        Ok(Self { base_dir, locks })
    }

    /// Keys sharing a stripe contend; keys in different stripes don't.
    fn stripe(key: &[u8]) -> usize {
        key.iter().fold(0u8, |acc, b| acc ^ b) as usize
    }

    fn path_for(&self, key: &[u8]) -> PathBuf {
        let name: String = key.iter().map(|b| format!("{:02x}", b)).collect();
        self.base_dir.join(name)
    }
}

impl Storage for DiskStorage {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        let _guard = self.locks[Self::stripe(key)].write();

        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let _guard = self.locks[Self::stripe(key)].read();

        match fs::read(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
