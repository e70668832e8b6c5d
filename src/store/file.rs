//! Disk-backed record store.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::debug;

use super::{OpenMode, RecordStore, StoreError};

/// Record store over a single file: record `k` occupies the byte stripe
/// `[(k-1)*record_len, k*record_len)`.
pub struct FileStore {
    file: File,
    path: PathBuf,
    record_len: usize,
}

impl FileStore {
    fn check_len(&self, buf: &[u8]) -> Result<(), StoreError> {
        if buf.len() != self.record_len {
            return Err(StoreError::InvalidRecordSize {
                expected: self.record_len,
                actual: buf.len(),
            });
        }
        Ok(())
    }

    fn offset(&self, key: u32) -> u64 {
        (key as u64 - 1) * self.record_len as u64
    }
}

impl RecordStore for FileStore {
    fn open(path: &Path, mode: OpenMode, record_len: usize) -> Result<Self, StoreError> {
        let mut options = OpenOptions::new();
        options.read(true).write(true);
        match mode {
            OpenMode::Open => {}
            OpenMode::CreateExclusive => {
                options.create_new(true);
            }
            OpenMode::Truncate => {
                options.create(true).truncate(true);
            }
        }
        let file = options.open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(path.display().to_string()),
            std::io::ErrorKind::AlreadyExists => {
                StoreError::AlreadyExists(path.display().to_string())
            }
            _ => StoreError::Io(e),
        })?;
        debug!("opened store {} ({:?})", path.display(), mode);
        Ok(Self {
            file,
            path: path.to_path_buf(),
            record_len,
        })
    }

    fn get(&self, key: u32, buf: &mut [u8]) -> Result<(), StoreError> {
        self.check_len(buf)?;
        if key == 0 || key > self.record_count()? {
            return Err(StoreError::RecordNotFound(key));
        }
        let mut file = &self.file;
        file.seek(SeekFrom::Start(self.offset(key)))?;
        file.read_exact(buf)?;
        Ok(())
    }

    fn put(&mut self, key: u32, buf: &[u8]) -> Result<(), StoreError> {
        self.check_len(buf)?;
        let count = self.record_count()?;
        if key == 0 || key > count + 1 {
            return Err(StoreError::NonContiguousKey { key, count });
        }
        self.file.seek(SeekFrom::Start(self.offset(key)))?;
        self.file.write_all(buf)?;
        Ok(())
    }

    fn record_count(&self) -> Result<u32, StoreError> {
        let len = self.file.metadata()?.len();
        Ok((len / self.record_len as u64) as u32)
    }

    fn sync(&mut self) -> Result<(), StoreError> {
        self.file.sync_all()?;
        Ok(())
    }

    fn remove(path: &Path) -> Result<(), StoreError> {
        std::fs::remove_file(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(path.display().to_string()),
            _ => StoreError::Io(e),
        })?;
        debug!("removed store {}", path.display());
        Ok(())
    }
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("path", &self.path)
            .field("record_len", &self.record_len)
            .finish()
    }
}
