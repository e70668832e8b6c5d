//! In-process record store for tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use super::{OpenMode, RecordStore, StoreError};

struct MemFile {
    records: Vec<Vec<u8>>,
    record_len: usize,
}

/// Process-wide registry so memory stores behave like files: create
/// exclusively, reopen by path, remove.
fn registry() -> &'static Mutex<HashMap<PathBuf, Arc<Mutex<MemFile>>>> {
    static REGISTRY: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<MemFile>>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Path-keyed in-memory record store.
///
/// Mirrors [`FileStore`](super::FileStore) semantics without touching the
/// file system, so unit tests need no fixtures. Contents survive as long
/// as the process does (or until [`RecordStore::remove`]).
pub struct MemoryStore {
    data: Arc<Mutex<MemFile>>,
    record_len: usize,
}

impl MemoryStore {
    fn check_len(&self, buf: &[u8]) -> Result<(), StoreError> {
        if buf.len() != self.record_len {
            return Err(StoreError::InvalidRecordSize {
                expected: self.record_len,
                actual: buf.len(),
            });
        }
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    fn open(path: &Path, mode: OpenMode, record_len: usize) -> Result<Self, StoreError> {
        let mut files = registry().lock();
        let data = match mode {
            OpenMode::Open => {
                let data = files
                    .get(path)
                    .cloned()
                    .ok_or_else(|| StoreError::NotFound(path.display().to_string()))?;
                let stored_len = data.lock().record_len;
                if stored_len != record_len {
                    return Err(StoreError::InvalidRecordSize {
                        expected: stored_len,
                        actual: record_len,
                    });
                }
                data
            }
            OpenMode::CreateExclusive => {
                if files.contains_key(path) {
                    return Err(StoreError::AlreadyExists(path.display().to_string()));
                }
                let data = Arc::new(Mutex::new(MemFile {
                    records: Vec::new(),
                    record_len,
                }));
                files.insert(path.to_path_buf(), data.clone());
                data
            }
            OpenMode::Truncate => {
                let data = Arc::new(Mutex::new(MemFile {
                    records: Vec::new(),
                    record_len,
                }));
                files.insert(path.to_path_buf(), data.clone());
                data
            }
        };
        Ok(Self { data, record_len })
    }

    fn get(&self, key: u32, buf: &mut [u8]) -> Result<(), StoreError> {
        self.check_len(buf)?;
        let file = self.data.lock();
        let record = file
            .records
            .get(key.wrapping_sub(1) as usize)
            .ok_or(StoreError::RecordNotFound(key))?;
        buf.copy_from_slice(record);
        Ok(())
    }

    fn put(&mut self, key: u32, buf: &[u8]) -> Result<(), StoreError> {
        self.check_len(buf)?;
        let mut file = self.data.lock();
        let count = file.records.len() as u32;
        if key == 0 || key > count + 1 {
            return Err(StoreError::NonContiguousKey { key, count });
        }
        if key == count + 1 {
            file.records.push(buf.to_vec());
        } else {
            file.records[(key - 1) as usize].copy_from_slice(buf);
        }
        Ok(())
    }

    fn record_count(&self) -> Result<u32, StoreError> {
        Ok(self.data.lock().records.len() as u32)
    }

    fn sync(&mut self) -> Result<(), StoreError> {
        Ok(())
    }

    fn remove(path: &Path) -> Result<(), StoreError> {
        registry()
            .lock()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(path.display().to_string()))
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("record_len", &self.record_len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEN: usize = 16;

    fn unique_path(name: &str) -> PathBuf {
        PathBuf::from(format!("/mem/{}/{}", module_path!(), name))
    }

    #[test]
    fn test_exclusive_create_and_reopen() {
        let path = unique_path("create.db");
        let store = MemoryStore::open(&path, OpenMode::CreateExclusive, LEN).unwrap();
        drop(store);

        assert!(matches!(
            MemoryStore::open(&path, OpenMode::CreateExclusive, LEN),
            Err(StoreError::AlreadyExists(_))
        ));
        MemoryStore::open(&path, OpenMode::Open, LEN).unwrap();
        MemoryStore::remove(&path).unwrap();
    }

    #[test]
    fn test_contents_shared_across_handles() {
        let path = unique_path("shared.db");
        let mut writer = MemoryStore::open(&path, OpenMode::CreateExclusive, LEN).unwrap();
        writer.put(1, &[5u8; LEN]).unwrap();

        let reader = MemoryStore::open(&path, OpenMode::Open, LEN).unwrap();
        let mut buf = [0u8; LEN];
        reader.get(1, &mut buf).unwrap();
        assert_eq!(buf, [5u8; LEN]);
        MemoryStore::remove(&path).unwrap();
    }

    #[test]
    fn test_remove_forgets_contents() {
        let path = unique_path("remove.db");
        let mut store = MemoryStore::open(&path, OpenMode::CreateExclusive, LEN).unwrap();
        store.put(1, &[1u8; LEN]).unwrap();
        drop(store);

        MemoryStore::remove(&path).unwrap();
        assert!(matches!(
            MemoryStore::open(&path, OpenMode::Open, LEN),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_dense_keys() {
        let path = unique_path("dense.db");
        let mut store = MemoryStore::open(&path, OpenMode::CreateExclusive, LEN).unwrap();
        assert!(matches!(
            store.put(2, &[0u8; LEN]),
            Err(StoreError::NonContiguousKey { key: 2, count: 0 })
        ));
        store.put(1, &[1u8; LEN]).unwrap();
        store.put(2, &[2u8; LEN]).unwrap();
        assert_eq!(store.record_count().unwrap(), 2);
        MemoryStore::remove(&path).unwrap();
    }
}
