//! Heap file: a named sequence of slotted pages.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use log::debug;

use super::error::HeapError;
use super::page::{BlockId, SlottedPage, BLOCK_SZ};
use crate::datum::Identifier;
use crate::store::{OpenMode, RecordStore};

/// A named on-disk file whose records are BLOCK_SZ-sized pages addressed
/// by 1-based block id.
///
/// The file lives at `<env>/<name>.db`. A heap file is created once (with
/// one empty page, so the file is never empty) and destroyed by removing
/// the backing store file; in between, an open/close pair gates usability.
/// Once dropped, the backing file is gone and the heap file can never be
/// reopened.
#[derive(Debug)]
pub struct HeapFile<S: RecordStore> {
    name: Identifier,
    path: PathBuf,
    last: BlockId,
    store: Option<S>,
}

impl<S: RecordStore> HeapFile<S> {
    /// Creates a handle for the file `<env>/<name>.db` without touching disk.
    pub fn new(env: &Path, name: &str) -> Self {
        Self {
            name: name.to_string(),
            path: env.join(format!("{}.db", name)),
            last: 0,
            store: None,
        }
    }

    /// Returns the file's table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates the physical file and allocates the first empty page.
    ///
    /// # Errors
    ///
    /// Fails with a store error if the file already exists.
    pub fn create(&mut self) -> Result<(), HeapError> {
        self.store = Some(S::open(&self.path, OpenMode::CreateExclusive, BLOCK_SZ)?);
        self.last = 0;
        self.get_new()?;
        debug!("created heap file {}", self.path.display());
        Ok(())
    }

    /// Closes and removes the physical file. The heap file is permanently
    /// unusable afterwards.
    pub fn drop(&mut self) -> Result<(), HeapError> {
        self.close()?;
        S::remove(&self.path)?;
        debug!("dropped heap file {}", self.path.display());
        Ok(())
    }

    /// Opens the physical file; a no-op when already open.
    ///
    /// The page count is recovered from the store's record statistic.
    pub fn open(&mut self) -> Result<(), HeapError> {
        if self.store.is_some() {
            return Ok(());
        }
        let store = S::open(&self.path, OpenMode::Open, BLOCK_SZ)?;
        self.last = store.record_count()?;
        self.store = Some(store);
        Ok(())
    }

    /// Flushes and closes the physical file.
    pub fn close(&mut self) -> Result<(), HeapError> {
        if let Some(mut store) = self.store.take() {
            store.sync()?;
        }
        Ok(())
    }

    /// Allocates a new empty page at block id `last + 1`.
    pub fn get_new(&mut self) -> Result<SlottedPage, HeapError> {
        self.last += 1;
        let page = SlottedPage::new(vec![0u8; BLOCK_SZ], self.last, true);
        self.store_mut()?.put(page.block_id(), page.block())?;
        Ok(page)
    }

    /// Fetches the page under `block_id`.
    pub fn get(&self, block_id: BlockId) -> Result<SlottedPage, HeapError> {
        let mut block = vec![0u8; BLOCK_SZ];
        self.store()?.get(block_id, &mut block)?;
        Ok(SlottedPage::new(block, block_id, false))
    }

    /// Writes a page back under its block id.
    pub fn put(&mut self, page: &SlottedPage) -> Result<(), HeapError> {
        self.store_mut()?.put(page.block_id(), page.block())?;
        Ok(())
    }

    /// Returns all block ids, in ascending order.
    pub fn block_ids(&self) -> RangeInclusive<BlockId> {
        1..=self.last
    }

    /// Returns the id of the last allocated block.
    pub fn get_last_block_id(&self) -> BlockId {
        self.last
    }

    fn store(&self) -> Result<&S, HeapError> {
        self.store
            .as_ref()
            .ok_or_else(|| HeapError::Closed(self.name.clone()))
    }

    fn store_mut(&mut self) -> Result<&mut S, HeapError> {
        self.store
            .as_mut()
            .ok_or_else(|| HeapError::Closed(self.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::store::MemoryStore;

    fn env(name: &str) -> PathBuf {
        PathBuf::from(format!("/mem/heap_file/{}", name))
    }

    #[test]
    fn test_create_allocates_first_page() {
        let mut file: HeapFile<MemoryStore> = HeapFile::new(&env("create"), "t");
        file.create().unwrap();

        assert_eq!(file.get_last_block_id(), 1);
        let page = file.get(1).unwrap();
        assert_eq!(page.num_records(), 0);
        file.drop().unwrap();
    }

    #[test]
    fn test_create_twice_fails() {
        let mut file: HeapFile<MemoryStore> = HeapFile::new(&env("twice"), "t");
        file.create().unwrap();
        let mut dup: HeapFile<MemoryStore> = HeapFile::new(&env("twice"), "t");
        assert!(dup.create().is_err());
        file.drop().unwrap();
    }

    #[test]
    fn test_page_roundtrip() {
        let mut file: HeapFile<MemoryStore> = HeapFile::new(&env("roundtrip"), "t");
        file.create().unwrap();

        let mut page = file.get(1).unwrap();
        let id = page.add(b"payload").unwrap();
        file.put(&page).unwrap();

        let page = file.get(1).unwrap();
        assert_eq!(page.get(id), Some(b"payload".to_vec()));
        file.drop().unwrap();
    }

    #[test]
    fn test_last_recovered_on_open() {
        let mut file: HeapFile<MemoryStore> = HeapFile::new(&env("reopen"), "t");
        file.create().unwrap();
        file.get_new().unwrap();
        file.get_new().unwrap();
        assert_eq!(file.get_last_block_id(), 3);
        file.close().unwrap();

        let mut file: HeapFile<MemoryStore> = HeapFile::new(&env("reopen"), "t");
        file.open().unwrap();
        assert_eq!(file.get_last_block_id(), 3);
        assert_eq!(file.block_ids().collect::<Vec<_>>(), vec![1, 2, 3]);
        file.drop().unwrap();
    }

    #[test]
    fn test_open_is_idempotent() {
        let mut file: HeapFile<MemoryStore> = HeapFile::new(&env("idem"), "t");
        file.create().unwrap();
        file.open().unwrap();
        file.open().unwrap();
        file.drop().unwrap();
    }

    #[test]
    fn test_closed_file_is_unusable() {
        let mut file: HeapFile<MemoryStore> = HeapFile::new(&env("closed"), "t");
        file.create().unwrap();
        file.close().unwrap();
        assert!(matches!(file.get(1), Err(HeapError::Closed(_))));
        file.open().unwrap();
        file.drop().unwrap();
    }

    #[test]
    fn test_dropped_file_cannot_reopen() {
        let mut file: HeapFile<MemoryStore> = HeapFile::new(&env("dropped"), "t");
        file.create().unwrap();
        file.drop().unwrap();
        assert!(file.open().is_err());
    }
}
