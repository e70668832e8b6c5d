//! Record-oriented block store backends.
//!
//! This module defines the [`RecordStore`] trait (the contract of the
//! external block store the heap layer is built on) along with a
//! disk-backed implementation and an in-process implementation for tests.
//! A store holds fixed-length records addressed by 1-based dense integer
//! keys; the heap layer stores one page per record.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::path::Path;

/// How to open a record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Open an existing store; fail if it does not exist.
    Open,
    /// Create a new store; fail if it already exists.
    CreateExclusive,
    /// Open, discarding any existing records.
    Truncate,
}

/// Store layer errors.
#[derive(Debug)]
pub enum StoreError {
    /// No record under the given key.
    RecordNotFound(u32),
    /// Record buffer does not match the store's record length.
    InvalidRecordSize {
        /// Record length the store was opened with.
        expected: usize,
        /// Buffer size provided.
        actual: usize,
    },
    /// Keys are dense: `put` may extend the store by exactly one record.
    NonContiguousKey {
        /// Key provided.
        key: u32,
        /// Number of records currently in the store.
        count: u32,
    },
    /// The store file already exists (create-exclusive).
    AlreadyExists(String),
    /// The store file does not exist (open/remove).
    NotFound(String),
    /// I/O error from the underlying file system.
    Io(std::io::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::RecordNotFound(key) => write!(f, "no record under key {}", key),
            StoreError::InvalidRecordSize { expected, actual } => {
                write!(f, "invalid record size: expected {}, got {}", expected, actual)
            }
            StoreError::NonContiguousKey { key, count } => {
                write!(f, "key {} would leave a gap ({} records in store)", key, count)
            }
            StoreError::AlreadyExists(path) => write!(f, "store already exists: {}", path),
            StoreError::NotFound(path) => write!(f, "store not found: {}", path),
            StoreError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

/// A file of fixed-length records keyed by 1-based dense integers.
///
/// This is the externally-provided block-store contract: the heap layer
/// consumes it and never looks behind it. Implementations:
/// - [`FileStore`]: one record per `record_len` byte stripe of a real file
/// - [`MemoryStore`]: process-local, path-keyed, for tests
///
/// Keys stay dense: `put` either overwrites an existing key or appends at
/// `record_count() + 1`. Closing a store is dropping the value; [`sync`]
/// makes writes durable before that.
///
/// [`sync`]: RecordStore::sync
pub trait RecordStore: Sized + Send {
    /// Opens or creates the store at `path` with the given record length.
    fn open(path: &Path, mode: OpenMode, record_len: usize) -> Result<Self, StoreError>;

    /// Reads the record under `key` into `buf`.
    ///
    /// # Errors
    ///
    /// Fails with `RecordNotFound` for keys past the end and
    /// `InvalidRecordSize` if `buf.len() != record_len`.
    fn get(&self, key: u32, buf: &mut [u8]) -> Result<(), StoreError>;

    /// Writes `buf` as the record under `key`.
    ///
    /// `key == record_count() + 1` appends; smaller keys overwrite.
    ///
    /// # Errors
    ///
    /// Fails with `NonContiguousKey` if the key would leave a gap and
    /// `InvalidRecordSize` if `buf.len() != record_len`.
    fn put(&mut self, key: u32, buf: &[u8]) -> Result<(), StoreError>;

    /// Returns the number of records in the store.
    fn record_count(&self) -> Result<u32, StoreError>;

    /// Flushes pending writes to the backing medium.
    fn sync(&mut self) -> Result<(), StoreError>;

    /// Removes the store at `path` entirely.
    fn remove(path: &Path) -> Result<(), StoreError>;
}
