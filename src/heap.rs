//! Heap-file storage engine.
//!
//! This module stores table rows in slotted pages persisted as fixed-length
//! records of a [`RecordStore`](crate::store::RecordStore). The term "heap"
//! refers to an unordered collection of records, as opposed to indexed
//! structures like B-trees.
//!
//! - [`SlottedPage`]: page-level record storage with stable 1-based ids
//! - [`HeapFile`]: a named sequence of pages addressed by block id
//! - [`HeapTable`]: a row-oriented relation layered on one heap file

mod error;
mod file;
mod page;
mod table;

pub use error::{HeapError, RelationError};
pub use file::HeapFile;
pub use page::{BlockId, RecordId, SlottedPage, BLOCK_SZ, MAX_RECORD_SZ, SLOT_SZ};
pub use table::{Handle, HeapTable};
