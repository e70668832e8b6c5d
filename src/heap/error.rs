//! Error types for the heap module.

use std::fmt;

use super::page::RecordId;
use super::table::Handle;
use crate::datum::{Identifier, MarshalError};
use crate::store::StoreError;

/// Errors from pages and heap files.
#[derive(Debug)]
pub enum HeapError {
    /// Page cannot accommodate a record or a record's growth.
    NoRoom {
        /// Bytes required, slot header included.
        required: usize,
        /// Bytes available in free space.
        available: usize,
    },
    /// Record id is tombstoned or out of range.
    SlotNotFound(RecordId),
    /// Operation on a file that is not open.
    Closed(Identifier),
    /// Wrapped error from the backing record store.
    Store(StoreError),
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::NoRoom {
                required,
                available,
            } => {
                write!(
                    f,
                    "not enough room: need {} bytes, have {} available",
                    required, available
                )
            }
            HeapError::SlotNotFound(id) => write!(f, "record {} not found or deleted", id),
            HeapError::Closed(name) => write!(f, "heap file {} is not open", name),
            HeapError::Store(e) => write!(f, "backing store error: {}", e),
        }
    }
}

impl std::error::Error for HeapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HeapError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for HeapError {
    fn from(e: StoreError) -> Self {
        HeapError::Store(e)
    }
}

/// Errors from the tuple-oriented relation layer.
#[derive(Debug)]
pub enum RelationError {
    /// Insert is missing a column the schema requires.
    MissingColumn(Identifier),
    /// Projection asked for a column the schema does not have.
    UnknownColumn(Identifier),
    /// Marshaled row exceeds what a page can hold.
    RowTooBig {
        /// Marshaled size of the row.
        size: usize,
        /// Largest record a fresh page accepts.
        max: usize,
    },
    /// The handle no longer names a live record.
    RecordNotFound(Handle),
    /// Operation is not supported by this relation.
    NotImplemented(&'static str),
    /// Value could not be marshaled or unmarshaled.
    Marshal(MarshalError),
    /// Page or file level failure.
    Heap(HeapError),
}

impl fmt::Display for RelationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationError::MissingColumn(name) => {
                write!(f, "row is missing column {}", name)
            }
            RelationError::UnknownColumn(name) => {
                write!(f, "no column {} in schema", name)
            }
            RelationError::RowTooBig { size, max } => {
                write!(f, "marshaled row of {} bytes exceeds the {} byte page limit", size, max)
            }
            RelationError::RecordNotFound(handle) => {
                write!(f, "no record at {}", handle)
            }
            RelationError::NotImplemented(op) => write!(f, "{} is not implemented", op),
            RelationError::Marshal(e) => write!(f, "{}", e),
            RelationError::Heap(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RelationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RelationError::Marshal(e) => Some(e),
            RelationError::Heap(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MarshalError> for RelationError {
    fn from(e: MarshalError) -> Self {
        RelationError::Marshal(e)
    }
}

impl From<HeapError> for RelationError {
    fn from(e: HeapError) -> Self {
        RelationError::Heap(e)
    }
}

impl From<StoreError> for RelationError {
    fn from(e: StoreError) -> Self {
        RelationError::Heap(HeapError::Store(e))
    }
}
