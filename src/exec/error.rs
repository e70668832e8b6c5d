//! Executor-level errors.

use std::fmt;

use crate::catalog::CatalogError;
use crate::heap::RelationError;

/// Errors surfaced by statement execution.
#[derive(Debug)]
pub enum ExecError {
    /// Column declaration used a type the engine cannot store.
    UnknownType(String),
    /// Catalog consistency violation or lookup failure.
    Catalog(CatalogError),
    /// Failure in an underlying relation.
    Relation(RelationError),
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::UnknownType(name) => write!(f, "unknown data type {}", name),
            ExecError::Catalog(e) => write!(f, "{}", e),
            ExecError::Relation(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecError::Catalog(e) => Some(e),
            ExecError::Relation(e) => Some(e),
            ExecError::UnknownType(_) => None,
        }
    }
}

impl From<CatalogError> for ExecError {
    fn from(e: CatalogError) -> Self {
        ExecError::Catalog(e)
    }
}

impl From<RelationError> for ExecError {
    fn from(e: RelationError) -> Self {
        ExecError::Relation(e)
    }
}
