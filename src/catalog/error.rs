//! Catalog-level errors.

use std::fmt;

use crate::datum::Identifier;
use crate::heap::RelationError;

/// Errors from catalog lookups and DDL consistency checks.
#[derive(Debug)]
pub enum CatalogError {
    /// The catalog tables themselves cannot be dropped.
    SchemaTableProtected(Identifier),
    /// Named table has no `_tables` row.
    TableNotFound(Identifier),
    /// Named index has no `_indices` rows for the table.
    IndexNotFound {
        /// Index name.
        index: Identifier,
        /// Table the index was looked up on.
        table: Identifier,
    },
    /// Index declaration names a column the table does not have.
    ColumnNotInTable {
        /// Offending column name.
        column: Identifier,
        /// Target table.
        table: Identifier,
    },
    /// `_columns.data_type` held something other than INT or TEXT.
    UnknownDataType(String),
    /// Failure in an underlying relation.
    Relation(RelationError),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::SchemaTableProtected(name) => {
                write!(f, "cannot drop schema table {}", name)
            }
            CatalogError::TableNotFound(name) => write!(f, "no such table: {}", name),
            CatalogError::IndexNotFound { index, table } => {
                write!(f, "no index {} on table {}", index, table)
            }
            CatalogError::ColumnNotInTable { column, table } => {
                write!(f, "table {} has no column {}", table, column)
            }
            CatalogError::UnknownDataType(name) => {
                write!(f, "unknown data type {} in _columns", name)
            }
            CatalogError::Relation(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Relation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RelationError> for CatalogError {
    fn from(e: RelationError) -> Self {
        CatalogError::Relation(e)
    }
}
