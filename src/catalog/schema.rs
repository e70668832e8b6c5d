//! Hard-coded catalog table schemas and name constants.
//!
//! The catalog describes itself, so something has to know these schemas
//! without reading them from disk. This module is that something: the
//! catalog constructors build their relations from these functions and
//! never consult `_columns` for the catalog tables.

use crate::datum::{ColumnAttribute, ColumnAttributes, ColumnNames, DataType};

/// Name of the table-of-tables.
pub const TABLES_TABLE_NAME: &str = "_tables";

/// Name of the table-of-columns.
pub const COLUMNS_TABLE_NAME: &str = "_columns";

/// Name of the table-of-indices.
pub const INDICES_TABLE_NAME: &str = "_indices";

/// The three catalog table names, in bootstrap order.
pub const SCHEMA_TABLE_NAMES: [&str; 3] =
    [TABLES_TABLE_NAME, COLUMNS_TABLE_NAME, INDICES_TABLE_NAME];

/// Schema of `_tables`: `table_name TEXT`.
pub fn tables_schema() -> (ColumnNames, ColumnAttributes) {
    (
        vec!["table_name".to_string()],
        vec![ColumnAttribute::new(DataType::Text)],
    )
}

/// Schema of `_columns`: `table_name TEXT, column_name TEXT, data_type TEXT`.
///
/// `data_type` holds `"INT"` or `"TEXT"`; a table's column order is the
/// order its rows were appended.
pub fn columns_schema() -> (ColumnNames, ColumnAttributes) {
    (
        vec![
            "table_name".to_string(),
            "column_name".to_string(),
            "data_type".to_string(),
        ],
        vec![ColumnAttribute::new(DataType::Text); 3],
    )
}

/// Schema of `_indices`: `table_name TEXT, index_name TEXT, seq_in_index
/// INT, column_name TEXT, index_type TEXT, is_unique BOOLEAN`.
///
/// Exactly one row per (index, column), with `seq_in_index` starting at 1.
pub fn indices_schema() -> (ColumnNames, ColumnAttributes) {
    (
        vec![
            "table_name".to_string(),
            "index_name".to_string(),
            "seq_in_index".to_string(),
            "column_name".to_string(),
            "index_type".to_string(),
            "is_unique".to_string(),
        ],
        vec![
            ColumnAttribute::new(DataType::Text),
            ColumnAttribute::new(DataType::Text),
            ColumnAttribute::new(DataType::Int),
            ColumnAttribute::new(DataType::Text),
            ColumnAttribute::new(DataType::Text),
            ColumnAttribute::new(DataType::Boolean),
        ],
    )
}

/// Returns the hard-coded schema for a catalog table name, if it is one.
pub fn schema_table_schema(name: &str) -> Option<(ColumnNames, ColumnAttributes)> {
    match name {
        TABLES_TABLE_NAME => Some(tables_schema()),
        COLUMNS_TABLE_NAME => Some(columns_schema()),
        INDICES_TABLE_NAME => Some(indices_schema()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schemas_are_parallel_vectors() {
        for name in SCHEMA_TABLE_NAMES {
            let (names, attrs) = schema_table_schema(name).unwrap();
            assert_eq!(names.len(), attrs.len());
        }
        assert!(schema_table_schema("user_table").is_none());
    }

    #[test]
    fn test_indices_schema_shape() {
        let (names, attrs) = indices_schema();
        assert_eq!(names.len(), 6);
        assert_eq!(attrs[2].data_type(), DataType::Int);
        assert_eq!(attrs[5].data_type(), DataType::Boolean);
    }
}
