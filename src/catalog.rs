//! Schema catalog: self-describing system tables.
//!
//! The catalog stores metadata about every table in three heap tables
//! whose rows describe all tables, including the catalog itself:
//!
//! - `_tables`: one row per table (table_name)
//! - `_columns`: one row per column (table_name, column_name, data_type)
//! - `_indices`: one row per index column (table_name, index_name,
//!   seq_in_index, column_name, index_type, is_unique)
//!
//! ## Bootstrap
//!
//! The catalog tables' own schemas are hard-coded: the constructors never
//! read `_columns` to learn them, which breaks the self-reference cycle.
//! On first startup the backing files are created and `_tables` is seeded
//! with the three catalog names; everything else on disk follows from DDL.
//!
//! [`Tables`] and [`Indices`] are created once at environment setup (see
//! [`SqlExec::open`](crate::exec::SqlExec::open)) and live for the process
//! lifetime; they are never reset between queries.

mod error;
mod indices;
mod schema;
mod tables;

pub use error::CatalogError;
pub use indices::{CatalogIndex, DbIndex, Indices};
pub use schema::{
    columns_schema, indices_schema, tables_schema, COLUMNS_TABLE_NAME, INDICES_TABLE_NAME,
    SCHEMA_TABLE_NAMES, TABLES_TABLE_NAME,
};
pub use tables::{SharedTable, Tables};
