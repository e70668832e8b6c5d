//! The `_tables` catalog and the process-wide relation cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;
use parking_lot::{Mutex, RwLock};

use super::error::CatalogError;
use super::schema::{
    columns_schema, indices_schema, schema_table_schema, tables_schema, COLUMNS_TABLE_NAME,
    INDICES_TABLE_NAME, SCHEMA_TABLE_NAMES, TABLES_TABLE_NAME,
};
use crate::datum::{
    ColumnAttribute, ColumnAttributes, ColumnNames, DataType, Identifier, Row, Value,
};
use crate::heap::{Handle, HeapTable};
use crate::store::RecordStore;

/// A shared, lockable relation as handed out by the catalog cache.
pub type SharedTable<S> = Arc<Mutex<HeapTable<S>>>;

/// The `_tables` catalog: one row per table, the catalog tables included.
///
/// `Tables` owns the process-wide `name -> HeapTable` cache, so successive
/// [`get_table`](Self::get_table) calls return the same live relation.
/// Constructing it bootstraps all three catalog backing files from their
/// hard-coded schemas; it never reads `_columns` to describe the catalog
/// itself.
pub struct Tables<S: RecordStore> {
    env: PathBuf,
    relation: SharedTable<S>,
    columns: SharedTable<S>,
    cache: RwLock<HashMap<Identifier, SharedTable<S>>>,
}

impl<S: RecordStore> Tables<S> {
    /// Opens the catalog in the given environment directory, creating and
    /// seeding the backing files on first use.
    ///
    /// Newly created files are seeded so the catalog describes itself:
    /// `_tables` gets one row per catalog table, and `_columns` gets the
    /// rows for the `_tables` and `_columns` schemas (the `_indices`
    /// schema has INT and BOOLEAN columns, which `_columns.data_type`
    /// cannot express, so it stays hard-coded only).
    pub fn open(env: &Path) -> Result<Self, CatalogError> {
        let (names, attrs) = tables_schema();
        let mut tables_rel = HeapTable::new(env, TABLES_TABLE_NAME, names, attrs);
        let tables_created = Self::materialize(&mut tables_rel)?;

        let (names, attrs) = columns_schema();
        let mut columns_rel = HeapTable::new(env, COLUMNS_TABLE_NAME, names, attrs);
        let columns_created = Self::materialize(&mut columns_rel)?;

        let (names, attrs) = indices_schema();
        let mut indices_rel = HeapTable::new(env, INDICES_TABLE_NAME, names, attrs);
        Self::materialize(&mut indices_rel)?;

        if tables_created {
            debug!("seeding _tables with the catalog table names");
            for name in SCHEMA_TABLE_NAMES {
                let row = Row::from([("table_name".to_string(), Value::from(name))]);
                tables_rel.insert(&row)?;
            }
        }
        if columns_created {
            debug!("seeding _columns with the catalog schemas");
            let self_columns = [
                (TABLES_TABLE_NAME, "table_name"),
                (COLUMNS_TABLE_NAME, "table_name"),
                (COLUMNS_TABLE_NAME, "column_name"),
                (COLUMNS_TABLE_NAME, "data_type"),
            ];
            for (table_name, column_name) in self_columns {
                let row = Row::from([
                    ("table_name".to_string(), Value::from(table_name)),
                    ("column_name".to_string(), Value::from(column_name)),
                    ("data_type".to_string(), Value::from("TEXT")),
                ]);
                columns_rel.insert(&row)?;
            }
        }

        let relation = Arc::new(Mutex::new(tables_rel));
        let columns = Arc::new(Mutex::new(columns_rel));
        let mut cache = HashMap::new();
        cache.insert(TABLES_TABLE_NAME.to_string(), relation.clone());
        cache.insert(COLUMNS_TABLE_NAME.to_string(), columns.clone());
        cache.insert(
            INDICES_TABLE_NAME.to_string(),
            Arc::new(Mutex::new(indices_rel)),
        );

        Ok(Self {
            env: env.to_path_buf(),
            relation,
            columns,
            cache: RwLock::new(cache),
        })
    }

    /// Opens a catalog relation, creating its backing file if absent.
    /// Returns whether the file had to be created.
    fn materialize(relation: &mut HeapTable<S>) -> Result<bool, CatalogError> {
        if relation.open().is_ok() {
            return Ok(false);
        }
        relation.create()?;
        Ok(true)
    }

    /// Inserts a row into `_tables` and returns its handle.
    pub fn insert(&self, row: &Row) -> Result<Handle, CatalogError> {
        Ok(self.relation.lock().insert(row)?)
    }

    /// Tombstones a `_tables` row.
    pub fn del(&self, handle: Handle) -> Result<(), CatalogError> {
        Ok(self.relation.lock().del(handle)?)
    }

    /// Returns handles of `_tables` rows matching the filter.
    pub fn select(&self, where_clause: Option<&Row>) -> Result<Vec<Handle>, CatalogError> {
        Ok(self.relation.lock().select(where_clause)?)
    }

    /// Returns the full `_tables` row at `handle`.
    pub fn project(&self, handle: Handle) -> Result<Row, CatalogError> {
        Ok(self.relation.lock().project(handle)?)
    }

    /// Returns a table's schema: ordered column names and attributes.
    ///
    /// Catalog tables answer from their hard-coded schemas; user tables
    /// are rebuilt by scanning `_columns` in row-insertion order, which is
    /// the declaration order. A table with no `_columns` rows yields an
    /// empty schema.
    pub fn get_columns(
        &self,
        table_name: &str,
    ) -> Result<(ColumnNames, ColumnAttributes), CatalogError> {
        if let Some(schema) = schema_table_schema(table_name) {
            return Ok(schema);
        }

        let where_clause = Row::from([("table_name".to_string(), Value::from(table_name))]);
        let mut columns = self.columns.lock();
        let mut names = ColumnNames::new();
        let mut attrs = ColumnAttributes::new();
        for handle in columns.select(Some(&where_clause))? {
            let row = columns.project(handle)?;
            let (Some(Value::Text(column_name)), Some(Value::Text(data_type))) =
                (row.get("column_name"), row.get("data_type"))
            else {
                // Unreachable with the fixed _columns schema.
                continue;
            };
            let data_type = match DataType::from_sql_name(data_type) {
                Some(dt @ (DataType::Int | DataType::Text)) => dt,
                _ => return Err(CatalogError::UnknownDataType(data_type.clone())),
            };
            names.push(column_name.clone());
            attrs.push(ColumnAttribute::new(data_type));
        }
        Ok((names, attrs))
    }

    /// Returns the live relation for `table_name`, constructing and
    /// caching it on first use.
    ///
    /// The same `Arc` is returned for every call until the table is
    /// dropped, so all callers share one set of file state.
    pub fn get_table(&self, table_name: &str) -> Result<SharedTable<S>, CatalogError> {
        if let Some(relation) = self.cache.read().get(table_name) {
            return Ok(relation.clone());
        }
        let (names, attrs) = self.get_columns(table_name)?;
        let relation = Arc::new(Mutex::new(HeapTable::new(
            &self.env,
            table_name,
            names,
            attrs,
        )));
        self.cache
            .write()
            .insert(table_name.to_string(), relation.clone());
        Ok(relation)
    }

    /// Forgets the cached relation for a dropped table.
    pub fn evict(&self, table_name: &str) {
        self.cache.write().remove(table_name);
    }
}

impl<S: RecordStore> std::fmt::Debug for Tables<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tables").field("env", &self.env).finish()
    }
}
