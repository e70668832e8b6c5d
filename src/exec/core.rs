//! Statement dispatch and catalog consistency enforcement.

use std::path::Path;
use std::sync::Arc;

use log::{info, warn};

use super::error::ExecError;
use super::result::QueryResult;
use crate::catalog::{
    columns_schema, indices_schema, tables_schema, CatalogError, DbIndex, Indices, Tables,
    COLUMNS_TABLE_NAME, SCHEMA_TABLE_NAMES,
};
use crate::datum::{ColumnAttribute, ColumnAttributes, ColumnNames, DataType, Identifier, Row, Value};
use crate::heap::Handle;
use crate::sql::{AstType, ColumnDef, CreateStmt, DropStmt, ShowStmt, Statement};
use crate::store::RecordStore;

/// Stateless dispatcher for CREATE/DROP/SHOW statements.
///
/// Holds the two process-wide catalog singletons ([`Tables`] and
/// [`Indices`]); everything else is computed per statement. The catalogs
/// are created once by [`open`](Self::open) at environment setup and are
/// never reset between queries.
pub struct SqlExec<S: RecordStore> {
    tables: Arc<Tables<S>>,
    indices: Arc<Indices<S>>,
}

impl<S: RecordStore> SqlExec<S> {
    /// Opens (bootstrapping if needed) the catalog in `env` and returns
    /// an executor over it.
    pub fn open(env: &Path) -> Result<Self, ExecError> {
        let tables = Arc::new(Tables::open(env)?);
        let indices = Arc::new(Indices::new(&tables)?);
        info!("opened database environment {}", env.display());
        Ok(Self { tables, indices })
    }

    /// Returns the tables catalog.
    pub fn tables(&self) -> &Tables<S> {
        &self.tables
    }

    /// Returns the indices catalog.
    pub fn indices(&self) -> &Indices<S> {
        &self.indices
    }

    /// Executes one statement to a [`QueryResult`].
    pub fn execute(&self, statement: &Statement) -> Result<QueryResult, ExecError> {
        match statement {
            Statement::Create(CreateStmt::Table {
                name,
                if_not_exists,
                columns,
            }) => self.create_table(name, *if_not_exists, columns),
            Statement::Create(CreateStmt::Index {
                name,
                table,
                columns,
            }) => self.create_index(name, table, columns),
            Statement::Drop(DropStmt::Table { name }) => self.drop_table(name),
            Statement::Drop(DropStmt::Index { name, table }) => self.drop_index(name, table),
            Statement::Show(ShowStmt::Tables) => self.show_tables(),
            Statement::Show(ShowStmt::Columns { table }) => self.show_columns(table),
            Statement::Show(ShowStmt::Index { table }) => self.show_index(table),
            Statement::Unsupported(_) => Ok(QueryResult::with_message("not implemented")),
        }
    }

    /// Translates one AST column definition to a schema entry.
    fn column_definition(column: &ColumnDef) -> Result<(Identifier, ColumnAttribute), ExecError> {
        let data_type = match column.data_type {
            AstType::Int => DataType::Int,
            AstType::Text => DataType::Text,
            AstType::Double => {
                return Err(ExecError::UnknownType(column.data_type.as_str().to_string()))
            }
        };
        Ok((column.name.clone(), ColumnAttribute::new(data_type)))
    }

    fn create_table(
        &self,
        name: &str,
        if_not_exists: bool,
        columns: &[ColumnDef],
    ) -> Result<QueryResult, ExecError> {
        let mut column_names = ColumnNames::new();
        let mut column_attributes = ColumnAttributes::new();
        for column in columns {
            let (column_name, attribute) = Self::column_definition(column)?;
            column_names.push(column_name);
            column_attributes.push(attribute);
        }

        let tables_row = Row::from([("table_name".to_string(), Value::from(name))]);
        let tables_handle = self.tables.insert(&tables_row)?;

        let mut column_handles = Vec::new();
        if let Err(e) = self.create_table_body(
            name,
            if_not_exists,
            &column_names,
            &column_attributes,
            &mut column_handles,
        ) {
            warn!("create table {} failed, compensating: {}", name, e);
            self.compensate_create_table(name, tables_handle, &column_handles);
            return Err(e);
        }

        info!("created table {}", name);
        Ok(QueryResult::with_message(format!("created {}", name)))
    }

    /// Steps 3-4 of CREATE TABLE: `_columns` rows, then the backing file.
    /// Inserted handles are pushed to `column_handles` as they happen so
    /// the caller can compensate a partial failure.
    fn create_table_body(
        &self,
        name: &str,
        if_not_exists: bool,
        column_names: &ColumnNames,
        column_attributes: &ColumnAttributes,
        column_handles: &mut Vec<Handle>,
    ) -> Result<(), ExecError> {
        let columns_rel = self.tables.get_table(COLUMNS_TABLE_NAME)?;
        for (column_name, attribute) in column_names.iter().zip(column_attributes) {
            let row = Row::from([
                ("table_name".to_string(), Value::from(name)),
                ("column_name".to_string(), Value::from(column_name.as_str())),
                (
                    "data_type".to_string(),
                    Value::from(attribute.data_type().sql_name()),
                ),
            ]);
            column_handles.push(columns_rel.lock().insert(&row)?);
        }

        let relation = self.tables.get_table(name)?;
        let mut relation = relation.lock();
        if if_not_exists {
            relation.create_if_not_exists()?;
        } else {
            relation.create()?;
        }
        Ok(())
    }

    /// Best-effort rollback of a failed CREATE TABLE, in reverse order.
    /// Secondary failures are swallowed; the primary error is what the
    /// caller reports.
    fn compensate_create_table(
        &self,
        name: &str,
        tables_handle: Handle,
        column_handles: &[Handle],
    ) {
        if let Ok(columns_rel) = self.tables.get_table(COLUMNS_TABLE_NAME) {
            for handle in column_handles.iter().rev() {
                let _ = columns_rel.lock().del(*handle);
            }
        }
        let _ = self.tables.del(tables_handle);
        self.tables.evict(name);
    }

    fn create_index(
        &self,
        name: &str,
        table: &str,
        columns: &[Identifier],
    ) -> Result<QueryResult, ExecError> {
        self.require_table(table)?;
        let (table_columns, _) = self.tables.get_columns(table)?;
        for column in columns {
            if !table_columns.contains(column) {
                return Err(CatalogError::ColumnNotInTable {
                    column: column.clone(),
                    table: table.to_string(),
                }
                .into());
            }
        }

        let mut row_handles = Vec::new();
        for (seq, column) in columns.iter().enumerate() {
            let row = Row::from([
                ("table_name".to_string(), Value::from(table)),
                ("index_name".to_string(), Value::from(name)),
                ("seq_in_index".to_string(), Value::Int(seq as i32 + 1)),
                ("column_name".to_string(), Value::from(column.as_str())),
                ("index_type".to_string(), Value::from("BTREE")),
                ("is_unique".to_string(), Value::Bool(true)),
            ]);
            match self.indices.insert(&row) {
                Ok(handle) => row_handles.push(handle),
                Err(e) => {
                    warn!("create index {} failed, compensating: {}", name, e);
                    for handle in row_handles.iter().rev() {
                        let _ = self.indices.del(*handle);
                    }
                    return Err(e.into());
                }
            }
        }

        self.indices.get_index(table, name)?.create()?;
        info!("created index {} on {}", name, table);
        Ok(QueryResult::with_message(format!("created index {}", name)))
    }

    fn drop_table(&self, name: &str) -> Result<QueryResult, ExecError> {
        if SCHEMA_TABLE_NAMES.contains(&name) {
            return Err(CatalogError::SchemaTableProtected(name.to_string()).into());
        }
        self.require_table(name)?;

        // Dependency order: indices, _columns rows, backing file, _tables row.
        for index_name in self.indices.get_index_names(name)? {
            self.drop_one_index(name, &index_name)?;
        }

        let where_clause = Row::from([("table_name".to_string(), Value::from(name))]);
        {
            let columns_rel = self.tables.get_table(COLUMNS_TABLE_NAME)?;
            let mut columns_rel = columns_rel.lock();
            for handle in columns_rel.select(Some(&where_clause))? {
                columns_rel.del(handle)?;
            }
        }

        let relation = self.tables.get_table(name)?;
        let mut relation_guard = relation.lock();
        match (*relation_guard).drop() {
            Ok(()) => {
                for handle in self.tables.select(Some(&where_clause))? {
                    self.tables.del(handle)?;
                }
                self.tables.evict(name);
                info!("dropped table {}", name);
                Ok(QueryResult::with_message(format!("dropped {}", name)))
            }
            Err(e) => {
                // The metadata is already half gone; finish removing it
                // best-effort and surface the file error.
                warn!("dropping {} failed mid-cascade: {}", name, e);
                if let Ok(handles) = self.tables.select(Some(&where_clause)) {
                    for handle in handles {
                        let _ = self.tables.del(handle);
                    }
                }
                self.tables.evict(name);
                Err(e.into())
            }
        }
    }

    fn drop_index(&self, name: &str, table: &str) -> Result<QueryResult, ExecError> {
        self.drop_one_index(table, name)?;
        info!("dropped index {} from {}", name, table);
        Ok(QueryResult::with_message(format!(
            "dropped index {} from {}",
            name, table
        )))
    }

    /// Drops one index: the capability's own drop, then its catalog rows.
    /// Fails with `IndexNotFound` if the catalog has no such index.
    fn drop_one_index(&self, table: &str, name: &str) -> Result<(), ExecError> {
        let mut index = self.indices.get_index(table, name)?;
        index.drop()?;
        let where_clause = Row::from([
            ("table_name".to_string(), Value::from(table)),
            ("index_name".to_string(), Value::from(name)),
        ]);
        for handle in self.indices.select(Some(&where_clause))? {
            self.indices.del(handle)?;
        }
        Ok(())
    }

    fn show_tables(&self) -> Result<QueryResult, ExecError> {
        let (column_names, column_attributes) = tables_schema();
        let mut rows = Vec::new();
        for handle in self.tables.select(None)? {
            let row = self.tables.project(handle)?;
            let is_schema_table = matches!(
                row.get("table_name"),
                Some(Value::Text(name)) if SCHEMA_TABLE_NAMES.contains(&name.as_str())
            );
            if !is_schema_table {
                rows.push(row);
            }
        }
        let message = format!("successfully returned {} rows", rows.len());
        Ok(QueryResult::with_rows(
            column_names,
            column_attributes,
            rows,
            message,
        ))
    }

    fn show_columns(&self, table: &str) -> Result<QueryResult, ExecError> {
        self.require_table(table)?;
        let (column_names, column_attributes) = columns_schema();
        let where_clause = Row::from([("table_name".to_string(), Value::from(table))]);

        let columns_rel = self.tables.get_table(COLUMNS_TABLE_NAME)?;
        let mut columns_rel = columns_rel.lock();
        let mut rows = Vec::new();
        for handle in columns_rel.select(Some(&where_clause))? {
            rows.push(columns_rel.project(handle)?);
        }
        let message = format!("successfully returned {} rows", rows.len());
        Ok(QueryResult::with_rows(
            column_names,
            column_attributes,
            rows,
            message,
        ))
    }

    fn show_index(&self, table: &str) -> Result<QueryResult, ExecError> {
        self.require_table(table)?;
        let (column_names, column_attributes) = indices_schema();
        let where_clause = Row::from([("table_name".to_string(), Value::from(table))]);

        let mut rows = Vec::new();
        for handle in self.indices.select(Some(&where_clause))? {
            rows.push(self.indices.project(handle)?);
        }
        let message = format!("successfully returned {} rows", rows.len());
        Ok(QueryResult::with_rows(
            column_names,
            column_attributes,
            rows,
            message,
        ))
    }

    /// Checks a `_tables` row exists for `name` (the catalog tables have
    /// theirs from bootstrap).
    fn table_exists(&self, name: &str) -> Result<bool, ExecError> {
        let where_clause = Row::from([("table_name".to_string(), Value::from(name))]);
        Ok(!self.tables.select(Some(&where_clause))?.is_empty())
    }

    fn require_table(&self, name: &str) -> Result<(), ExecError> {
        if !self.table_exists(name)? {
            return Err(CatalogError::TableNotFound(name.to_string()).into());
        }
        Ok(())
    }
}

impl<S: RecordStore> std::fmt::Debug for SqlExec<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlExec").finish()
    }
}
