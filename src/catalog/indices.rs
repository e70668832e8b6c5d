//! The `_indices` catalog and the index capability.

use log::debug;

use super::error::CatalogError;
use super::schema::INDICES_TABLE_NAME;
use super::tables::{SharedTable, Tables};
use crate::datum::{Identifier, Row, Value};
use crate::heap::Handle;
use crate::store::RecordStore;

/// The capability an index object offers the executor.
///
/// Concrete index implementations (B-tree, hash) are polymorphic over
/// this; their search structures are outside the catalog's concern.
pub trait DbIndex {
    /// Materializes the index structure.
    fn create(&mut self) -> Result<(), CatalogError>;

    /// Destroys the index structure.
    fn drop(&mut self) -> Result<(), CatalogError>;
}

/// An index as the catalog knows it: name, shape, no search structure.
///
/// `create`/`drop` only record intent for now; the catalog rows are the
/// index's entire on-disk presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogIndex {
    /// Table the index belongs to.
    pub table_name: Identifier,
    /// Index name, unique per table.
    pub index_name: Identifier,
    /// Index kind, currently always `"BTREE"`.
    pub index_type: String,
    /// Whether the index enforces uniqueness.
    pub is_unique: bool,
}

impl DbIndex for CatalogIndex {
    fn create(&mut self) -> Result<(), CatalogError> {
        debug!(
            "create {} index {} on {}",
            self.index_type, self.index_name, self.table_name
        );
        Ok(())
    }

    fn drop(&mut self) -> Result<(), CatalogError> {
        debug!("drop index {} on {}", self.index_name, self.table_name);
        Ok(())
    }
}

/// The `_indices` catalog: one row per (index, column).
///
/// Shares the single `_indices` relation instance held by the [`Tables`]
/// cache, so reads through either side see the same file state.
pub struct Indices<S: RecordStore> {
    relation: SharedTable<S>,
}

impl<S: RecordStore> Indices<S> {
    /// Builds the indices catalog from the already-bootstrapped tables
    /// catalog.
    pub fn new(tables: &Tables<S>) -> Result<Self, CatalogError> {
        Ok(Self {
            relation: tables.get_table(INDICES_TABLE_NAME)?,
        })
    }

    /// Inserts a row into `_indices` and returns its handle.
    pub fn insert(&self, row: &Row) -> Result<Handle, CatalogError> {
        Ok(self.relation.lock().insert(row)?)
    }

    /// Tombstones an `_indices` row.
    pub fn del(&self, handle: Handle) -> Result<(), CatalogError> {
        Ok(self.relation.lock().del(handle)?)
    }

    /// Returns handles of `_indices` rows matching the filter.
    pub fn select(&self, where_clause: Option<&Row>) -> Result<Vec<Handle>, CatalogError> {
        Ok(self.relation.lock().select(where_clause)?)
    }

    /// Returns the full `_indices` row at `handle`.
    pub fn project(&self, handle: Handle) -> Result<Row, CatalogError> {
        Ok(self.relation.lock().project(handle)?)
    }

    /// Returns the distinct index names on a table, in first-appearance
    /// order.
    pub fn get_index_names(&self, table_name: &str) -> Result<Vec<Identifier>, CatalogError> {
        let where_clause = Row::from([("table_name".to_string(), Value::from(table_name))]);
        let mut names: Vec<Identifier> = Vec::new();
        for handle in self.select(Some(&where_clause))? {
            let row = self.project(handle)?;
            if let Some(Value::Text(index_name)) = row.get("index_name") {
                if !names.iter().any(|n| n == index_name) {
                    names.push(index_name.clone());
                }
            }
        }
        Ok(names)
    }

    /// Returns the index object for `(table_name, index_name)`.
    ///
    /// # Errors
    ///
    /// Fails with `IndexNotFound` if the catalog has no row for the pair.
    pub fn get_index(
        &self,
        table_name: &str,
        index_name: &str,
    ) -> Result<CatalogIndex, CatalogError> {
        let where_clause = Row::from([
            ("table_name".to_string(), Value::from(table_name)),
            ("index_name".to_string(), Value::from(index_name)),
        ]);
        let handles = self.select(Some(&where_clause))?;
        let Some(&first) = handles.first() else {
            return Err(CatalogError::IndexNotFound {
                index: index_name.to_string(),
                table: table_name.to_string(),
            });
        };
        let row = self.project(first)?;
        let index_type = match row.get("index_type") {
            Some(Value::Text(t)) => t.clone(),
            _ => "BTREE".to_string(),
        };
        let is_unique = matches!(row.get("is_unique"), Some(Value::Bool(true)));
        Ok(CatalogIndex {
            table_name: table_name.to_string(),
            index_name: index_name.to_string(),
            index_type,
            is_unique,
        })
    }
}

impl<S: RecordStore> std::fmt::Debug for Indices<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Indices").finish()
    }
}
