//! Row-oriented relation over one heap file.

use std::fmt;
use std::path::Path;

use bytes::BytesMut;

use super::error::RelationError;
use super::file::HeapFile;
use super::page::{BlockId, RecordId, SlottedPage, MAX_RECORD_SZ};
use crate::datum::{ColumnAttributes, ColumnNames, Identifier, Row, Value};
use crate::store::RecordStore;

/// Identifies one record within one page within one file.
///
/// Stable for the life of the record: a handle stays a valid identifier
/// until the record is tombstoned, and the record id is never reused even
/// after that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle {
    /// Page holding the record.
    pub block_id: BlockId,
    /// Slot within the page.
    pub record_id: RecordId,
}

impl Handle {
    /// Creates a new handle.
    pub fn new(block_id: BlockId, record_id: RecordId) -> Self {
        Self {
            block_id,
            record_id,
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.block_id, self.record_id)
    }
}

/// A tuple-oriented relation layered on one [`HeapFile`].
///
/// The schema, parallel ordered vectors of column names and attributes,
/// is supplied at construction and immutable for the table's lifetime.
/// Column order is significant: it defines the marshaling order.
///
/// Operations that touch the file open it lazily, so a freshly constructed
/// table over an existing file is immediately usable.
#[derive(Debug)]
pub struct HeapTable<S: RecordStore> {
    name: Identifier,
    column_names: ColumnNames,
    column_attributes: ColumnAttributes,
    file: HeapFile<S>,
}

impl<S: RecordStore> HeapTable<S> {
    /// Creates a relation handle; no file I/O happens until an operation.
    pub fn new(
        env: &Path,
        name: &str,
        column_names: ColumnNames,
        column_attributes: ColumnAttributes,
    ) -> Self {
        debug_assert_eq!(column_names.len(), column_attributes.len());
        Self {
            name: name.to_string(),
            column_names,
            column_attributes,
            file: HeapFile::new(env, name),
        }
    }

    /// Returns the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the ordered column names.
    pub fn column_names(&self) -> &ColumnNames {
        &self.column_names
    }

    /// Returns the ordered column attributes.
    pub fn column_attributes(&self) -> &ColumnAttributes {
        &self.column_attributes
    }

    /// Creates the backing file.
    pub fn create(&mut self) -> Result<(), RelationError> {
        self.file.create()?;
        Ok(())
    }

    /// Opens the backing file, creating it if the open fails.
    pub fn create_if_not_exists(&mut self) -> Result<(), RelationError> {
        match self.file.open() {
            Ok(()) => Ok(()),
            Err(_) => self.create(),
        }
    }

    /// Removes the backing file. The relation is permanently unusable
    /// afterwards.
    pub fn drop(&mut self) -> Result<(), RelationError> {
        self.file.drop()?;
        Ok(())
    }

    /// Opens the backing file.
    pub fn open(&mut self) -> Result<(), RelationError> {
        self.file.open()?;
        Ok(())
    }

    /// Flushes and closes the backing file.
    pub fn close(&mut self) -> Result<(), RelationError> {
        self.file.close()?;
        Ok(())
    }

    /// Inserts a row and returns its handle.
    ///
    /// Every schema column must be present in `row`; extra columns are
    /// silently dropped. Appends to the last page, allocating a new page
    /// when the record does not fit.
    pub fn insert(&mut self, row: &Row) -> Result<Handle, RelationError> {
        self.file.open()?;
        let full_row = self.validate(row)?;
        self.append(&full_row)
    }

    /// Replaces the columns in `new_values` for the row at `handle`.
    pub fn update(&mut self, _handle: Handle, _new_values: &Row) -> Result<(), RelationError> {
        Err(RelationError::NotImplemented("update"))
    }

    /// Tombstones the row at `handle` in its page.
    ///
    /// The handle stops being a valid identifier; the record id is never
    /// reused.
    pub fn del(&mut self, handle: Handle) -> Result<(), RelationError> {
        self.file.open()?;
        let mut page = self.file.get(handle.block_id)?;
        page.del(handle.record_id)?;
        self.file.put(&page)?;
        Ok(())
    }

    /// Returns handles of all live rows matching `where_clause`, in
    /// ascending (block id, record id) order.
    ///
    /// A row matches when its projection on the where-keys equals the
    /// where-values; `None` matches every row. Equality is exact: no
    /// coercion, no ranges.
    pub fn select(&mut self, where_clause: Option<&Row>) -> Result<Vec<Handle>, RelationError> {
        self.file.open()?;
        let mut handles = Vec::new();
        for block_id in self.file.block_ids() {
            let page = self.file.get(block_id)?;
            for record_id in page.ids() {
                if self.selected(&page, record_id, where_clause)? {
                    handles.push(Handle::new(block_id, record_id));
                }
            }
        }
        Ok(handles)
    }

    /// Returns the full row at `handle`.
    pub fn project(&mut self, handle: Handle) -> Result<Row, RelationError> {
        self.file.open()?;
        let page = self.file.get(handle.block_id)?;
        let data = page
            .get(handle.record_id)
            .ok_or(RelationError::RecordNotFound(handle))?;
        self.unmarshal(&data)
    }

    /// Returns the row at `handle` restricted to `column_names`.
    pub fn project_columns(
        &mut self,
        handle: Handle,
        column_names: &ColumnNames,
    ) -> Result<Row, RelationError> {
        let row = self.project(handle)?;
        let mut result = Row::new();
        for name in column_names {
            let value = row
                .get(name)
                .ok_or_else(|| RelationError::UnknownColumn(name.clone()))?;
            result.insert(name.clone(), value.clone());
        }
        Ok(result)
    }

    /// Checks whether a row is acceptable to insert and projects it down
    /// to the schema columns. Missing columns fail; extra columns are
    /// dropped.
    fn validate(&self, row: &Row) -> Result<Row, RelationError> {
        let mut full_row = Row::new();
        for name in &self.column_names {
            let value = row
                .get(name)
                .ok_or_else(|| RelationError::MissingColumn(name.clone()))?;
            full_row.insert(name.clone(), value.clone());
        }
        Ok(full_row)
    }

    /// Appends a validated row, spilling to a fresh page when the last
    /// page is out of room.
    fn append(&mut self, row: &Row) -> Result<Handle, RelationError> {
        let data = self.marshal(row)?;
        let mut page = self.file.get(self.file.get_last_block_id())?;
        let record_id = match page.add(&data) {
            Ok(id) => id,
            Err(super::HeapError::NoRoom { .. }) => {
                page = self.file.get_new()?;
                page.add(&data)?
            }
            Err(e) => return Err(e.into()),
        };
        self.file.put(&page)?;
        Ok(Handle::new(page.block_id(), record_id))
    }

    /// Marshals a full row in schema column order.
    fn marshal(&self, row: &Row) -> Result<Vec<u8>, RelationError> {
        let mut buf = BytesMut::new();
        for (name, attr) in self.column_names.iter().zip(&self.column_attributes) {
            let value = row
                .get(name)
                .ok_or_else(|| RelationError::MissingColumn(name.clone()))?;
            value.marshal(attr, &mut buf)?;
        }
        if buf.len() > MAX_RECORD_SZ {
            return Err(RelationError::RowTooBig {
                size: buf.len(),
                max: MAX_RECORD_SZ,
            });
        }
        Ok(buf.to_vec())
    }

    /// Unmarshals a record using the same ordered schema that wrote it.
    fn unmarshal(&self, data: &[u8]) -> Result<Row, RelationError> {
        let mut buf = data;
        let mut row = Row::new();
        for (name, attr) in self.column_names.iter().zip(&self.column_attributes) {
            row.insert(name.clone(), Value::unmarshal(attr, &mut buf)?);
        }
        Ok(row)
    }

    /// Evaluates the equality filter against one record.
    fn selected(
        &self,
        page: &SlottedPage,
        record_id: RecordId,
        where_clause: Option<&Row>,
    ) -> Result<bool, RelationError> {
        let Some(where_clause) = where_clause else {
            return Ok(true);
        };
        let Some(data) = page.get(record_id) else {
            return Ok(false);
        };
        let row = self.unmarshal(&data)?;
        Ok(where_clause
            .iter()
            .all(|(name, value)| row.get(name) == Some(value)))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::datum::{ColumnAttribute, DataType};
    use crate::store::MemoryStore;

    fn table(env: &str) -> HeapTable<MemoryStore> {
        HeapTable::new(
            &PathBuf::from(format!("/mem/heap_table/{}", env)),
            "t",
            vec!["a".to_string(), "b".to_string()],
            vec![
                ColumnAttribute::new(DataType::Int),
                ColumnAttribute::new(DataType::Text),
            ],
        )
    }

    fn row(a: i32, b: &str) -> Row {
        Row::from([("a".to_string(), a.into()), ("b".to_string(), b.into())])
    }

    #[test]
    fn test_insert_select_project() {
        let mut t = table("basic");
        t.create().unwrap();

        let handle = t.insert(&row(12, "Hello!")).unwrap();
        let handles = t.select(None).unwrap();
        assert_eq!(handles, vec![handle]);
        assert_eq!(t.project(handle).unwrap(), row(12, "Hello!"));
        t.drop().unwrap();
    }

    #[test]
    fn test_insert_missing_column() {
        let mut t = table("missing");
        t.create().unwrap();

        let partial = Row::from([("a".to_string(), Value::Int(1))]);
        assert!(matches!(
            t.insert(&partial),
            Err(RelationError::MissingColumn(name)) if name == "b"
        ));
        t.drop().unwrap();
    }

    #[test]
    fn test_insert_drops_extra_columns() {
        let mut t = table("extra");
        t.create().unwrap();

        let mut r = row(1, "x");
        r.insert("zzz".to_string(), Value::Bool(true));
        let handle = t.insert(&r).unwrap();
        assert_eq!(t.project(handle).unwrap(), row(1, "x"));
        t.drop().unwrap();
    }

    #[test]
    fn test_project_columns() {
        let mut t = table("proj");
        t.create().unwrap();

        let handle = t.insert(&row(7, "seven")).unwrap();
        let projected = t
            .project_columns(handle, &vec!["a".to_string()])
            .unwrap();
        assert_eq!(projected, Row::from([("a".to_string(), Value::Int(7))]));

        assert!(matches!(
            t.project_columns(handle, &vec!["nope".to_string()]),
            Err(RelationError::UnknownColumn(_))
        ));
        t.drop().unwrap();
    }

    #[test]
    fn test_select_where_equality() {
        let mut t = table("where");
        t.create().unwrap();

        let h1 = t.insert(&row(1, "x")).unwrap();
        let _h2 = t.insert(&row(2, "y")).unwrap();
        let h3 = t.insert(&row(1, "z")).unwrap();

        let whr = Row::from([("a".to_string(), Value::Int(1))]);
        assert_eq!(t.select(Some(&whr)).unwrap(), vec![h1, h3]);

        let whr = Row::from([
            ("a".to_string(), Value::Int(1)),
            ("b".to_string(), Value::Text("z".to_string())),
        ]);
        assert_eq!(t.select(Some(&whr)).unwrap(), vec![h3]);

        // No coercion: TEXT "1" does not match INT 1.
        let whr = Row::from([("a".to_string(), Value::Text("1".to_string()))]);
        assert_eq!(t.select(Some(&whr)).unwrap(), vec![]);
        t.drop().unwrap();
    }

    #[test]
    fn test_del_tombstones() {
        let mut t = table("del");
        t.create().unwrap();

        let h1 = t.insert(&row(1, "one")).unwrap();
        let h2 = t.insert(&row(2, "two")).unwrap();
        let h3 = t.insert(&row(3, "three")).unwrap();

        t.del(h2).unwrap();

        assert_eq!(t.select(None).unwrap(), vec![h1, h3]);
        assert_eq!(t.project(h3).unwrap(), row(3, "three"));
        assert!(matches!(
            t.project(h2),
            Err(RelationError::RecordNotFound(_))
        ));
        t.drop().unwrap();
    }

    #[test]
    fn test_update_not_implemented() {
        let mut t = table("upd");
        t.create().unwrap();
        let h = t.insert(&row(1, "x")).unwrap();
        assert!(matches!(
            t.update(h, &row(2, "y")),
            Err(RelationError::NotImplemented("update"))
        ));
        t.drop().unwrap();
    }

    #[test]
    fn test_insert_spills_to_new_page() {
        let mut t = table("spill");
        t.create().unwrap();

        // ~1KB rows: four to a page, so five force a second block.
        let text = "x".repeat(1000);
        let handles: Vec<_> = (0..5)
            .map(|i| t.insert(&row(i, &text)).unwrap())
            .collect();

        assert!(handles.iter().any(|h| h.block_id > 1));
        assert_eq!(t.select(None).unwrap(), handles);
        for (i, &h) in handles.iter().enumerate() {
            assert_eq!(
                t.project(h).unwrap().get("a"),
                Some(&Value::Int(i as i32))
            );
        }
        t.drop().unwrap();
    }

    #[test]
    fn test_row_too_big() {
        let mut t = table("big");
        t.create().unwrap();
        let r = row(1, &"x".repeat(MAX_RECORD_SZ));
        assert!(matches!(
            t.insert(&r),
            Err(RelationError::RowTooBig { .. })
        ));
        t.drop().unwrap();
    }

    #[test]
    fn test_marshal_roundtrip_via_reopen() {
        let mut t = table("reopen");
        t.create().unwrap();
        let handle = t.insert(&row(-42, "neg")).unwrap();
        t.close().unwrap();

        let mut t = table("reopen");
        assert_eq!(t.project(handle).unwrap(), row(-42, "neg"));
        t.drop().unwrap();
    }

    #[test]
    fn test_create_if_not_exists() {
        let mut t = table("cine");
        t.create_if_not_exists().unwrap();
        let h = t.insert(&row(1, "x")).unwrap();

        // Second handle opens the same file instead of failing.
        let mut t2 = table("cine");
        t2.create_if_not_exists().unwrap();
        assert_eq!(t2.project(h).unwrap(), row(1, "x"));
        t2.drop().unwrap();
    }
}
