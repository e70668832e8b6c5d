//! End-to-end heap storage scenarios over the disk-backed store.

use heapdb::datum::{ColumnAttribute, DataType, Row, Value};
use heapdb::heap::HeapTable;
use heapdb::store::FileStore;
use tempfile::tempdir;

fn schema() -> (Vec<String>, Vec<ColumnAttribute>) {
    (
        vec!["a".to_string(), "b".to_string()],
        vec![
            ColumnAttribute::new(DataType::Int),
            ColumnAttribute::new(DataType::Text),
        ],
    )
}

fn row(a: i32, b: &str) -> Row {
    Row::from([
        ("a".to_string(), Value::Int(a)),
        ("b".to_string(), Value::from(b)),
    ])
}

#[test]
fn test_create_insert_project_drop() {
    let dir = tempdir().unwrap();
    let (names, attrs) = schema();
    let mut table: HeapTable<FileStore> = HeapTable::new(dir.path(), "t", names, attrs);

    table.create().unwrap();
    let handle = table.insert(&row(12, "Hello!")).unwrap();

    let handles = table.select(None).unwrap();
    assert_eq!(handles.len(), 1);
    assert_eq!(handles[0], handle);
    assert_eq!(table.project(handle).unwrap(), row(12, "Hello!"));

    table.drop().unwrap();
    assert!(!dir.path().join("t.db").exists());
}

#[test]
fn test_thousand_row_scan_spans_pages() {
    let dir = tempdir().unwrap();
    let (names, attrs) = schema();
    let mut table: HeapTable<FileStore> = HeapTable::new(dir.path(), "many", names, attrs);
    table.create().unwrap();

    // A fixed long TEXT forces the 1001 rows across many pages.
    let text = "Much longer than the typical row needs to be for this test".repeat(4);
    for a in -1..1000 {
        table.insert(&row(a, &text)).unwrap();
    }

    let handles = table.select(None).unwrap();
    assert_eq!(handles.len(), 1001);
    assert!(handles.last().unwrap().block_id > 1);

    // Handles come back in insertion order, so projecting them in order
    // recovers the inserted sequence.
    for (i, &handle) in handles.iter().enumerate() {
        let projected = table
            .project_columns(handle, &vec!["a".to_string()])
            .unwrap();
        assert_eq!(projected.get("a"), Some(&Value::Int(i as i32 - 1)));
    }

    table.drop().unwrap();
}

#[test]
fn test_delete_last_preserves_rest() {
    let dir = tempdir().unwrap();
    let (names, attrs) = schema();
    let mut table: HeapTable<FileStore> = HeapTable::new(dir.path(), "del", names, attrs);
    table.create().unwrap();

    let text = "Much longer than the typical row needs to be for this test".repeat(4);
    let mut last = None;
    for a in -1..1000 {
        last = Some(table.insert(&row(a, &text)).unwrap());
    }

    table.del(last.unwrap()).unwrap();

    let handles = table.select(None).unwrap();
    assert_eq!(handles.len(), 1000);
    for (i, &handle) in handles.iter().enumerate() {
        let projected = table.project(handle).unwrap();
        assert_eq!(projected.get("a"), Some(&Value::Int(i as i32 - 1)));
    }

    table.drop().unwrap();
}

#[test]
fn test_select_survives_reopen() {
    let dir = tempdir().unwrap();
    let (names, attrs) = schema();
    let mut table: HeapTable<FileStore> = HeapTable::new(dir.path(), "persist", names, attrs);
    table.create().unwrap();
    let handle = table.insert(&row(7, "persisted")).unwrap();
    table.close().unwrap();

    let (names, attrs) = schema();
    let mut reopened: HeapTable<FileStore> = HeapTable::new(dir.path(), "persist", names, attrs);
    assert_eq!(reopened.select(None).unwrap(), vec![handle]);
    assert_eq!(reopened.project(handle).unwrap(), row(7, "persisted"));
    reopened.drop().unwrap();
}

#[test]
fn test_where_filter_across_pages() {
    let dir = tempdir().unwrap();
    let (names, attrs) = schema();
    let mut table: HeapTable<FileStore> = HeapTable::new(dir.path(), "filter", names, attrs);
    table.create().unwrap();

    let text = "padding to push rows across several pages".repeat(8);
    for a in 0..300 {
        table.insert(&row(a % 3, &text)).unwrap();
    }

    let where_clause = Row::from([("a".to_string(), Value::Int(1))]);
    let matching = table.select(Some(&where_clause)).unwrap();
    assert_eq!(matching.len(), 100);
    for handle in matching {
        assert_eq!(
            table.project(handle).unwrap().get("a"),
            Some(&Value::Int(1))
        );
    }

    table.drop().unwrap();
}
