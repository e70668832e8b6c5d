use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use heapdb::datum::{ColumnAttribute, DataType, Row, Value};
use heapdb::exec::SqlExec;
use heapdb::heap::HeapTable;
use heapdb::sql::parse;
use heapdb::store::FileStore;

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (Some(env_dir), None) = (args.next(), args.next()) else {
        eprintln!("usage: heapdb <db-environment-path>");
        return ExitCode::FAILURE;
    };
    let env_dir = PathBuf::from(env_dir);
    if let Err(e) = std::fs::create_dir_all(&env_dir) {
        eprintln!("cannot open environment {}: {}", env_dir.display(), e);
        return ExitCode::FAILURE;
    }

    let exec: SqlExec<FileStore> = match SqlExec::open(&env_dir) {
        Ok(exec) => exec,
        Err(e) => {
            eprintln!("cannot open environment {}: {}", env_dir.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("SQL> ");
        let _ = std::io::stdout().flush();
        let Some(Ok(line)) = lines.next() else {
            break;
        };
        let line = line.trim();
        match line {
            "" => continue,
            "quit" => break,
            "test" => {
                let passed = test_heap_storage(&env_dir);
                println!("test_heap_storage: {}", if passed { "ok" } else { "failed" });
            }
            _ => match parse(line) {
                Ok(statement) => match exec.execute(&statement) {
                    Ok(result) => println!("{}", result),
                    Err(e) => println!("Error: {}", e),
                },
                Err(e) => println!("Error: {}", e),
            },
        }
    }
    ExitCode::SUCCESS
}

/// Smoke test for the storage engine: create, insert, select, project,
/// drop, all against a throwaway table in the live environment.
fn test_heap_storage(env_dir: &Path) -> bool {
    let column_names = vec!["a".to_string(), "b".to_string()];
    let column_attributes = vec![
        ColumnAttribute::new(DataType::Int),
        ColumnAttribute::new(DataType::Text),
    ];

    let mut table: HeapTable<FileStore> = HeapTable::new(
        env_dir,
        "_test_data",
        column_names,
        column_attributes,
    );
    if table.create_if_not_exists().is_err() {
        return false;
    }

    let row = Row::from([
        ("a".to_string(), Value::Int(12)),
        ("b".to_string(), Value::from("Hello!")),
    ]);
    let passed = (|| {
        let handle = table.insert(&row)?;
        let handles = table.select(None)?;
        if !handles.contains(&handle) {
            return Ok(false);
        }
        Ok::<bool, heapdb::heap::RelationError>(table.project(handle)? == row)
    })()
    .unwrap_or(false);

    table.drop().is_ok() && passed
}
