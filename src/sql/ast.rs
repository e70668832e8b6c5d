//! Abstract syntax tree for the DDL subset.
//!
//! These are the statement shapes the executor dispatches on. The parser
//! produces them; nothing here touches storage.

use crate::datum::Identifier;

/// A SQL statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// CREATE TABLE or CREATE INDEX.
    Create(CreateStmt),
    /// DROP TABLE or DROP INDEX.
    Drop(DropStmt),
    /// SHOW TABLES, SHOW COLUMNS FROM, or SHOW INDEX FROM.
    Show(ShowStmt),
    /// A recognized statement class this engine does not execute
    /// (SELECT, INSERT, ...). Carries the leading keyword.
    Unsupported(String),
}

/// CREATE statement sub-kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateStmt {
    /// `CREATE TABLE [IF NOT EXISTS] name (columns)`.
    Table {
        /// Table name.
        name: Identifier,
        /// Skip creation when the table's file already exists.
        if_not_exists: bool,
        /// Column definitions in declaration order.
        columns: Vec<ColumnDef>,
    },
    /// `CREATE INDEX name ON table (columns)`.
    Index {
        /// Index name.
        name: Identifier,
        /// Table the index is declared on.
        table: Identifier,
        /// Indexed column names in key order.
        columns: Vec<Identifier>,
    },
}

/// DROP statement sub-kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropStmt {
    /// `DROP TABLE name`.
    Table {
        /// Table name.
        name: Identifier,
    },
    /// `DROP INDEX name ON table`.
    Index {
        /// Index name.
        name: Identifier,
        /// Table the index lives on.
        table: Identifier,
    },
}

/// SHOW statement sub-kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowStmt {
    /// `SHOW TABLES`.
    Tables,
    /// `SHOW COLUMNS FROM table`.
    Columns {
        /// Table to list columns for.
        table: Identifier,
    },
    /// `SHOW INDEX FROM table`.
    Index {
        /// Table to list indices for.
        table: Identifier,
    },
}

/// One column definition in a CREATE TABLE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name.
    pub name: Identifier,
    /// Declared type.
    pub data_type: AstType,
}

/// Column types the grammar accepts.
///
/// DOUBLE parses but the executor rejects it as an unknown type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AstType {
    /// 32-bit signed integer.
    Int,
    /// Bounded ASCII text.
    Text,
    /// Double-precision float; declared in the grammar, never executable.
    Double,
}

impl AstType {
    /// Returns the SQL spelling of the type.
    pub const fn as_str(self) -> &'static str {
        match self {
            AstType::Int => "INT",
            AstType::Text => "TEXT",
            AstType::Double => "DOUBLE",
        }
    }
}
