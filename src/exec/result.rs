//! Query results and their text rendering.

use std::fmt;

use crate::datum::{ColumnAttributes, ColumnNames, Row};

/// Everything a statement execution hands back to the caller.
///
/// Statements without result sets (DDL) carry only a message; SHOW
/// statements also carry header columns and rows. The `Display` rendering
/// is the REPL's table format: space-separated header, a horizontal rule,
/// space-separated row values, then the trailing message.
#[derive(Debug)]
pub struct QueryResult {
    column_names: Option<ColumnNames>,
    column_attributes: Option<ColumnAttributes>,
    rows: Option<Vec<Row>>,
    message: String,
}

impl QueryResult {
    /// Creates a message-only result.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            column_names: None,
            column_attributes: None,
            rows: None,
            message: message.into(),
        }
    }

    /// Creates a result with a header and rows.
    pub fn with_rows(
        column_names: ColumnNames,
        column_attributes: ColumnAttributes,
        rows: Vec<Row>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            column_names: Some(column_names),
            column_attributes: Some(column_attributes),
            rows: Some(rows),
            message: message.into(),
        }
    }

    /// Returns the header column names, if any.
    pub fn column_names(&self) -> Option<&ColumnNames> {
        self.column_names.as_ref()
    }

    /// Returns the header column attributes, if any.
    pub fn column_attributes(&self) -> Option<&ColumnAttributes> {
        self.column_attributes.as_ref()
    }

    /// Returns the result rows, if any.
    pub fn rows(&self) -> Option<&Vec<Row>> {
        self.rows.as_ref()
    }

    /// Returns the trailing message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(column_names) = &self.column_names {
            for name in column_names {
                write!(f, "{} ", name)?;
            }
            writeln!(f)?;
            write!(f, "+")?;
            for _ in column_names {
                write!(f, "----------+")?;
            }
            writeln!(f)?;
            for row in self.rows.iter().flatten() {
                for name in column_names {
                    match row.get(name) {
                        Some(value) => write!(f, "{} ", value)?,
                        None => write!(f, "??? ")?,
                    }
                }
                writeln!(f)?;
            }
        }
        write!(f, "{}", self.message)
    }
}
