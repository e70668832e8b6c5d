//! SQL front end for the DDL subset.
//!
//! The executor consumes a pre-built AST; this module supplies both the
//! AST types and a small hand-written lexer/parser covering exactly the
//! statements the executor implements: CREATE/DROP for tables and
//! indices and the three SHOW forms. Other statement classes tokenize
//! fine but parse to [`Statement::Unsupported`] so the executor can
//! answer `not implemented` instead of a syntax error.

mod ast;
mod error;
mod lexer;
mod parser;

pub use ast::{AstType, ColumnDef, CreateStmt, DropStmt, ShowStmt, Statement};
pub use error::SyntaxError;
pub use lexer::{Keyword, Lexer, Token};
pub use parser::{parse, Parser};
