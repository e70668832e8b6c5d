//! Recursive-descent parser for the DDL subset.

use super::ast::{AstType, ColumnDef, CreateStmt, DropStmt, ShowStmt, Statement};
use super::error::SyntaxError;
use super::lexer::{Keyword, Lexer, Token};
use crate::datum::Identifier;

/// Statement classes the grammar recognizes but the engine does not run.
const OTHER_STATEMENTS: [&str; 9] = [
    "SELECT", "INSERT", "UPDATE", "DELETE", "BEGIN", "COMMIT", "ROLLBACK", "SET", "EXPLAIN",
];

/// Parses one statement from SQL text.
pub fn parse(input: &str) -> Result<Statement, SyntaxError> {
    Parser::new(Lexer::new(input).tokenize()?).parse_statement()
}

/// Token-stream parser; one statement per input.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Creates a parser over a token stream ending in `Eof`.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parses the statement and requires nothing but an optional trailing
    /// semicolon after it.
    pub fn parse_statement(&mut self) -> Result<Statement, SyntaxError> {
        let stmt = match self.peek().clone() {
            Token::Keyword(Keyword::Create, _) => self.parse_create()?,
            Token::Keyword(Keyword::Drop, _) => self.parse_drop()?,
            Token::Keyword(Keyword::Show, _) => self.parse_show()?,
            Token::Ident(word, _) if is_other_statement(&word) => {
                while !matches!(self.peek(), Token::Eof(_)) {
                    self.advance();
                }
                Statement::Unsupported(word.to_ascii_uppercase())
            }
            t => {
                return Err(SyntaxError::unexpected(
                    "a statement",
                    &t.describe(),
                    t.pos(),
                ))
            }
        };
        if matches!(self.peek(), Token::Semicolon(_)) {
            self.advance();
        }
        match self.peek() {
            Token::Eof(_) => Ok(stmt),
            t => Err(SyntaxError::unexpected(
                "end of statement",
                &t.describe(),
                t.pos(),
            )),
        }
    }

    fn parse_create(&mut self) -> Result<Statement, SyntaxError> {
        self.expect_keyword(Keyword::Create)?;
        match self.peek().clone() {
            Token::Keyword(Keyword::Table, _) => {
                self.advance();
                let if_not_exists = self.accept_if_not_exists()?;
                let name = self.expect_ident("table name")?;
                self.expect_lparen()?;
                let mut columns = vec![self.parse_column_def()?];
                while matches!(self.peek(), Token::Comma(_)) {
                    self.advance();
                    columns.push(self.parse_column_def()?);
                }
                self.expect_rparen()?;
                Ok(Statement::Create(CreateStmt::Table {
                    name,
                    if_not_exists,
                    columns,
                }))
            }
            Token::Keyword(Keyword::Index, _) => {
                self.advance();
                let name = self.expect_ident("index name")?;
                self.expect_keyword(Keyword::On)?;
                let table = self.expect_ident("table name")?;
                self.expect_lparen()?;
                let mut columns = vec![self.expect_ident("column name")?];
                while matches!(self.peek(), Token::Comma(_)) {
                    self.advance();
                    columns.push(self.expect_ident("column name")?);
                }
                self.expect_rparen()?;
                Ok(Statement::Create(CreateStmt::Index {
                    name,
                    table,
                    columns,
                }))
            }
            t => Err(SyntaxError::unexpected(
                "TABLE or INDEX",
                &t.describe(),
                t.pos(),
            )),
        }
    }

    fn parse_drop(&mut self) -> Result<Statement, SyntaxError> {
        self.expect_keyword(Keyword::Drop)?;
        match self.peek().clone() {
            Token::Keyword(Keyword::Table, _) => {
                self.advance();
                let name = self.expect_ident("table name")?;
                Ok(Statement::Drop(DropStmt::Table { name }))
            }
            Token::Keyword(Keyword::Index, _) => {
                self.advance();
                let name = self.expect_ident("index name")?;
                self.expect_keyword(Keyword::On)?;
                let table = self.expect_ident("table name")?;
                Ok(Statement::Drop(DropStmt::Index { name, table }))
            }
            t => Err(SyntaxError::unexpected(
                "TABLE or INDEX",
                &t.describe(),
                t.pos(),
            )),
        }
    }

    fn parse_show(&mut self) -> Result<Statement, SyntaxError> {
        self.expect_keyword(Keyword::Show)?;
        match self.peek().clone() {
            Token::Keyword(Keyword::Tables, _) => {
                self.advance();
                Ok(Statement::Show(ShowStmt::Tables))
            }
            Token::Keyword(Keyword::Columns, _) => {
                self.advance();
                self.expect_keyword(Keyword::From)?;
                let table = self.expect_ident("table name")?;
                Ok(Statement::Show(ShowStmt::Columns { table }))
            }
            Token::Keyword(Keyword::Index, _) => {
                self.advance();
                self.expect_keyword(Keyword::From)?;
                let table = self.expect_ident("table name")?;
                Ok(Statement::Show(ShowStmt::Index { table }))
            }
            t => Err(SyntaxError::unexpected(
                "TABLES, COLUMNS, or INDEX",
                &t.describe(),
                t.pos(),
            )),
        }
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef, SyntaxError> {
        let name = self.expect_ident("column name")?;
        let data_type = match self.peek().clone() {
            Token::Keyword(Keyword::Int, _) => AstType::Int,
            Token::Keyword(Keyword::Text, _) => AstType::Text,
            Token::Keyword(Keyword::Double, _) => AstType::Double,
            t => {
                return Err(SyntaxError::unexpected(
                    "a column type",
                    &t.describe(),
                    t.pos(),
                ))
            }
        };
        self.advance();
        Ok(ColumnDef { name, data_type })
    }

    fn accept_if_not_exists(&mut self) -> Result<bool, SyntaxError> {
        if matches!(self.peek(), Token::Keyword(Keyword::If, _)) {
            self.advance();
            self.expect_keyword(Keyword::Not)?;
            self.expect_keyword(Keyword::Exists)?;
            return Ok(true);
        }
        Ok(false)
    }

    fn peek(&self) -> &Token {
        // The token stream always ends with Eof, so pos stays in range.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), SyntaxError> {
        match self.peek() {
            Token::Keyword(kw, _) if *kw == keyword => {
                self.advance();
                Ok(())
            }
            t => Err(SyntaxError::unexpected(
                keyword.as_str(),
                &t.describe(),
                t.pos(),
            )),
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<Identifier, SyntaxError> {
        match self.peek().clone() {
            Token::Ident(name, _) => {
                self.advance();
                Ok(name)
            }
            t => Err(SyntaxError::unexpected(what, &t.describe(), t.pos())),
        }
    }

    fn expect_lparen(&mut self) -> Result<(), SyntaxError> {
        match self.peek() {
            Token::LParen(_) => {
                self.advance();
                Ok(())
            }
            t => Err(SyntaxError::unexpected("(", &t.describe(), t.pos())),
        }
    }

    fn expect_rparen(&mut self) -> Result<(), SyntaxError> {
        match self.peek() {
            Token::RParen(_) => {
                self.advance();
                Ok(())
            }
            t => Err(SyntaxError::unexpected(")", &t.describe(), t.pos())),
        }
    }
}

fn is_other_statement(word: &str) -> bool {
    let upper = word.to_ascii_uppercase();
    OTHER_STATEMENTS.contains(&upper.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_table() {
        let stmt = parse("CREATE TABLE foo (x INT, y TEXT)").unwrap();
        assert_eq!(
            stmt,
            Statement::Create(CreateStmt::Table {
                name: "foo".to_string(),
                if_not_exists: false,
                columns: vec![
                    ColumnDef {
                        name: "x".to_string(),
                        data_type: AstType::Int
                    },
                    ColumnDef {
                        name: "y".to_string(),
                        data_type: AstType::Text
                    },
                ],
            })
        );
    }

    #[test]
    fn test_parse_create_table_if_not_exists() {
        let stmt = parse("create table if not exists t (a int);").unwrap();
        assert!(matches!(
            stmt,
            Statement::Create(CreateStmt::Table {
                if_not_exists: true,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_double_is_accepted_by_grammar() {
        let stmt = parse("CREATE TABLE t (d DOUBLE)").unwrap();
        assert!(matches!(
            stmt,
            Statement::Create(CreateStmt::Table { columns, .. })
                if columns[0].data_type == AstType::Double
        ));
    }

    #[test]
    fn test_parse_create_index() {
        let stmt = parse("CREATE INDEX ix ON foo (x, y)").unwrap();
        assert_eq!(
            stmt,
            Statement::Create(CreateStmt::Index {
                name: "ix".to_string(),
                table: "foo".to_string(),
                columns: vec!["x".to_string(), "y".to_string()],
            })
        );
    }

    #[test]
    fn test_parse_drop() {
        assert_eq!(
            parse("DROP TABLE foo").unwrap(),
            Statement::Drop(DropStmt::Table {
                name: "foo".to_string()
            })
        );
        assert_eq!(
            parse("DROP INDEX ix ON foo").unwrap(),
            Statement::Drop(DropStmt::Index {
                name: "ix".to_string(),
                table: "foo".to_string()
            })
        );
    }

    #[test]
    fn test_parse_show() {
        assert_eq!(
            parse("SHOW TABLES;").unwrap(),
            Statement::Show(ShowStmt::Tables)
        );
        assert_eq!(
            parse("SHOW COLUMNS FROM foo").unwrap(),
            Statement::Show(ShowStmt::Columns {
                table: "foo".to_string()
            })
        );
        assert_eq!(
            parse("SHOW INDEX FROM foo").unwrap(),
            Statement::Show(ShowStmt::Index {
                table: "foo".to_string()
            })
        );
    }

    #[test]
    fn test_parse_unsupported_statement_class() {
        assert_eq!(
            parse("SELECT x FROM foo").unwrap(),
            Statement::Unsupported("SELECT".to_string())
        );
        assert_eq!(
            parse("insert").unwrap(),
            Statement::Unsupported("INSERT".to_string())
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("").is_err());
        assert!(parse("CREATE VIEW v").is_err());
        assert!(parse("CREATE TABLE t ()").is_err());
        assert!(parse("CREATE TABLE t (x INT) garbage").is_err());
        assert!(parse("DROP INDEX ix").is_err());
        assert!(parse("SHOW COLUMNS foo").is_err());
    }

    #[test]
    fn test_catalog_names_are_identifiers() {
        assert_eq!(
            parse("SHOW COLUMNS FROM _tables").unwrap(),
            Statement::Show(ShowStmt::Columns {
                table: "_tables".to_string()
            })
        );
    }
}
