//! Tokenizer for the DDL subset.

use super::error::SyntaxError;

/// Keywords of the DDL grammar, matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Create,
    Table,
    Index,
    If,
    Not,
    Exists,
    Drop,
    On,
    Show,
    Tables,
    Columns,
    From,
    Int,
    Text,
    Double,
}

impl Keyword {
    fn from_ident(ident: &str) -> Option<Self> {
        let upper = ident.to_ascii_uppercase();
        let kw = match upper.as_str() {
            "CREATE" => Keyword::Create,
            "TABLE" => Keyword::Table,
            "INDEX" => Keyword::Index,
            "IF" => Keyword::If,
            "NOT" => Keyword::Not,
            "EXISTS" => Keyword::Exists,
            "DROP" => Keyword::Drop,
            "ON" => Keyword::On,
            "SHOW" => Keyword::Show,
            "TABLES" => Keyword::Tables,
            "COLUMNS" => Keyword::Columns,
            "FROM" => Keyword::From,
            "INT" => Keyword::Int,
            "TEXT" => Keyword::Text,
            "DOUBLE" => Keyword::Double,
            _ => return None,
        };
        Some(kw)
    }

    /// Returns the canonical upper-case spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Keyword::Create => "CREATE",
            Keyword::Table => "TABLE",
            Keyword::Index => "INDEX",
            Keyword::If => "IF",
            Keyword::Not => "NOT",
            Keyword::Exists => "EXISTS",
            Keyword::Drop => "DROP",
            Keyword::On => "ON",
            Keyword::Show => "SHOW",
            Keyword::Tables => "TABLES",
            Keyword::Columns => "COLUMNS",
            Keyword::From => "FROM",
            Keyword::Int => "INT",
            Keyword::Text => "TEXT",
            Keyword::Double => "DOUBLE",
        }
    }
}

/// One token with its byte position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A grammar keyword.
    Keyword(Keyword, usize),
    /// An identifier (table, column, or index name).
    Ident(String, usize),
    /// `(`
    LParen(usize),
    /// `)`
    RParen(usize),
    /// `,`
    Comma(usize),
    /// `;`
    Semicolon(usize),
    /// End of input.
    Eof(usize),
}

impl Token {
    /// Returns the token's byte position.
    pub fn pos(&self) -> usize {
        match self {
            Token::Keyword(_, pos)
            | Token::Ident(_, pos)
            | Token::LParen(pos)
            | Token::RParen(pos)
            | Token::Comma(pos)
            | Token::Semicolon(pos)
            | Token::Eof(pos) => *pos,
        }
    }

    /// Returns a short human-readable description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Keyword(kw, _) => kw.as_str().to_string(),
            Token::Ident(name, _) => name.clone(),
            Token::LParen(_) => "(".to_string(),
            Token::RParen(_) => ")".to_string(),
            Token::Comma(_) => ",".to_string(),
            Token::Semicolon(_) => ";".to_string(),
            Token::Eof(_) => "end of input".to_string(),
        }
    }
}

/// Hand-written tokenizer: identifiers, keywords, and the four
/// punctuation marks the grammar needs.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over `input` (ASCII assumed).
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    /// Tokenizes the whole input; the result always ends with `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = matches!(token, Token::Eof(_));
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, SyntaxError> {
        while self.current().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
        let start = self.pos;
        let Some(c) = self.current() else {
            return Ok(Token::Eof(start));
        };
        match c {
            b'(' => {
                self.pos += 1;
                Ok(Token::LParen(start))
            }
            b')' => {
                self.pos += 1;
                Ok(Token::RParen(start))
            }
            b',' => {
                self.pos += 1;
                Ok(Token::Comma(start))
            }
            b';' => {
                self.pos += 1;
                Ok(Token::Semicolon(start))
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                while self
                    .current()
                    .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
                {
                    self.pos += 1;
                }
                let ident = std::str::from_utf8(&self.input[start..self.pos])
                    .expect("ASCII slice")
                    .to_string();
                match Keyword::from_ident(&ident) {
                    Some(kw) => Ok(Token::Keyword(kw, start)),
                    None => Ok(Token::Ident(ident, start)),
                }
            }
            c => Err(SyntaxError::new(
                format!("unexpected character {:?}", c as char),
                start,
            )),
        }
    }

    fn current(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }
}
