//! Database data types, values, and rows.
//!
//! This module defines the canonical type system and value representation
//! for the database core. [`DataType`] and [`ColumnAttribute`] describe
//! columns, [`Value`] is a single typed column value with serialization
//! support, and [`Row`] is the name-keyed tuple the rest of the system
//! passes around.

use std::collections::HashMap;
use std::fmt;

use bytes::{Buf, BufMut};

/// Longest TEXT payload expressible with a u16 length prefix.
pub const MAX_TEXT_LEN: usize = u16::MAX as usize;

/// A table, column, or index name.
pub type Identifier = String;

/// Ordered column names of a schema.
pub type ColumnNames = Vec<Identifier>;

/// Ordered column attributes of a schema, parallel to [`ColumnNames`].
pub type ColumnAttributes = Vec<ColumnAttribute>;

/// A row: unordered mapping from column name to value, keys unique.
///
/// Insertion order is irrelevant; the marshaling order always comes from
/// the table schema, never from the map.
pub type Row = HashMap<Identifier, Value>;

/// Errors from value marshaling/unmarshaling.
#[derive(Debug)]
pub enum MarshalError {
    /// The value variant does not match the column attribute.
    TypeMismatch {
        /// Column data type expected by the schema.
        expected: DataType,
        /// Data type of the value actually supplied.
        found: DataType,
    },
    /// TEXT value longer than the u16 length prefix allows.
    TextTooLong {
        /// Byte length of the offending string.
        len: usize,
    },
    /// Buffer ended inside a value.
    Truncated {
        /// Bytes required to finish the read.
        required: usize,
        /// Bytes actually remaining.
        available: usize,
    },
}

impl fmt::Display for MarshalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarshalError::TypeMismatch { expected, found } => {
                write!(f, "cannot marshal {} value into {} column", found, expected)
            }
            MarshalError::TextTooLong { len } => {
                write!(
                    f,
                    "text of {} bytes exceeds the {} byte limit",
                    len, MAX_TEXT_LEN
                )
            }
            MarshalError::Truncated {
                required,
                available,
            } => {
                write!(
                    f,
                    "record truncated: need {} bytes, have {}",
                    required, available
                )
            }
        }
    }
}

impl std::error::Error for MarshalError {}

/// Database data type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 32-bit signed integer.
    Int,
    /// Bounded ASCII string, length <= 65535.
    Text,
    /// Boolean, stored as 0/1 in an INT slot.
    ///
    /// Representable in values and catalog schemas, but not producible
    /// from SQL column declarations.
    Boolean,
}

impl DataType {
    /// Returns the SQL display name stored in `_columns.data_type`.
    pub const fn sql_name(self) -> &'static str {
        match self {
            DataType::Int => "INT",
            DataType::Text => "TEXT",
            DataType::Boolean => "BOOLEAN",
        }
    }

    /// Parses a `_columns.data_type` string.
    ///
    /// Only `"INT"` and `"TEXT"` ever appear on disk; `"BOOLEAN"` columns
    /// exist solely in hard-coded catalog schemas.
    pub fn from_sql_name(name: &str) -> Option<Self> {
        match name {
            "INT" => Some(DataType::Int),
            "TEXT" => Some(DataType::Text),
            "BOOLEAN" => Some(DataType::Boolean),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// Per-column schema attribute.
///
/// Currently just the data type; further attributes (nullability, defaults)
/// are reserved for future use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnAttribute {
    data_type: DataType,
}

impl ColumnAttribute {
    /// Creates an attribute for the given data type.
    pub const fn new(data_type: DataType) -> Self {
        Self { data_type }
    }

    /// Returns the column data type.
    pub const fn data_type(&self) -> DataType {
        self.data_type
    }
}

/// A typed database value.
///
/// Equality is structural: tag and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// 32-bit signed integer.
    Int(i32),
    /// Bounded ASCII string.
    Text(String),
    /// Boolean.
    Bool(bool),
}

impl Value {
    /// Returns the data type tag for this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::Int,
            Value::Text(_) => DataType::Text,
            Value::Bool(_) => DataType::Boolean,
        }
    }

    /// Returns the marshaled size in bytes.
    pub fn marshaled_size(&self) -> usize {
        match self {
            Value::Int(_) | Value::Bool(_) => 4,
            Value::Text(s) => 2 + s.len(),
        }
    }

    /// Appends the on-disk form of this value to `buf`.
    ///
    /// INT is a 4-byte little-endian i32; TEXT is a u16 little-endian
    /// length followed by the raw bytes (ASCII assumed); BOOLEAN is 0/1
    /// in an INT slot.
    ///
    /// # Errors
    ///
    /// Returns `MarshalError::TypeMismatch` if the value variant does not
    /// match `attr`, and `MarshalError::TextTooLong` for oversized TEXT.
    pub fn marshal(
        &self,
        attr: &ColumnAttribute,
        buf: &mut impl BufMut,
    ) -> Result<(), MarshalError> {
        match (attr.data_type(), self) {
            (DataType::Int, Value::Int(n)) => {
                buf.put_i32_le(*n);
                Ok(())
            }
            (DataType::Text, Value::Text(s)) => {
                if s.len() > MAX_TEXT_LEN {
                    return Err(MarshalError::TextTooLong { len: s.len() });
                }
                buf.put_u16_le(s.len() as u16);
                buf.put_slice(s.as_bytes());
                Ok(())
            }
            (DataType::Boolean, Value::Bool(b)) => {
                buf.put_i32_le(i32::from(*b));
                Ok(())
            }
            (expected, value) => Err(MarshalError::TypeMismatch {
                expected,
                found: value.data_type(),
            }),
        }
    }

    /// Reads one value of the attribute's type from `buf`, advancing it.
    ///
    /// # Errors
    ///
    /// Returns `MarshalError::Truncated` if `buf` ends inside the value.
    pub fn unmarshal(attr: &ColumnAttribute, buf: &mut impl Buf) -> Result<Self, MarshalError> {
        match attr.data_type() {
            DataType::Int => {
                ensure_remaining(buf, 4)?;
                Ok(Value::Int(buf.get_i32_le()))
            }
            DataType::Text => {
                ensure_remaining(buf, 2)?;
                let len = buf.get_u16_le() as usize;
                ensure_remaining(buf, len)?;
                let mut raw = vec![0u8; len];
                buf.copy_to_slice(&mut raw);
                // ASCII assumed throughout, so the lossy conversion is exact.
                Ok(Value::Text(String::from_utf8_lossy(&raw).into_owned()))
            }
            DataType::Boolean => {
                ensure_remaining(buf, 4)?;
                Ok(Value::Bool(buf.get_i32_le() != 0))
            }
        }
    }
}

fn ensure_remaining(buf: &impl Buf, required: usize) -> Result<(), MarshalError> {
    if buf.remaining() < required {
        return Err(MarshalError::Truncated {
            required,
            available: buf.remaining(),
        });
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "\"{}\"", s),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;

    fn int_attr() -> ColumnAttribute {
        ColumnAttribute::new(DataType::Int)
    }

    fn text_attr() -> ColumnAttribute {
        ColumnAttribute::new(DataType::Text)
    }

    fn bool_attr() -> ColumnAttribute {
        ColumnAttribute::new(DataType::Boolean)
    }

    #[test]
    fn test_data_type_sql_name_roundtrip() {
        for ty in [DataType::Int, DataType::Text, DataType::Boolean] {
            assert_eq!(DataType::from_sql_name(ty.sql_name()), Some(ty));
        }
        assert_eq!(DataType::from_sql_name("DOUBLE"), None);
    }

    #[test]
    fn test_value_equality_is_structural() {
        assert_eq!(Value::Int(7), Value::Int(7));
        assert_ne!(Value::Int(0), Value::Bool(false));
        assert_ne!(Value::Text("7".into()), Value::Int(7));
    }

    #[test]
    fn test_marshal_int() {
        let mut buf = BytesMut::new();
        Value::Int(-2).marshal(&int_attr(), &mut buf).unwrap();
        assert_eq!(&buf[..], (-2i32).to_le_bytes());

        let parsed = Value::unmarshal(&int_attr(), &mut buf.freeze()).unwrap();
        assert_eq!(parsed, Value::Int(-2));
    }

    #[test]
    fn test_marshal_text() {
        let mut buf = BytesMut::new();
        Value::Text("Hello!".into())
            .marshal(&text_attr(), &mut buf)
            .unwrap();
        assert_eq!(&buf[..2], 6u16.to_le_bytes());
        assert_eq!(&buf[2..], b"Hello!");

        let parsed = Value::unmarshal(&text_attr(), &mut buf.freeze()).unwrap();
        assert_eq!(parsed, Value::Text("Hello!".into()));
    }

    #[test]
    fn test_marshal_bool_uses_int_slot() {
        let mut buf = BytesMut::new();
        Value::Bool(true).marshal(&bool_attr(), &mut buf).unwrap();
        assert_eq!(&buf[..], 1i32.to_le_bytes());

        let parsed = Value::unmarshal(&bool_attr(), &mut buf.freeze()).unwrap();
        assert_eq!(parsed, Value::Bool(true));
    }

    #[test]
    fn test_marshal_type_mismatch() {
        let mut buf = BytesMut::new();
        let err = Value::Text("x".into()).marshal(&int_attr(), &mut buf);
        assert!(matches!(
            err,
            Err(MarshalError::TypeMismatch {
                expected: DataType::Int,
                found: DataType::Text,
            })
        ));
    }

    #[test]
    fn test_marshal_text_too_long() {
        let mut buf = BytesMut::new();
        let huge = "x".repeat(MAX_TEXT_LEN + 1);
        assert!(matches!(
            Value::Text(huge).marshal(&text_attr(), &mut buf),
            Err(MarshalError::TextTooLong { .. })
        ));
    }

    #[test]
    fn test_unmarshal_truncated() {
        let mut buf = &[0u8, 0][..];
        assert!(matches!(
            Value::unmarshal(&int_attr(), &mut buf),
            Err(MarshalError::Truncated {
                required: 4,
                available: 2
            })
        ));
    }

    #[test]
    fn test_empty_text_roundtrip() {
        let mut buf = BytesMut::new();
        Value::Text(String::new())
            .marshal(&text_attr(), &mut buf)
            .unwrap();
        assert_eq!(buf.len(), 2);
        let parsed = Value::unmarshal(&text_attr(), &mut buf.freeze()).unwrap();
        assert_eq!(parsed, Value::Text(String::new()));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Text("hi".into()).to_string(), "\"hi\"");
        assert_eq!(Value::Bool(false).to_string(), "false");
    }
}
