use std::fmt;
use std::io::Read;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The column type reported by the data source driver, independent of what
/// type the caller ultimately wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    Bool,
    Char,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal,
    Text,
    Bytes,
    DateTime,
    Uuid,
    Xml,
    Other,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::Bool => "bool",
            TypeTag::Char => "char",
            TypeTag::Int8 => "int8",
            TypeTag::Int16 => "int16",
            TypeTag::Int32 => "int32",
            TypeTag::Int64 => "int64",
            TypeTag::Float32 => "float32",
            TypeTag::Float64 => "float64",
            TypeTag::Decimal => "decimal",
            TypeTag::Text => "text",
            TypeTag::Bytes => "bytes",
            TypeTag::DateTime => "datetime",
            TypeTag::Uuid => "uuid",
            TypeTag::Xml => "xml",
            TypeTag::Other => "other",
        };
        f.write_str(name)
    }
}

/// The scalar type a record field asks a column to be coerced into.
///
/// `Other` has no registered coercion; such fields receive the untyped
/// value stringified as a last resort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetType {
    Bool,
    Char,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal,
    String,
    Bytes,
    DateTime,
    Uuid,
    Other,
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetType::Bool => "bool",
            TargetType::Char => "char",
            TargetType::Int8 => "int8",
            TargetType::Int16 => "int16",
            TargetType::Int32 => "int32",
            TargetType::Int64 => "int64",
            TargetType::Float32 => "float32",
            TargetType::Float64 => "float64",
            TargetType::Decimal => "decimal",
            TargetType::String => "string",
            TargetType::Bytes => "bytes",
            TargetType::DateTime => "datetime",
            TargetType::Uuid => "uuid",
            TargetType::Other => "other",
        };
        f.write_str(name)
    }
}

/// An untyped value handed out by a cursor's driver shim.
///
/// One variant per declared type, plus `Null` for database NULL, `Lob` for
/// stream-like binary handles (drained in full before use, single-shot),
/// and `Other` for unknown-but-present values the shim has already
/// stringified.
pub enum SqlValue {
    Null,
    Bool(bool),
    Char(char),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Decimal(Decimal),
    Text(String),
    Bytes(Vec<u8>),
    Lob(Box<dyn Read + Send>),
    DateTime(DateTime<Utc>),
    Uuid(Uuid),
    Xml(String),
    Other(String),
}

impl SqlValue {
    /// The tag this value would be declared as, or `None` for NULL.
    pub fn tag(&self) -> Option<TypeTag> {
        match self {
            SqlValue::Null => None,
            SqlValue::Bool(_) => Some(TypeTag::Bool),
            SqlValue::Char(_) => Some(TypeTag::Char),
            SqlValue::Int8(_) => Some(TypeTag::Int8),
            SqlValue::Int16(_) => Some(TypeTag::Int16),
            SqlValue::Int32(_) => Some(TypeTag::Int32),
            SqlValue::Int64(_) => Some(TypeTag::Int64),
            SqlValue::Float32(_) => Some(TypeTag::Float32),
            SqlValue::Float64(_) => Some(TypeTag::Float64),
            SqlValue::Decimal(_) => Some(TypeTag::Decimal),
            SqlValue::Text(_) => Some(TypeTag::Text),
            SqlValue::Bytes(_) | SqlValue::Lob(_) => Some(TypeTag::Bytes),
            SqlValue::DateTime(_) => Some(TypeTag::DateTime),
            SqlValue::Uuid(_) => Some(TypeTag::Uuid),
            SqlValue::Xml(_) => Some(TypeTag::Xml),
            SqlValue::Other(_) => Some(TypeTag::Other),
        }
    }

    /// Clone of every variant except `Lob`, whose handle cannot be copied.
    pub fn try_clone(&self) -> Option<SqlValue> {
        match self {
            SqlValue::Null => Some(SqlValue::Null),
            SqlValue::Bool(v) => Some(SqlValue::Bool(*v)),
            SqlValue::Char(v) => Some(SqlValue::Char(*v)),
            SqlValue::Int8(v) => Some(SqlValue::Int8(*v)),
            SqlValue::Int16(v) => Some(SqlValue::Int16(*v)),
            SqlValue::Int32(v) => Some(SqlValue::Int32(*v)),
            SqlValue::Int64(v) => Some(SqlValue::Int64(*v)),
            SqlValue::Float32(v) => Some(SqlValue::Float32(*v)),
            SqlValue::Float64(v) => Some(SqlValue::Float64(*v)),
            SqlValue::Decimal(v) => Some(SqlValue::Decimal(*v)),
            SqlValue::Text(v) => Some(SqlValue::Text(v.clone())),
            SqlValue::Bytes(v) => Some(SqlValue::Bytes(v.clone())),
            SqlValue::Lob(_) => None,
            SqlValue::DateTime(v) => Some(SqlValue::DateTime(*v)),
            SqlValue::Uuid(v) => Some(SqlValue::Uuid(*v)),
            SqlValue::Xml(v) => Some(SqlValue::Xml(v.clone())),
            SqlValue::Other(v) => Some(SqlValue::Other(v.clone())),
        }
    }
}

impl fmt::Debug for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("Null"),
            SqlValue::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            SqlValue::Char(v) => f.debug_tuple("Char").field(v).finish(),
            SqlValue::Int8(v) => f.debug_tuple("Int8").field(v).finish(),
            SqlValue::Int16(v) => f.debug_tuple("Int16").field(v).finish(),
            SqlValue::Int32(v) => f.debug_tuple("Int32").field(v).finish(),
            SqlValue::Int64(v) => f.debug_tuple("Int64").field(v).finish(),
            SqlValue::Float32(v) => f.debug_tuple("Float32").field(v).finish(),
            SqlValue::Float64(v) => f.debug_tuple("Float64").field(v).finish(),
            SqlValue::Decimal(v) => f.debug_tuple("Decimal").field(v).finish(),
            SqlValue::Text(v) => f.debug_tuple("Text").field(v).finish(),
            SqlValue::Bytes(v) => f.debug_tuple("Bytes").field(v).finish(),
            SqlValue::Lob(_) => f.write_str("Lob(..)"),
            SqlValue::DateTime(v) => f.debug_tuple("DateTime").field(v).finish(),
            SqlValue::Uuid(v) => f.debug_tuple("Uuid").field(v).finish(),
            SqlValue::Xml(v) => f.debug_tuple("Xml").field(v).finish(),
            SqlValue::Other(v) => f.debug_tuple("Other").field(v).finish(),
        }
    }
}

/// A coerced value ready to be assigned to a record field.
///
/// `Null` is the explicit "no value" marker a nullable field receives when
/// its column is NULL; non-nullable fields are simply left at their default.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Char(char),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Decimal(Decimal),
    String(String),
    Bytes(Vec<u8>),
    DateTime(DateTime<Utc>),
    Uuid(Uuid),
}

/// Byte order used to interpret a 16-byte binary column as a UUID.
///
/// Which one applies depends on the driver: a RAW(16) column written by an
/// application that stored RFC 4122 bytes wants `Rfc4122`, while drivers
/// that hand back .NET-style GUID bytes (first three fields little-endian)
/// want `Microsoft`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UuidByteOrder {
    Rfc4122,
    Microsoft,
}

/// Configuration for a conversion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadConfig {
    /// How 16-byte binary columns are mapped to UUIDs.
    pub uuid_byte_order: UuidByteOrder,
}

impl Default for ReadConfig {
    fn default() -> Self {
        ReadConfig {
            uuid_byte_order: UuidByteOrder::Rfc4122,
        }
    }
}
