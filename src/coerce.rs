//! Type coercion registry
//!
//! Pure functions from `(untyped value, declared type)` to one target
//! scalar, one family per target type. Each function is defined only for
//! the declared-type subset it explicitly handles and fails with a
//! [`ConversionError`] on anything else. NULL never reaches the registry:
//! callers test for NULL first and only hand over non-null values.
//!
//! [`json_value`] is the declared-type-indexed dispatch shared by both JSON
//! output paths; the record mapper goes through [`field_value`] instead,
//! which dispatches on the caller's target type.

use std::io::Read;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::{Number, Value};
use uuid::Uuid;

use crate::error::ConversionError;
use crate::types::{FieldValue, ReadConfig, SqlValue, TargetType, TypeTag, UuidByteOrder};

/// Datetime text formats tried after RFC 3339, locale-invariant.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

fn unsupported(column: usize, declared: TypeTag, target: TargetType) -> ConversionError {
    ConversionError::Unsupported {
        column,
        declared,
        target,
    }
}

fn parse_failed(
    column: usize,
    declared: TypeTag,
    target: TargetType,
    raw: impl Into<String>,
) -> ConversionError {
    ConversionError::Parse {
        column,
        declared,
        target,
        raw: raw.into(),
    }
}

/// bool: native bool, any integer width (`!= 0`), or the text tokens
/// `1/TRUE/Y` and `0/FALSE/N` (trimmed, case-insensitive). Any other text
/// fails; there are no arbitrary truthy strings.
pub fn to_bool(value: SqlValue, declared: TypeTag, column: usize) -> Result<bool, ConversionError> {
    match value {
        SqlValue::Bool(v) => Ok(v),
        SqlValue::Int8(v) => Ok(v != 0),
        SqlValue::Int16(v) => Ok(v != 0),
        SqlValue::Int32(v) => Ok(v != 0),
        SqlValue::Int64(v) => Ok(v != 0),
        SqlValue::Text(s) => bool_from_text(&s, declared, column),
        SqlValue::Char(c) => bool_from_text(&c.to_string(), declared, column),
        _ => Err(unsupported(column, declared, TargetType::Bool)),
    }
}

fn bool_from_text(raw: &str, declared: TypeTag, column: usize) -> Result<bool, ConversionError> {
    match raw.trim().to_uppercase().as_str() {
        "1" | "TRUE" | "Y" => Ok(true),
        "0" | "FALSE" | "N" => Ok(false),
        _ => Err(parse_failed(column, declared, TargetType::Bool, raw)),
    }
}

/// UUID: native UUID, a 16-byte binary value interpreted per the configured
/// byte order, or standard UUID text form.
pub fn to_uuid(
    value: SqlValue,
    declared: TypeTag,
    column: usize,
    config: &ReadConfig,
) -> Result<Uuid, ConversionError> {
    match value {
        SqlValue::Uuid(v) => Ok(v),
        SqlValue::Bytes(bytes) => uuid_from_bytes(&bytes, config.uuid_byte_order, declared, column),
        SqlValue::Text(s) => Uuid::parse_str(s.trim())
            .map_err(|_| parse_failed(column, declared, TargetType::Uuid, s)),
        _ => Err(unsupported(column, declared, TargetType::Uuid)),
    }
}

fn uuid_from_bytes(
    bytes: &[u8],
    order: UuidByteOrder,
    declared: TypeTag,
    column: usize,
) -> Result<Uuid, ConversionError> {
    let arr: [u8; 16] = bytes.try_into().map_err(|_| {
        parse_failed(
            column,
            declared,
            TargetType::Uuid,
            format!("{}-byte binary value", bytes.len()),
        )
    })?;
    Ok(match order {
        UuidByteOrder::Rfc4122 => Uuid::from_bytes(arr),
        UuidByteOrder::Microsoft => Uuid::from_bytes_le(arr),
    })
}

/// datetime: native datetime, a 64-bit integer as Unix epoch milliseconds
/// (UTC), or a locale-invariant text form (RFC 3339, then the fixed format
/// list, then a bare date at midnight).
pub fn to_datetime(
    value: SqlValue,
    declared: TypeTag,
    column: usize,
) -> Result<DateTime<Utc>, ConversionError> {
    match value {
        SqlValue::DateTime(v) => Ok(v),
        SqlValue::Int64(ms) => Utc.timestamp_millis_opt(ms).single().ok_or_else(|| {
            parse_failed(column, declared, TargetType::DateTime, ms.to_string())
        }),
        SqlValue::Text(s) => datetime_from_text(&s, declared, column),
        _ => Err(unsupported(column, declared, TargetType::DateTime)),
    }
}

fn datetime_from_text(
    raw: &str,
    declared: TypeTag,
    column: usize,
) -> Result<DateTime<Utc>, ConversionError> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(parse_failed(column, declared, TargetType::DateTime, raw))
}

// Numeric targets take the exact declared width only; a mismatched width is
// a conversion failure, not an implicit widening.

pub fn to_i8(value: SqlValue, declared: TypeTag, column: usize) -> Result<i8, ConversionError> {
    match value {
        SqlValue::Int8(v) => Ok(v),
        _ => Err(unsupported(column, declared, TargetType::Int8)),
    }
}

pub fn to_i16(value: SqlValue, declared: TypeTag, column: usize) -> Result<i16, ConversionError> {
    match value {
        SqlValue::Int16(v) => Ok(v),
        _ => Err(unsupported(column, declared, TargetType::Int16)),
    }
}

pub fn to_i32(value: SqlValue, declared: TypeTag, column: usize) -> Result<i32, ConversionError> {
    match value {
        SqlValue::Int32(v) => Ok(v),
        _ => Err(unsupported(column, declared, TargetType::Int32)),
    }
}

pub fn to_i64(value: SqlValue, declared: TypeTag, column: usize) -> Result<i64, ConversionError> {
    match value {
        SqlValue::Int64(v) => Ok(v),
        _ => Err(unsupported(column, declared, TargetType::Int64)),
    }
}

pub fn to_f32(value: SqlValue, declared: TypeTag, column: usize) -> Result<f32, ConversionError> {
    match value {
        SqlValue::Float32(v) => Ok(v),
        _ => Err(unsupported(column, declared, TargetType::Float32)),
    }
}

pub fn to_f64(value: SqlValue, declared: TypeTag, column: usize) -> Result<f64, ConversionError> {
    match value {
        SqlValue::Float64(v) => Ok(v),
        _ => Err(unsupported(column, declared, TargetType::Float64)),
    }
}

pub fn to_decimal(
    value: SqlValue,
    declared: TypeTag,
    column: usize,
) -> Result<Decimal, ConversionError> {
    match value {
        SqlValue::Decimal(v) => Ok(v),
        _ => Err(unsupported(column, declared, TargetType::Decimal)),
    }
}

/// string: text identity, char as a single-character string, XML in its
/// serialized text form.
pub fn to_string_value(
    value: SqlValue,
    declared: TypeTag,
    column: usize,
) -> Result<String, ConversionError> {
    match value {
        SqlValue::Text(s) => Ok(s),
        SqlValue::Char(c) => Ok(c.to_string()),
        SqlValue::Xml(s) => Ok(s),
        _ => Err(unsupported(column, declared, TargetType::String)),
    }
}

pub fn to_char(value: SqlValue, declared: TypeTag, column: usize) -> Result<char, ConversionError> {
    match value {
        SqlValue::Char(c) => Ok(c),
        SqlValue::Text(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(parse_failed(column, declared, TargetType::Char, s)),
            }
        }
        _ => Err(unsupported(column, declared, TargetType::Char)),
    }
}

/// binary: native bytes identity; a stream-like handle is drained fully
/// into an owned buffer before anything else happens.
pub fn to_bytes(
    value: SqlValue,
    declared: TypeTag,
    column: usize,
) -> Result<Vec<u8>, ConversionError> {
    match value {
        SqlValue::Bytes(b) => Ok(b),
        SqlValue::Lob(mut handle) => {
            let mut buf = Vec::new();
            handle
                .read_to_end(&mut buf)
                .map_err(|source| ConversionError::Lob { column, source })?;
            Ok(buf)
        }
        _ => Err(unsupported(column, declared, TargetType::Bytes)),
    }
}

/// Last-resort stringification for unregistered targets and unrecognized
/// declared types. Never fails for a present value except on LOB drain
/// errors; binary values come back base64-encoded.
pub fn stringify(value: SqlValue, column: usize) -> Result<String, ConversionError> {
    match value {
        // NULL never reaches the registry; callers test for it first.
        SqlValue::Null => Err(unsupported(column, TypeTag::Other, TargetType::Other)),
        SqlValue::Bool(v) => Ok(v.to_string()),
        SqlValue::Char(v) => Ok(v.to_string()),
        SqlValue::Int8(v) => Ok(v.to_string()),
        SqlValue::Int16(v) => Ok(v.to_string()),
        SqlValue::Int32(v) => Ok(v.to_string()),
        SqlValue::Int64(v) => Ok(v.to_string()),
        SqlValue::Float32(v) => Ok(v.to_string()),
        SqlValue::Float64(v) => Ok(v.to_string()),
        SqlValue::Decimal(v) => Ok(v.to_string()),
        SqlValue::Text(v) => Ok(v),
        SqlValue::Bytes(b) => Ok(BASE64.encode(b)),
        lob @ SqlValue::Lob(_) => {
            let buf = to_bytes(lob, TypeTag::Bytes, column)?;
            Ok(BASE64.encode(buf))
        }
        SqlValue::DateTime(v) => Ok(v.to_rfc3339()),
        SqlValue::Uuid(v) => Ok(v.to_string()),
        SqlValue::Xml(v) => Ok(v),
        SqlValue::Other(v) => Ok(v),
    }
}

/// Coerce a value for a record field, dispatching on the field's target
/// type with the column's declared type as the guard.
pub fn field_value(
    value: SqlValue,
    declared: TypeTag,
    column: usize,
    target: TargetType,
    config: &ReadConfig,
) -> Result<FieldValue, ConversionError> {
    match target {
        TargetType::Bool => to_bool(value, declared, column).map(FieldValue::Bool),
        TargetType::Char => to_char(value, declared, column).map(FieldValue::Char),
        TargetType::Int8 => to_i8(value, declared, column).map(FieldValue::Int8),
        TargetType::Int16 => to_i16(value, declared, column).map(FieldValue::Int16),
        TargetType::Int32 => to_i32(value, declared, column).map(FieldValue::Int32),
        TargetType::Int64 => to_i64(value, declared, column).map(FieldValue::Int64),
        TargetType::Float32 => to_f32(value, declared, column).map(FieldValue::Float32),
        TargetType::Float64 => to_f64(value, declared, column).map(FieldValue::Float64),
        TargetType::Decimal => to_decimal(value, declared, column).map(FieldValue::Decimal),
        TargetType::String => to_string_value(value, declared, column).map(FieldValue::String),
        TargetType::Bytes => to_bytes(value, declared, column).map(FieldValue::Bytes),
        TargetType::DateTime => to_datetime(value, declared, column).map(FieldValue::DateTime),
        TargetType::Uuid => to_uuid(value, declared, column, config).map(FieldValue::Uuid),
        // No registered entry: stringify instead of failing.
        TargetType::Other => stringify(value, column).map(FieldValue::String),
    }
}

/// Encode a non-null value as JSON, dispatching on the declared column
/// type. Numbers become JSON numbers (decimals keep their exact digits),
/// booleans JSON booleans, binary values base64 strings, datetimes
/// ISO-8601 text, UUIDs canonical text, and unrecognized declared types
/// fall back to stringified text.
pub fn json_value(
    value: SqlValue,
    declared: TypeTag,
    column: usize,
    config: &ReadConfig,
) -> Result<Value, ConversionError> {
    match declared {
        TypeTag::Bool => to_bool(value, declared, column).map(Value::Bool),
        TypeTag::Char | TypeTag::Text | TypeTag::Xml => {
            to_string_value(value, declared, column).map(Value::String)
        }
        TypeTag::Int8 => to_i8(value, declared, column).map(|v| Value::Number(v.into())),
        TypeTag::Int16 => to_i16(value, declared, column).map(|v| Value::Number(v.into())),
        TypeTag::Int32 => to_i32(value, declared, column).map(|v| Value::Number(v.into())),
        TypeTag::Int64 => to_i64(value, declared, column).map(|v| Value::Number(v.into())),
        TypeTag::Float32 => {
            let v = to_f32(value, declared, column)?;
            number_from_text(&v.to_string(), declared, TargetType::Float32, column)
        }
        TypeTag::Float64 => {
            let v = to_f64(value, declared, column)?;
            number_from_text(&v.to_string(), declared, TargetType::Float64, column)
        }
        TypeTag::Decimal => {
            let v = to_decimal(value, declared, column)?;
            number_from_text(&v.to_string(), declared, TargetType::Decimal, column)
        }
        TypeTag::DateTime => {
            to_datetime(value, declared, column).map(|v| Value::String(v.to_rfc3339()))
        }
        TypeTag::Uuid => {
            to_uuid(value, declared, column, config).map(|v| Value::String(v.to_string()))
        }
        TypeTag::Bytes => to_bytes(value, declared, column).map(|b| Value::String(BASE64.encode(b))),
        TypeTag::Other => stringify(value, column).map(Value::String),
    }
}

/// JSON numbers go through their text form so that decimals and floats keep
/// their shortest exact representation (serde_json's arbitrary-precision
/// numbers preserve the digits verbatim). NaN and infinities have no JSON
/// form and fail.
fn number_from_text(
    text: &str,
    declared: TypeTag,
    target: TargetType,
    column: usize,
) -> Result<Value, ConversionError> {
    text.parse::<Number>()
        .map(Value::Number)
        .map_err(|_| parse_failed(column, declared, target, text))
}
