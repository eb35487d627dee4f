//! # Rowcast - result-set conversion toolkit
//!
//! Converts the rows behind a forward-only, column-indexed cursor into
//! JSON text, an in-memory JSON tree, or instances of a caller-supplied
//! record type. The cursor and its connection are the caller's business:
//! this crate only consumes an already-positioned [`RowCursor`] and
//! advances it.
//!
//! ## Modules
//!
//! - **cursor**: the cursor abstraction, column metadata resolution, and
//!   the in-memory [`VecCursor`]
//! - **coerce**: per-target-type coercion rules shared by every output path
//! - **map**: cached mapping plans and the structured record mapper
//! - **json**: text-JSON encoding and tree-JSON building
//!
//! ## Quick Start
//!
//! ### JSON output
//!
//! ```rust
//! use rowcast::{to_json_array_string, SqlValue, TypeTag, VecCursor};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut cursor = VecCursor::new(
//!     vec![("Id", TypeTag::Int32), ("Name", TypeTag::Text)],
//!     vec![vec![SqlValue::Int32(7), SqlValue::Text("Ada".into())]],
//! );
//!
//! let json = to_json_array_string(&mut cursor)?;
//! assert_eq!(json, r#"[{"Id":7,"Name":"Ada"}]"#);
//! # Ok(())
//! # }
//! ```
//!
//! ### Record mapping
//!
//! ```rust
//! use rowcast::{
//!     read_one, FieldSpec, FieldValue, FromRow, SqlValue, TargetType, TypeTag, VecCursor,
//! };
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct User {
//!     id: i32,
//!     name: String,
//! }
//!
//! impl FromRow for User {
//!     fn fields() -> &'static [FieldSpec] {
//!         const FIELDS: &[FieldSpec] = &[
//!             FieldSpec::new("id", TargetType::Int32),
//!             FieldSpec::new("name", TargetType::String),
//!         ];
//!         FIELDS
//!     }
//!
//!     fn set_field(&mut self, field: usize, value: FieldValue) {
//!         match (field, value) {
//!             (0, FieldValue::Int32(v)) => self.id = v,
//!             (1, FieldValue::String(v)) => self.name = v,
//!             _ => {}
//!         }
//!     }
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut cursor = VecCursor::new(
//!     vec![("ID", TypeTag::Int32), ("NAME", TypeTag::Text)],
//!     vec![vec![SqlValue::Int32(7), SqlValue::Text("Ada".into())]],
//! );
//!
//! let user: Option<User> = read_one(&mut cursor)?;
//! assert_eq!(user, Some(User { id: 7, name: "Ada".into() }));
//! # Ok(())
//! # }
//! ```

pub mod coerce;
pub mod cursor;
pub mod error;
pub mod json;
pub mod map;
pub mod types;

// Re-export commonly used types for convenience
pub use cursor::{resolve_columns, title_case, Column, RowCursor, VecCursor};
pub use error::ConversionError;
pub use map::{FieldSpec, FromRow, MappingPlan, Rows};
pub use types::{FieldValue, ReadConfig, SqlValue, TargetType, TypeTag, UuidByteOrder};

use serde_json::Value;

/// All conversion paths behind one configuration.
///
/// The free functions below cover the default configuration; construct a
/// `RowReader` to pick a UUID byte-order policy.
#[derive(Debug, Clone, Default)]
pub struct RowReader {
    config: ReadConfig,
}

impl RowReader {
    pub fn new(config: ReadConfig) -> Self {
        RowReader { config }
    }

    /// Encode the whole result set as a JSON array document (`[]` when
    /// empty).
    pub fn json_array_string<C: RowCursor + ?Sized>(
        &self,
        cursor: &mut C,
    ) -> Result<String, ConversionError> {
        json::json_array_string(cursor, &self.config)
    }

    /// Encode the first row as a JSON object document (`{}` when empty).
    pub fn json_object_string<C: RowCursor + ?Sized>(
        &self,
        cursor: &mut C,
    ) -> Result<String, ConversionError> {
        json::json_object_string(cursor, &self.config)
    }

    /// Build the whole result set as a JSON array value.
    pub fn json_array<C: RowCursor + ?Sized>(
        &self,
        cursor: &mut C,
    ) -> Result<Value, ConversionError> {
        json::json_array(cursor, &self.config)
    }

    /// Build the first row as a JSON object value; `Ok(None)` when the
    /// result set is empty.
    pub fn json_object<C: RowCursor + ?Sized>(
        &self,
        cursor: &mut C,
    ) -> Result<Option<Value>, ConversionError> {
        json::json_object(cursor, &self.config)
    }

    /// Map the first row to a record; `Ok(None)` when the result set is
    /// empty.
    pub fn one<T: FromRow, C: RowCursor + ?Sized>(
        &self,
        cursor: &mut C,
    ) -> Result<Option<T>, ConversionError> {
        map::map_one(cursor, &self.config)
    }

    /// Lazily map every row to a record, forward-only.
    pub fn rows<'c, T: FromRow, C: RowCursor + ?Sized>(&self, cursor: &'c mut C) -> Rows<'c, C, T> {
        Rows::new(cursor, self.config.clone())
    }
}

/// [`RowReader::json_array_string`] with the default configuration.
pub fn to_json_array_string<C: RowCursor + ?Sized>(
    cursor: &mut C,
) -> Result<String, ConversionError> {
    RowReader::default().json_array_string(cursor)
}

/// [`RowReader::json_object_string`] with the default configuration.
pub fn to_json_object_string<C: RowCursor + ?Sized>(
    cursor: &mut C,
) -> Result<String, ConversionError> {
    RowReader::default().json_object_string(cursor)
}

/// [`RowReader::json_array`] with the default configuration.
pub fn to_json_array<C: RowCursor + ?Sized>(cursor: &mut C) -> Result<Value, ConversionError> {
    RowReader::default().json_array(cursor)
}

/// [`RowReader::json_object`] with the default configuration.
pub fn to_json_object<C: RowCursor + ?Sized>(
    cursor: &mut C,
) -> Result<Option<Value>, ConversionError> {
    RowReader::default().json_object(cursor)
}

/// [`RowReader::one`] with the default configuration.
pub fn read_one<T: FromRow, C: RowCursor + ?Sized>(
    cursor: &mut C,
) -> Result<Option<T>, ConversionError> {
    RowReader::default().one(cursor)
}

/// [`RowReader::rows`] with the default configuration.
pub fn read_rows<'c, T: FromRow, C: RowCursor + ?Sized>(cursor: &'c mut C) -> Rows<'c, C, T> {
    RowReader::default().rows(cursor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reader_covers_both_paths() {
        let make = || {
            VecCursor::new(
                vec![("ORDER_ID", TypeTag::Int64), ("NOTE", TypeTag::Text)],
                vec![vec![SqlValue::Int64(42), SqlValue::Text("first".into())]],
            )
        };

        let reader = RowReader::default();
        let tree = reader.json_array(&mut make()).unwrap();
        assert_eq!(tree, json!([{"OrderId": 42, "Note": "first"}]));

        let text = reader.json_object_string(&mut make()).unwrap();
        assert_eq!(text, r#"{"OrderId":42,"Note":"first"}"#);
    }

    #[test]
    fn test_uuid_policy_flows_through_reader() {
        let bytes = vec![
            0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE, 0xBA, 0xBE, 0x12, 0x34, 0x56, 0x78, 0x90, 0xAB,
            0xCD, 0xEF,
        ];
        let make = || {
            VecCursor::new(
                vec![("GUID_COLUMN", TypeTag::Uuid)],
                vec![vec![SqlValue::Bytes(bytes.clone())]],
            )
        };

        let rfc = RowReader::default().json_object(&mut make()).unwrap();
        assert_eq!(
            rfc,
            Some(json!({"GuidColumn": "deadbeef-cafe-babe-1234-567890abcdef"}))
        );

        let ms = RowReader::new(ReadConfig {
            uuid_byte_order: UuidByteOrder::Microsoft,
        })
        .json_object(&mut make())
        .unwrap();
        assert_eq!(
            ms,
            Some(json!({"GuidColumn": "efbeadde-feca-beba-1234-567890abcdef"}))
        );
    }
}
