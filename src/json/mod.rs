//! JSON output paths
//!
//! Both the text encoder and the tree builder iterate columns in resolver
//! order and dispatch on the declared column type through the coercion
//! registry; no mapping plan is involved. NULL columns become JSON null.

pub mod text;
pub mod tree;

pub use text::{json_array_string, json_object_string};
pub use tree::{json_array, json_object};

use serde_json::{Map, Value};

use crate::coerce;
use crate::cursor::{Column, RowCursor};
use crate::error::ConversionError;
use crate::types::ReadConfig;

/// Encode the current row as an ordered JSON object.
pub(crate) fn row_object<C: RowCursor + ?Sized>(
    cursor: &mut C,
    columns: &[Column],
    config: &ReadConfig,
) -> Result<Map<String, Value>, ConversionError> {
    let mut object = Map::with_capacity(columns.len());
    for (idx, column) in columns.iter().enumerate() {
        let value = if cursor.is_null(idx) {
            Value::Null
        } else {
            coerce::json_value(cursor.value(idx), column.tag, idx, config)?
        };
        object.insert(column.name.clone(), value);
    }
    Ok(object)
}
