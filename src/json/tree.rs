//! In-memory JSON tree builders.

use serde_json::Value;

use crate::cursor::{resolve_columns, RowCursor};
use crate::error::ConversionError;
use crate::json::row_object;
use crate::types::ReadConfig;

/// Build a JSON array of row objects, advancing the cursor to exhaustion.
/// A result set with zero rows is an empty array, not an error.
pub fn json_array<C: RowCursor + ?Sized>(
    cursor: &mut C,
    config: &ReadConfig,
) -> Result<Value, ConversionError> {
    let mut rows = Vec::new();
    if !cursor.advance() {
        return Ok(Value::Array(rows));
    }
    let columns = resolve_columns(cursor);
    loop {
        rows.push(Value::Object(row_object(cursor, &columns, config)?));
        if !cursor.advance() {
            break;
        }
    }
    Ok(Value::Array(rows))
}

/// Build a single row object, advancing the cursor once. `Ok(None)` when
/// the result set has no rows — distinct from an empty object.
pub fn json_object<C: RowCursor + ?Sized>(
    cursor: &mut C,
    config: &ReadConfig,
) -> Result<Option<Value>, ConversionError> {
    if !cursor.advance() {
        return Ok(None);
    }
    let columns = resolve_columns(cursor);
    Ok(Some(Value::Object(row_object(cursor, &columns, config)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::VecCursor;
    use crate::types::{SqlValue, TypeTag};
    use serde_json::json;

    fn users(rows: Vec<Vec<SqlValue>>) -> VecCursor {
        VecCursor::new(
            vec![
                ("Id", TypeTag::Int32),
                ("Name", TypeTag::Text),
                ("Active", TypeTag::Bool),
            ],
            rows,
        )
    }

    fn ada() -> Vec<SqlValue> {
        vec![
            SqlValue::Int32(7),
            SqlValue::Text("Ada".into()),
            SqlValue::Bool(true),
        ]
    }

    #[test]
    fn test_array_of_row_objects() {
        let mut cursor = users(vec![ada()]);
        let value = json_array(&mut cursor, &ReadConfig::default()).unwrap();
        assert_eq!(value, json!([{"Id": 7, "Name": "Ada", "Active": true}]));
    }

    #[test]
    fn test_array_with_zero_rows_is_empty() {
        let mut cursor = users(vec![]);
        let value = json_array(&mut cursor, &ReadConfig::default()).unwrap();
        assert_eq!(value, json!([]));
    }

    #[test]
    fn test_single_object_mode() {
        let mut cursor = users(vec![ada()]);
        let value = json_object(&mut cursor, &ReadConfig::default()).unwrap();
        assert_eq!(
            value,
            Some(json!({"Id": 7, "Name": "Ada", "Active": true}))
        );
    }

    #[test]
    fn test_single_object_zero_rows_is_sentinel() {
        let mut cursor = users(vec![]);
        let value = json_object(&mut cursor, &ReadConfig::default()).unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_null_column_becomes_json_null() {
        let mut cursor = VecCursor::new(
            vec![("Id", TypeTag::Int32), ("Note", TypeTag::Text)],
            vec![vec![SqlValue::Int32(1), SqlValue::Null]],
        );
        let value = json_object(&mut cursor, &ReadConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(value, json!({"Id": 1, "Note": null}));
    }

    #[test]
    fn test_conversion_error_aborts_the_document() {
        let mut cursor = VecCursor::new(
            vec![("Flag", TypeTag::Bool)],
            vec![
                vec![SqlValue::Bool(true)],
                vec![SqlValue::Text("maybe".into())],
            ],
        );
        let err = json_array(&mut cursor, &ReadConfig::default()).unwrap_err();
        assert!(matches!(err, ConversionError::Parse { column: 0, .. }));
    }
}
