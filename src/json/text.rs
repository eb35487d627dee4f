//! UTF-8 JSON text encoding, one row at a time.

use serde_json::Value;

use crate::cursor::{resolve_columns, RowCursor};
use crate::error::ConversionError;
use crate::json::row_object;
use crate::types::ReadConfig;

/// Encode the whole result set as a JSON array document. Zero rows encode
/// as `[]`. A conversion failure aborts the document; partial JSON is never
/// returned.
pub fn json_array_string<C: RowCursor + ?Sized>(
    cursor: &mut C,
    config: &ReadConfig,
) -> Result<String, ConversionError> {
    let mut out = String::from("[");
    if cursor.advance() {
        let columns = resolve_columns(cursor);
        let mut first = true;
        loop {
            let row = Value::Object(row_object(cursor, &columns, config)?);
            if !first {
                out.push(',');
            }
            first = false;
            out.push_str(&row.to_string());
            if !cursor.advance() {
                break;
            }
        }
    }
    out.push(']');
    Ok(out)
}

/// Encode the first row as a JSON object document, advancing once. Zero
/// rows encode as `{}`.
pub fn json_object_string<C: RowCursor + ?Sized>(
    cursor: &mut C,
    config: &ReadConfig,
) -> Result<String, ConversionError> {
    if !cursor.advance() {
        return Ok(String::from("{}"));
    }
    let columns = resolve_columns(cursor);
    let row = Value::Object(row_object(cursor, &columns, config)?);
    Ok(row.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::VecCursor;
    use crate::types::{SqlValue, TypeTag};

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
    fn test_array_document() {
        let mut cursor = users(vec![ada()]);
        let text = json_array_string(&mut cursor, &ReadConfig::default()).unwrap();
        assert_eq!(text, r#"[{"Id":7,"Name":"Ada","Active":true}]"#);
    }

    #[test]
    fn test_array_document_multiple_rows() {
        let mut cursor = users(vec![
            ada(),
            vec![
                SqlValue::Int32(8),
                SqlValue::Text("Grace".into()),
                SqlValue::Bool(false),
            ],
        ]);
        let text = json_array_string(&mut cursor, &ReadConfig::default()).unwrap();
        assert_eq!(
            text,
            r#"[{"Id":7,"Name":"Ada","Active":true},{"Id":8,"Name":"Grace","Active":false}]"#
        );
    }

    #[test]
    fn test_empty_array_document() {
        let mut cursor = users(vec![]);
        let text = json_array_string(&mut cursor, &ReadConfig::default()).unwrap();
        assert_eq!(text, "[]");
    }

    #[test]
    fn test_object_document() {
        let mut cursor = users(vec![ada()]);
        let text = json_object_string(&mut cursor, &ReadConfig::default()).unwrap();
        assert_eq!(text, r#"{"Id":7,"Name":"Ada","Active":true}"#);
    }

    #[test]
    fn test_empty_object_document() {
        let mut cursor = users(vec![]);
        let text = json_object_string(&mut cursor, &ReadConfig::default()).unwrap();
        assert_eq!(text, "{}");
    }

    #[test]
    fn test_text_and_tree_paths_agree() {
        let make = || users(vec![ada()]);
        let text = json_array_string(&mut make(), &ReadConfig::default()).unwrap();
        let tree = crate::json::tree::json_array(&mut make(), &ReadConfig::default()).unwrap();
        let reparsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(reparsed, tree);
    }
}
