//! Cursor abstraction and column metadata resolution
//!
//! The core never opens connections or issues queries; it consumes an
//! already-positioned, forward-only cursor through the [`RowCursor`] trait
//! and advances it. Driver shims implement the trait; [`VecCursor`] is the
//! in-memory reference implementation used throughout the tests.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::ConversionError;
use crate::types::{SqlValue, TargetType, TypeTag};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

static WORD_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(^|_)([a-z])").unwrap());

/// Normalize a raw column name to TitleCase.
///
/// Lowercases the input and capitalizes each letter at the start or after
/// an underscore, so `snake_case`, `lower_snake` and `UPPER_SNAKE` all
/// normalize the same way: `BINARY_FLOAT_COLUMN` becomes
/// `BinaryFloatColumn`. Deterministic; collisions after normalization are
/// not defended against.
pub fn title_case(name: &str) -> String {
    let lower = name.to_lowercase();
    WORD_START
        .replace_all(&lower, |caps: &Captures| caps[2].to_uppercase())
        .into_owned()
}

/// Normalized name and declared type of one result-set column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub tag: TypeTag,
}

/// Read the ordered column metadata from a positioned cursor.
///
/// Call once per result set, after the first successful `advance`, and
/// reuse the result across rows; re-resolving per row would re-pay the
/// normalization cost on every row.
pub fn resolve_columns<C: RowCursor + ?Sized>(cursor: &C) -> Vec<Column> {
    (0..cursor.column_count())
        .map(|i| Column {
            name: title_case(cursor.column_name(i)),
            tag: cursor.declared_type(i),
        })
        .collect()
}

/// A forward-only, column-indexed view over one result row at a time.
///
/// Column count, names and declared types are fixed for the life of a
/// result set. `value` takes `&mut self` because stream-like LOB values are
/// handed out once and consumed by draining. The typed accessors demand the
/// exact declared width and fail otherwise; shims may override them with
/// native driver getters.
pub trait RowCursor {
    fn column_count(&self) -> usize;

    fn column_name(&self, idx: usize) -> &str;

    fn declared_type(&self, idx: usize) -> TypeTag;

    fn is_null(&self, idx: usize) -> bool;

    /// The untyped value at `idx` for the current row.
    fn value(&mut self, idx: usize) -> SqlValue;

    /// Move to the next row. Returns `false` once the result set is
    /// exhausted.
    fn advance(&mut self) -> bool;

    fn get_bool(&mut self, idx: usize) -> Result<bool, ConversionError> {
        match self.value(idx) {
            SqlValue::Bool(v) => Ok(v),
            _ => Err(self.accessor_mismatch(idx, TargetType::Bool)),
        }
    }

    fn get_char(&mut self, idx: usize) -> Result<char, ConversionError> {
        match self.value(idx) {
            SqlValue::Char(v) => Ok(v),
            _ => Err(self.accessor_mismatch(idx, TargetType::Char)),
        }
    }

    fn get_i8(&mut self, idx: usize) -> Result<i8, ConversionError> {
        match self.value(idx) {
            SqlValue::Int8(v) => Ok(v),
            _ => Err(self.accessor_mismatch(idx, TargetType::Int8)),
        }
    }

    fn get_i16(&mut self, idx: usize) -> Result<i16, ConversionError> {
        match self.value(idx) {
            SqlValue::Int16(v) => Ok(v),
            _ => Err(self.accessor_mismatch(idx, TargetType::Int16)),
        }
    }

    fn get_i32(&mut self, idx: usize) -> Result<i32, ConversionError> {
        match self.value(idx) {
            SqlValue::Int32(v) => Ok(v),
            _ => Err(self.accessor_mismatch(idx, TargetType::Int32)),
        }
    }

    fn get_i64(&mut self, idx: usize) -> Result<i64, ConversionError> {
        match self.value(idx) {
            SqlValue::Int64(v) => Ok(v),
            _ => Err(self.accessor_mismatch(idx, TargetType::Int64)),
        }
    }

    fn get_f32(&mut self, idx: usize) -> Result<f32, ConversionError> {
        match self.value(idx) {
            SqlValue::Float32(v) => Ok(v),
            _ => Err(self.accessor_mismatch(idx, TargetType::Float32)),
        }
    }

    fn get_f64(&mut self, idx: usize) -> Result<f64, ConversionError> {
        match self.value(idx) {
            SqlValue::Float64(v) => Ok(v),
            _ => Err(self.accessor_mismatch(idx, TargetType::Float64)),
        }
    }

    fn get_decimal(&mut self, idx: usize) -> Result<Decimal, ConversionError> {
        match self.value(idx) {
            SqlValue::Decimal(v) => Ok(v),
            _ => Err(self.accessor_mismatch(idx, TargetType::Decimal)),
        }
    }

    fn get_string(&mut self, idx: usize) -> Result<String, ConversionError> {
        match self.value(idx) {
            SqlValue::Text(v) => Ok(v),
            _ => Err(self.accessor_mismatch(idx, TargetType::String)),
        }
    }

    fn get_bytes(&mut self, idx: usize) -> Result<Vec<u8>, ConversionError> {
        match self.value(idx) {
            SqlValue::Bytes(v) => Ok(v),
            _ => Err(self.accessor_mismatch(idx, TargetType::Bytes)),
        }
    }

    fn get_datetime(&mut self, idx: usize) -> Result<DateTime<Utc>, ConversionError> {
        match self.value(idx) {
            SqlValue::DateTime(v) => Ok(v),
            _ => Err(self.accessor_mismatch(idx, TargetType::DateTime)),
        }
    }

    fn get_uuid(&mut self, idx: usize) -> Result<Uuid, ConversionError> {
        match self.value(idx) {
            SqlValue::Uuid(v) => Ok(v),
            _ => Err(self.accessor_mismatch(idx, TargetType::Uuid)),
        }
    }

    #[doc(hidden)]
    fn accessor_mismatch(&self, idx: usize, target: TargetType) -> ConversionError {
        ConversionError::Unsupported {
            column: idx,
            declared: self.declared_type(idx),
            target,
        }
    }
}

/// In-memory cursor over explicit rows.
///
/// The reference implementation of [`RowCursor`] and the test double for
/// everything else in the crate. `SqlValue::Null` in a row slot is a
/// database NULL. LOB values are handed out once; a second `value` call on
/// the same LOB slot sees NULL.
pub struct VecCursor {
    names: Vec<String>,
    tags: Vec<TypeTag>,
    rows: Vec<Vec<SqlValue>>,
    pos: Option<usize>,
}

impl VecCursor {
    pub fn new(columns: Vec<(&str, TypeTag)>, rows: Vec<Vec<SqlValue>>) -> Self {
        let (names, tags) = columns
            .into_iter()
            .map(|(name, tag)| (name.to_string(), tag))
            .unzip();
        VecCursor {
            names,
            tags,
            rows,
            pos: None,
        }
    }

    fn current(&self) -> usize {
        self.pos.expect("cursor is not positioned on a row")
    }
}

impl RowCursor for VecCursor {
    fn column_count(&self) -> usize {
        self.names.len()
    }

    fn column_name(&self, idx: usize) -> &str {
        &self.names[idx]
    }

    fn declared_type(&self, idx: usize) -> TypeTag {
        self.tags[idx]
    }

    fn is_null(&self, idx: usize) -> bool {
        matches!(self.rows[self.current()][idx], SqlValue::Null)
    }

    fn value(&mut self, idx: usize) -> SqlValue {
        let pos = self.current();
        let slot = &mut self.rows[pos][idx];
        match slot.try_clone() {
            Some(copy) => copy,
            // LOB handles are single-shot.
            None => std::mem::replace(slot, SqlValue::Null),
        }
    }

    fn advance(&mut self) -> bool {
        let next = match self.pos {
            None => 0,
            Some(n) => n + 1,
        };
        if next < self.rows.len() {
            self.pos = Some(next);
            true
        } else {
            self.pos = None;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case_snake_variants() {
        assert_eq!(title_case("BINARY_FLOAT_COLUMN"), "BinaryFloatColumn");
        assert_eq!(title_case("user_id"), "UserId");
        assert_eq!(title_case("Id"), "Id");
        assert_eq!(title_case("name"), "Name");
    }

    #[test]
    fn test_title_case_is_deterministic() {
        assert_eq!(title_case("order_total"), title_case("ORDER_TOTAL"));
    }

    #[test]
    fn test_resolve_columns_normalizes_names() {
        let cursor = VecCursor::new(
            vec![("USER_ID", TypeTag::Int32), ("user_name", TypeTag::Text)],
            vec![vec![SqlValue::Int32(1), SqlValue::Text("a".into())]],
        );
        let columns = resolve_columns(&cursor);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "UserId");
        assert_eq!(columns[0].tag, TypeTag::Int32);
        assert_eq!(columns[1].name, "UserName");
    }

    #[test]
    fn test_resolve_columns_empty_result_set() {
        let cursor = VecCursor::new(vec![], vec![vec![]]);
        assert!(resolve_columns(&cursor).is_empty());
    }

    #[test]
    fn test_advance_walks_rows_then_stops() {
        let mut cursor = VecCursor::new(
            vec![("N", TypeTag::Int32)],
            vec![vec![SqlValue::Int32(1)], vec![SqlValue::Int32(2)]],
        );
        assert!(cursor.advance());
        assert_eq!(cursor.get_i32(0).unwrap(), 1);
        assert!(cursor.advance());
        assert_eq!(cursor.get_i32(0).unwrap(), 2);
        assert!(!cursor.advance());
    }

    #[test]
    fn test_typed_accessor_demands_exact_width() {
        let mut cursor = VecCursor::new(
            vec![("N", TypeTag::Int64)],
            vec![vec![SqlValue::Int64(7)]],
        );
        assert!(cursor.advance());
        let err = cursor.get_i32(0).unwrap_err();
        assert!(matches!(
            err,
            ConversionError::Unsupported {
                column: 0,
                declared: TypeTag::Int64,
                target: TargetType::Int32,
            }
        ));
    }

    #[test]
    fn test_lob_slot_is_single_shot() {
        let mut cursor = VecCursor::new(
            vec![("B", TypeTag::Bytes)],
            vec![vec![SqlValue::Lob(Box::new(std::io::Cursor::new(
                b"blob".to_vec(),
            )))]],
        );
        assert!(cursor.advance());
        assert!(!cursor.is_null(0));
        assert!(matches!(cursor.value(0), SqlValue::Lob(_)));
        assert!(cursor.is_null(0));
    }
}
