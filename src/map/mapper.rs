//! Applies a mapping plan to cursor rows.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::coerce;
use crate::cursor::{resolve_columns, Column, RowCursor};
use crate::error::ConversionError;
use crate::map::plan::{plan_for, FromRow, MappingPlan};
use crate::types::{FieldValue, ReadConfig};

/// Map the current row into one record instance.
///
/// Absent bindings are skipped. A NULL column leaves a non-nullable field
/// at its default and hands a nullable field the explicit
/// [`FieldValue::Null`] marker. Any coercion failure aborts the whole row;
/// no partially populated record is returned.
pub fn map_row<T, C>(
    cursor: &mut C,
    columns: &[Column],
    plan: &MappingPlan,
    config: &ReadConfig,
) -> Result<T, ConversionError>
where
    T: FromRow,
    C: RowCursor + ?Sized,
{
    let mut record = T::default();
    for binding in &plan.bindings {
        let Some(col) = binding.column else {
            continue;
        };
        // A cached plan can be stale against a later, narrower result set;
        // bindings past the live column count are skipped like unmatched
        // ones.
        let Some(column) = columns.get(col) else {
            continue;
        };
        if cursor.is_null(col) {
            if binding.nullable {
                record.set_field(binding.field, FieldValue::Null);
            }
            continue;
        }
        // Guard with the live result set's declared type, not the one the
        // plan was built against.
        let value = cursor.value(col);
        let coerced = coerce::field_value(value, column.tag, col, binding.target, config)?;
        record.set_field(binding.field, coerced);
    }
    Ok(record)
}

/// Advance once and map a single record; `Ok(None)` when the result set is
/// empty.
pub fn map_one<T, C>(cursor: &mut C, config: &ReadConfig) -> Result<Option<T>, ConversionError>
where
    T: FromRow,
    C: RowCursor + ?Sized,
{
    if !cursor.advance() {
        return Ok(None);
    }
    let columns = resolve_columns(cursor);
    let plan = plan_for::<T>(&columns);
    map_row(cursor, &columns, &plan, config).map(Some)
}

/// Lazy, forward-only record producer over a borrowed cursor.
///
/// Mirrors the cursor's own forward-only nature: not restartable, and each
/// yielded record is independent of the previous ones. Iteration ends after
/// the first conversion error.
pub struct Rows<'c, C: ?Sized, T> {
    cursor: &'c mut C,
    config: ReadConfig,
    resolved: Option<(Vec<Column>, Arc<MappingPlan>)>,
    done: bool,
    _record: PhantomData<T>,
}

impl<'c, C, T> Rows<'c, C, T>
where
    C: RowCursor + ?Sized,
    T: FromRow,
{
    pub fn new(cursor: &'c mut C, config: ReadConfig) -> Self {
        Rows {
            cursor,
            config,
            resolved: None,
            done: false,
            _record: PhantomData,
        }
    }
}

impl<'c, C, T> Iterator for Rows<'c, C, T>
where
    C: RowCursor + ?Sized,
    T: FromRow,
{
    type Item = Result<T, ConversionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.cursor.advance() {
            self.done = true;
            return None;
        }
        if self.resolved.is_none() {
            let columns = resolve_columns(self.cursor);
            let plan = plan_for::<T>(&columns);
            self.resolved = Some((columns, plan));
        }
        let Some((columns, plan)) = self.resolved.as_ref() else {
            return None;
        };
        let result = map_row(self.cursor, columns, plan, &self.config);
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}
