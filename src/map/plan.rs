//! Mapping plans: built once per record shape, cached for the process
//! lifetime, applied per row with no name lookups.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::cursor::Column;
use crate::types::{FieldValue, TargetType};

/// One writable field of a record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// The field's own name, matched case-insensitively against normalized
    /// column names.
    pub name: &'static str,
    /// Explicit column-name override; takes precedence over `name`.
    pub column: Option<&'static str>,
    pub target: TargetType,
    /// Nullable fields receive [`FieldValue::Null`] for NULL columns;
    /// non-nullable fields are left at their default.
    pub nullable: bool,
}

impl FieldSpec {
    pub const fn new(name: &'static str, target: TargetType) -> Self {
        FieldSpec {
            name,
            column: None,
            target,
            nullable: false,
        }
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn with_column(mut self, column: &'static str) -> Self {
        self.column = Some(column);
        self
    }
}

/// A caller-defined record shape with named, typed, writable fields.
///
/// `fields` declares the shape once; `set_field` assigns a coerced value by
/// field position, so per-row mapping is pure data movement. Fields with no
/// matching column are never set and keep their `Default` value.
///
/// A shape's plan is built from the first result set it is used against and
/// reused for the life of the process; using one shape against result sets
/// with different column layouts will bind against the first layout seen.
pub trait FromRow: Default + 'static {
    fn fields() -> &'static [FieldSpec];

    fn set_field(&mut self, field: usize, value: FieldValue);
}

/// A field binding computed at plan-build time. `column` is `None` when no
/// column matched the field's output name; such bindings are skipped
/// silently at mapping time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub field: usize,
    pub column: Option<usize>,
    pub target: TargetType,
    pub nullable: bool,
}

/// Immutable, ordered field bindings for one record shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingPlan {
    pub bindings: Vec<Binding>,
}

impl MappingPlan {
    /// Bind each field to the first column whose normalized name matches
    /// the field's output name, case-insensitively.
    pub fn build(fields: &[FieldSpec], columns: &[Column]) -> MappingPlan {
        let bindings = fields
            .iter()
            .enumerate()
            .map(|(field, spec)| {
                let wanted = spec.column.unwrap_or(spec.name);
                let column = columns
                    .iter()
                    .position(|c| c.name.eq_ignore_ascii_case(wanted));
                Binding {
                    field,
                    column,
                    target: spec.target,
                    nullable: spec.nullable,
                }
            })
            .collect();
        MappingPlan { bindings }
    }
}

static PLAN_CACHE: Lazy<RwLock<HashMap<TypeId, Arc<MappingPlan>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// The cached plan for shape `T`, built from `columns` on first use.
///
/// Process-wide, lazily populated, never evicted. Concurrent first use may
/// build the same plan twice; the publish step below keeps the first
/// published value, so all readers see one plan.
pub fn plan_for<T: FromRow>(columns: &[Column]) -> Arc<MappingPlan> {
    let key = TypeId::of::<T>();
    if let Some(plan) = PLAN_CACHE
        .read()
        .expect("plan cache lock poisoned")
        .get(&key)
    {
        return Arc::clone(plan);
    }

    // Built outside the lock; the build is pure.
    let built = Arc::new(MappingPlan::build(T::fields(), columns));
    let mut cache = PLAN_CACHE.write().expect("plan cache lock poisoned");
    Arc::clone(cache.entry(key).or_insert(built))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeTag;

    fn columns() -> Vec<Column> {
        vec![
            Column {
                name: "Id".into(),
                tag: TypeTag::Int32,
            },
            Column {
                name: "UserName".into(),
                tag: TypeTag::Text,
            },
        ]
    }

    #[test]
    fn test_build_matches_case_insensitively() {
        let fields = [
            FieldSpec::new("id", TargetType::Int32),
            FieldSpec::new("USERNAME", TargetType::String),
        ];
        let plan = MappingPlan::build(&fields, &columns());
        assert_eq!(plan.bindings[0].column, Some(0));
        assert_eq!(plan.bindings[1].column, Some(1));
    }

    #[test]
    fn test_build_leaves_unmatched_fields_absent() {
        let fields = [
            FieldSpec::new("id", TargetType::Int32),
            FieldSpec::new("missing", TargetType::String),
        ];
        let plan = MappingPlan::build(&fields, &columns());
        assert_eq!(plan.bindings[1].column, None);
        assert_eq!(plan.bindings[1].target, TargetType::String);
    }

    #[test]
    fn test_column_override_takes_precedence() {
        let fields = [FieldSpec::new("login", TargetType::String).with_column("UserName")];
        let plan = MappingPlan::build(&fields, &columns());
        assert_eq!(plan.bindings[0].column, Some(1));
    }

    #[test]
    fn test_plan_cache_returns_same_plan_per_shape() {
        #[derive(Default)]
        struct CachedShape;
        impl FromRow for CachedShape {
            fn fields() -> &'static [FieldSpec] {
                const FIELDS: &[FieldSpec] = &[FieldSpec::new("Id", TargetType::Int32)];
                FIELDS
            }
            fn set_field(&mut self, _field: usize, _value: FieldValue) {}
        }

        let first = plan_for::<CachedShape>(&columns());
        // Second call with different columns still returns the first plan.
        let second = plan_for::<CachedShape>(&[]);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.bindings[0].column, Some(0));
    }
}
