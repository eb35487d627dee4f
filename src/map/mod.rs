//! Structured record mapping
//!
//! A record shape declares its fields once through [`FromRow`]; the plan
//! builder computes, once per shape, which column feeds which field, and
//! the mapper applies that plan per row with index-only lookups. Plans are
//! cached process-wide by shape identity.

pub mod mapper;
pub mod plan;

pub use mapper::{map_one, map_row, Rows};
pub use plan::{plan_for, Binding, FieldSpec, FromRow, MappingPlan};
