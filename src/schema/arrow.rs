// src/schema/arrow.rs

use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema};
use std::sync::Arc;

use super::types::{Column, ColumnType};

/// Map a schema column type into an Arrow DataType.
///
/// - Int   → Int64
/// - Float → Float64
/// - Date  → Date32 (days since the Unix epoch)
/// - Str   → Utf8
pub fn map_to_arrow_type(ty: ColumnType) -> DataType {
    match ty {
        ColumnType::Int => DataType::Int64,
        ColumnType::Float => DataType::Float64,
        ColumnType::Date => DataType::Date32,
        ColumnType::Str => DataType::Utf8,
    }
}

/// Build the ArrowSchema (inside an Arc) for the full column set.
pub fn arrow_schema() -> Arc<ArrowSchema> {
    let fields: Vec<ArrowField> = super::columns()
        .map(|Column { name, ty }| ArrowField::new(name, map_to_arrow_type(ty), false))
        .collect();

    Arc::new(ArrowSchema::new(fields))
}
