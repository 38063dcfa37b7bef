// src/columns.rs

use arrow::{
    array::{Array, ArrayRef, Date32Array, Float64Array, Int64Array, StringArray},
    record_batch::RecordBatch,
};
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;

use crate::error::{IngestError, Result};
use crate::schema::{self, ColumnType, COLUMN_COUNT, COLUMN_NAMES};

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// One fully typed cell, as produced by the row parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    Str(String),
}

impl Value {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Int(_) => ColumnType::Int,
            Value::Float(_) => ColumnType::Float,
            Value::Date(_) => ColumnType::Date,
            Value::Str(_) => ColumnType::Str,
        }
    }
}

/// Column storage, tagged once from the schema.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Date(Vec<NaiveDate>),
    Str(Vec<String>),
}

impl ColumnData {
    pub fn empty(ty: ColumnType) -> Self {
        match ty {
            ColumnType::Int => ColumnData::Int(Vec::new()),
            ColumnType::Float => ColumnData::Float(Vec::new()),
            ColumnType::Date => ColumnData::Date(Vec::new()),
            ColumnType::Str => ColumnData::Str(Vec::new()),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnData::Int(_) => ColumnType::Int,
            ColumnData::Float(_) => ColumnType::Float,
            ColumnData::Date(_) => ColumnType::Date,
            ColumnData::Str(_) => ColumnType::Str,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Date(v) => v.len(),
            ColumnData::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Concatenate `other` onto `self`. Both sides must carry the same type.
    pub fn extend_from(&mut self, other: &ColumnData) -> Result<()> {
        match (self, other) {
            (ColumnData::Int(a), ColumnData::Int(b)) => a.extend_from_slice(b),
            (ColumnData::Float(a), ColumnData::Float(b)) => a.extend_from_slice(b),
            (ColumnData::Date(a), ColumnData::Date(b)) => a.extend_from_slice(b),
            (ColumnData::Str(a), ColumnData::Str(b)) => a.extend_from_slice(b),
            (a, b) => {
                return Err(IngestError::SchemaMismatch(format!(
                    "cannot append {:?} column onto {:?} column",
                    b.column_type(),
                    a.column_type()
                )))
            }
        }
        Ok(())
    }

    fn push(&mut self, value: Value) -> Result<()> {
        match (self, value) {
            (ColumnData::Int(v), Value::Int(x)) => v.push(x),
            (ColumnData::Float(v), Value::Float(x)) => v.push(x),
            (ColumnData::Date(v), Value::Date(x)) => v.push(x),
            (ColumnData::Str(v), Value::Str(x)) => v.push(x),
            (col, value) => {
                return Err(IngestError::SchemaMismatch(format!(
                    "cannot push {:?} value into {:?} column",
                    value.column_type(),
                    col.column_type()
                )))
            }
        }
        Ok(())
    }

    fn to_arrow(&self) -> ArrayRef {
        match self {
            ColumnData::Int(v) => Arc::new(Int64Array::from(v.clone())),
            ColumnData::Float(v) => Arc::new(Float64Array::from(v.clone())),
            ColumnData::Date(v) => Arc::new(Date32Array::from_iter_values(
                v.iter().map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE),
            )),
            ColumnData::Str(v) => Arc::new(StringArray::from_iter_values(v.iter())),
        }
    }

    fn from_arrow(ty: ColumnType, arr: &ArrayRef, name: &str) -> Result<Self> {
        let mismatch = || {
            IngestError::SchemaMismatch(format!(
                "column `{}` stored as {}, expected {:?}",
                name,
                arr.data_type(),
                ty
            ))
        };
        if arr.null_count() > 0 {
            return Err(IngestError::SchemaMismatch(format!(
                "column `{}` contains nulls",
                name
            )));
        }
        let col = match ty {
            ColumnType::Int => {
                let a = arr
                    .as_any()
                    .downcast_ref::<Int64Array>()
                    .ok_or_else(mismatch)?;
                ColumnData::Int(a.values().to_vec())
            }
            ColumnType::Float => {
                let a = arr
                    .as_any()
                    .downcast_ref::<Float64Array>()
                    .ok_or_else(mismatch)?;
                ColumnData::Float(a.values().to_vec())
            }
            ColumnType::Date => {
                let a = arr
                    .as_any()
                    .downcast_ref::<Date32Array>()
                    .ok_or_else(mismatch)?;
                let dates = a
                    .values()
                    .iter()
                    .map(|&days| {
                        NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
                            .ok_or_else(|| {
                                IngestError::SchemaMismatch(format!(
                                    "column `{}` holds out-of-range day {}",
                                    name, days
                                ))
                            })
                    })
                    .collect::<Result<Vec<_>>>()?;
                ColumnData::Date(dates)
            }
            ColumnType::Str => {
                let a = arr
                    .as_any()
                    .downcast_ref::<StringArray>()
                    .ok_or_else(mismatch)?;
                ColumnData::Str(a.iter().map(|s| s.unwrap_or_default().to_string()).collect())
            }
        };
        Ok(col)
    }
}

/// The 65 equal-length columns parsed for one or more regions.
///
/// Rows only enter through [`RecordSet::push_row`] or [`RecordSet::append`],
/// both of which check the full row/column set before mutating, so every
/// column always has the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    columns: Vec<ColumnData>,
}

impl Default for RecordSet {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordSet {
    pub fn new() -> Self {
        Self {
            columns: schema::columns().map(|c| ColumnData::empty(c.ty)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.columns[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn columns(&self) -> &[ColumnData] {
        &self.columns
    }

    pub fn column(&self, idx: usize) -> Option<&ColumnData> {
        self.columns.get(idx)
    }

    /// Append one typed row of exactly `COLUMN_COUNT` values.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != COLUMN_COUNT {
            return Err(IngestError::SchemaMismatch(format!(
                "row has {} values, expected {}",
                row.len(),
                COLUMN_COUNT
            )));
        }
        if let Some((i, v)) = row
            .iter()
            .enumerate()
            .find(|(i, v)| v.column_type() != self.columns[*i].column_type())
        {
            return Err(IngestError::SchemaMismatch(format!(
                "value for `{}` is {:?}, expected {:?}",
                COLUMN_NAMES[i],
                v.column_type(),
                self.columns[i].column_type()
            )));
        }
        for (col, value) in self.columns.iter_mut().zip(row) {
            col.push(value)?;
        }
        Ok(())
    }

    /// Concatenate `other` column-by-column after `self`.
    pub fn append(&mut self, other: &RecordSet) -> Result<()> {
        if other.columns.len() != self.columns.len() {
            return Err(IngestError::SchemaMismatch(format!(
                "record set has {} columns, expected {}",
                other.columns.len(),
                self.columns.len()
            )));
        }
        if let Some(i) = (0..self.columns.len())
            .find(|&i| self.columns[i].column_type() != other.columns[i].column_type())
        {
            return Err(IngestError::SchemaMismatch(format!(
                "column `{}` is {:?}, expected {:?}",
                COLUMN_NAMES[i],
                other.columns[i].column_type(),
                self.columns[i].column_type()
            )));
        }
        for (dst, src) in self.columns.iter_mut().zip(&other.columns) {
            dst.extend_from(src)?;
        }
        Ok(())
    }

    /// Build an Arrow batch over the full schema.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let arrays: Vec<ArrayRef> = self.columns.iter().map(ColumnData::to_arrow).collect();
        RecordBatch::try_new(schema::arrow_schema(), arrays)
            .map_err(|e| IngestError::SchemaMismatch(e.to_string()))
    }

    /// Rebuild a record set from a batch produced by [`RecordSet::to_record_batch`].
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Self> {
        if batch.num_columns() != COLUMN_COUNT {
            return Err(IngestError::SchemaMismatch(format!(
                "batch has {} columns, expected {}",
                batch.num_columns(),
                COLUMN_COUNT
            )));
        }
        let columns = schema::columns()
            .zip(batch.columns())
            .map(|(col, arr)| ColumnData::from_arrow(col.ty, arr, col.name))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { columns })
    }
}
