// src/dataset.rs

use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use rayon::prelude::*;
use std::{path::Path, time::Instant};
use tracing::{info, instrument};

use crate::cache::{store, RegionCache};
use crate::columns::{ColumnData, RecordSet};
use crate::error::Result;
use crate::region::Region;
use crate::schema::{self, COLUMN_NAMES};

/// Column-by-column merge of one or more regions' record sets.
///
/// The only thing handed to downstream consumers. Columns keep schema order
/// and type no matter which regions were requested.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    regions: Vec<Region>,
    records: RecordSet,
}

impl Dataset {
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn names(&self) -> &'static [&'static str] {
        &COLUMN_NAMES
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    pub fn into_records(self) -> RecordSet {
        self.records
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        schema::column_index(name).and_then(|i| self.records.column(i))
    }

    pub fn ints(&self, name: &str) -> Option<&[i64]> {
        match self.column(name)? {
            ColumnData::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn floats(&self, name: &str) -> Option<&[f64]> {
        match self.column(name)? {
            ColumnData::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn dates(&self, name: &str) -> Option<&[NaiveDate]> {
        match self.column(name)? {
            ColumnData::Date(v) => Some(v),
            _ => None,
        }
    }

    pub fn strs(&self, name: &str) -> Option<&[String]> {
        match self.column(name)? {
            ColumnData::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        self.records.to_record_batch()
    }

    /// Export all 65 columns as a single Parquet file.
    pub fn write_parquet<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        store::write_record_set(path.as_ref(), &self.records)
    }
}

/// Load `regions` through `cache` and concatenate them in the given order.
///
/// `None` means all 14 regions in their default order. Regions are loaded in
/// parallel; the merge order is always the caller's. A region listed twice
/// is loaded once and appended twice.
#[instrument(level = "info", skip(cache))]
pub fn assemble(cache: &RegionCache, regions: Option<&[Region]>) -> Result<Dataset> {
    let start = Instant::now();
    let regions: Vec<Region> = regions.unwrap_or(&Region::ALL).to_vec();

    let sets = regions
        .par_iter()
        .map(|&region| cache.get_region(region))
        .collect::<Result<Vec<_>>>()?;

    let mut records = RecordSet::new();
    for set in &sets {
        records.append(set)?;
    }

    info!(
        regions = regions.len(),
        rows = records.len(),
        elapsed = ?start.elapsed(),
        "dataset assembled"
    );
    Ok(Dataset { regions, records })
}
