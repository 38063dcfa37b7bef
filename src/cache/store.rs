// src/cache/store.rs

use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::columns::RecordSet;
use crate::error::{IngestError, Result};
use crate::schema;

const READ_BATCH_ROWS: usize = 8192;

/// Write `set` to `path` as a single Parquet file.
///
/// The file is written to a uniquely named temporary file in the same
/// directory and then renamed into place, so an aborted write never leaves a
/// readable entry behind and concurrent writers never share a temp file.
pub fn write_record_set(path: &Path, set: &RecordSet) -> Result<()> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent,
        None => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| IngestError::cache_io(dir, e))?;

    let batch = set.to_record_batch()?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| IngestError::cache_io(dir, e))?;
    let tmp_path = tmp.path().to_path_buf();
    {
        let out = BufWriter::new(tmp.as_file_mut());
        let mut writer = ArrowWriter::try_new(out, batch.schema(), Some(props))
            .map_err(|e| IngestError::cache_io(&tmp_path, e))?;
        writer
            .write(&batch)
            .map_err(|e| IngestError::cache_io(&tmp_path, e))?;
        writer
            .into_inner()
            .map_err(|e| IngestError::cache_io(&tmp_path, e))?
            .flush()
            .map_err(|e| IngestError::cache_io(&tmp_path, e))?;
    }

    tmp.persist(path).map_err(|e| {
        IngestError::cache_io(path, format!("renaming `{}`: {}", tmp_path.display(), e))
    })?;
    debug!(path = %path.display(), rows = set.len(), "wrote record set");
    Ok(())
}

/// Read a record set written by [`write_record_set`].
pub fn read_record_set(path: &Path) -> Result<RecordSet> {
    let file = File::open(path).map_err(|e| IngestError::cache_io(path, e))?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| IngestError::cache_io(path, e))?;

    let expected = schema::arrow_schema();
    let found = builder.schema();
    if found.fields().len() != expected.fields().len()
        || found
            .fields()
            .iter()
            .zip(expected.fields().iter())
            .any(|(f, e)| f.name() != e.name() || f.data_type() != e.data_type())
    {
        return Err(IngestError::SchemaMismatch(format!(
            "cache entry {} does not match the accident schema",
            path.display()
        )));
    }

    let reader = builder
        .with_batch_size(READ_BATCH_ROWS)
        .build()
        .map_err(|e| IngestError::cache_io(path, e))?;

    let mut set = RecordSet::new();
    for batch in reader {
        let batch = batch.map_err(|e| IngestError::cache_io(path, e))?;
        set.append(&RecordSet::from_record_batch(&batch)?)?;
    }
    debug!(path = %path.display(), rows = set.len(), "read record set");
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::tests::sample_row;
    use arrow::array::{ArrayRef, Int64Array};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn record_set_survives_parquet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("data_PHA.parquet");

        let mut set = RecordSet::new();
        for i in 1..=3 {
            set.push_row(sample_row(i, "PHA")).unwrap();
        }
        write_record_set(&path, &set).unwrap();

        assert!(path.exists());
        assert_eq!(fs::read_dir(dir.path().join("nested")).unwrap().count(), 1);
        assert_eq!(read_record_set(&path).unwrap(), set);
    }

    #[test]
    fn concurrent_writers_to_one_entry_do_not_collide() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data_JHM.parquet");
        let mut set = RecordSet::new();
        for i in 1..=50 {
            set.push_row(sample_row(i, "JHM")).unwrap();
        }

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| write_record_set(&path, &set)))
                .collect();
            for handle in handles {
                handle.join().unwrap().unwrap();
            }
        });

        assert_eq!(read_record_set(&path).unwrap(), set);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn empty_record_set_survives_parquet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data_KVK.parquet");
        write_record_set(&path, &RecordSet::new()).unwrap();
        let back = read_record_set(&path).unwrap();
        assert!(back.is_empty());
        assert_eq!(back, RecordSet::new());
    }

    #[test]
    fn foreign_parquet_is_a_schema_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("other.parquet");
        let schema = Arc::new(Schema::new(vec![Field::new("x", DataType::Int64, false)]));
        let column = Arc::new(Int64Array::from(vec![1i64])) as ArrayRef;
        let batch = RecordBatch::try_new(schema.clone(), vec![column]).unwrap();
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        assert!(matches!(
            read_record_set(&path),
            Err(IngestError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn garbage_file_is_a_cache_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data_PHA.parquet");
        fs::write(&path, b"garbage").unwrap();
        assert!(matches!(
            read_record_set(&path),
            Err(IngestError::CacheIo { .. })
        ));
    }
}
