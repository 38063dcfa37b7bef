// src/process/mod.rs
use csv::ReaderBuilder;
use encoding_rs::WINDOWS_1250;
use glob::glob;
use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};
use tracing::{debug, trace, warn};
use zip::{result::ZipError, ZipArchive};

use crate::columns::RecordSet;
use crate::error::{IngestError, Result};
use crate::region::Region;

pub mod date_parser;
pub mod row;
pub mod utils;

/// A region's CSV payload, decoded from the archive's legacy code page.
#[derive(Debug)]
pub struct RegionEntry {
    pub archive: PathBuf,
    pub region: Region,
    text: String,
}

/// Rows appended to and skipped from a record set by one entry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RowCounts {
    pub parsed: u64,
    pub skipped: u64,
}

impl RowCounts {
    pub fn add(&mut self, other: RowCounts) {
        self.parsed = self.parsed.saturating_add(other.parsed);
        self.skipped = self.skipped.saturating_add(other.skipped);
    }
}

impl RegionEntry {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// `;`-separated, header-less CSV reader over the decoded text.
    pub fn reader(&self) -> csv::Reader<&[u8]> {
        ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .flexible(true)
            .from_reader(self.text.as_bytes())
    }

    /// Parse every row into `out`, skipping (and logging) rows that fail.
    ///
    /// A row is either appended whole or not at all, so `out` keeps equal
    /// column lengths whatever the input looks like.
    pub fn parse_into(&self, out: &mut RecordSet) -> RowCounts {
        let mut counts = RowCounts::default();
        for (idx, result) in self.reader().records().enumerate() {
            let line = idx as u64 + 1;
            let parsed = result
                .map_err(|e| IngestError::RowParse {
                    row: line,
                    reason: e.to_string(),
                })
                .and_then(|record| {
                    let fields: Vec<&str> = record.iter().collect();
                    row::parse_row(&fields, self.region, line)
                })
                .and_then(|values| out.push_row(values));

            match parsed {
                Ok(()) => counts.parsed += 1,
                Err(e) => {
                    warn!(
                        archive = %self.archive.display(),
                        region = %self.region,
                        error = %e,
                        "skipping row"
                    );
                    counts.skipped += 1;
                }
            }
        }
        trace!(region = %self.region, ?counts, "entry parsed");
        counts
    }
}

/// Open `archive` and decode the CSV entry that belongs to `region`.
///
/// Returns `Ok(None)` when the archive simply has no entry for the region;
/// anything wrong with the container itself is `CorruptArchive`.
#[tracing::instrument(level = "debug", skip(archive), fields(archive = %archive.as_ref().display()))]
pub fn open_region_entry<P: AsRef<Path>>(
    archive: P,
    region: Region,
) -> Result<Option<RegionEntry>> {
    let path = archive.as_ref();
    let file = File::open(path).map_err(|e| IngestError::corrupt(path, e))?;
    let mut zip = ZipArchive::new(file).map_err(|e| IngestError::corrupt(path, e))?;

    let mut entry = match zip.by_name(region.entry_name()) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => {
            debug!(entry = region.entry_name(), "region entry not in archive");
            return Ok(None);
        }
        Err(e) => return Err(IngestError::corrupt(path, e)),
    };

    let mut buf = Vec::new();
    entry.read_to_end(&mut buf).map_err(|e| {
        IngestError::corrupt(path, format!("reading {}: {}", region.entry_name(), e))
    })?;

    let (text, _, had_errors) = WINDOWS_1250.decode(&buf);
    if had_errors {
        warn!(entry = region.entry_name(), "undecodable bytes replaced");
    }

    Ok(Some(RegionEntry {
        archive: path.to_path_buf(),
        region,
        text: text.into_owned(),
    }))
}

/// All `*.zip` files directly inside `dir`, sorted by file name.
pub fn list_archives<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let pattern = format!("{}/*.zip", glob::Pattern::escape(&dir.to_string_lossy()));
    let mut archives: Vec<PathBuf> = glob(&pattern)
        .map_err(|e| IngestError::Config(format!("archive dir pattern {}: {}", pattern, e)))?
        .filter_map(|entry| match entry {
            Ok(p) if p.is_file() => Some(p),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "unreadable archive dir entry");
                None
            }
        })
        .collect();
    archives.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(archives)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::columns::ColumnData;
    use crate::process::row::tests::raw_row;
    use crate::schema::REGION_COLUMN;
    use std::io::{Cursor, Write};
    use tempfile::{tempdir, NamedTempFile};
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    use zip::write::FileOptions;
    use zip::CompressionMethod;

    pub(crate) fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,izvscraper=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    /// Join raw rows the way the publisher does: quoted, `;`-separated, CRLF.
    pub(crate) fn csv_text(rows: &[Vec<String>]) -> String {
        rows.iter()
            .map(|r| {
                r.iter()
                    .map(|f| format!("\"{}\"", f))
                    .collect::<Vec<_>>()
                    .join(";")
            })
            .map(|l| l + "\r\n")
            .collect()
    }

    /// Zip `(entry name, bytes)` pairs into an in-memory archive.
    pub(crate) fn zip_bytes(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options: FileOptions<'_, ()> =
                FileOptions::default().compression_method(CompressionMethod::Stored);
            for (name, data) in entries {
                zip.start_file(*name, options).unwrap();
                zip.write_all(data).unwrap();
            }
            zip.finish().unwrap();
        }
        buf
    }

    #[test]
    fn decodes_windows_1250_entry() {
        init_test_logging();
        let mut row = raw_row(1);
        row[51] = "Žďár".into();
        let text = csv_text(&[row]);
        let (encoded, _, _) = WINDOWS_1250.encode(&text);
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(&zip_bytes(&[("16.csv", encoded.into_owned())]))
            .unwrap();

        let entry = open_region_entry(tmp.path(), Region::Vys).unwrap().unwrap();
        assert!(entry.text().contains("Žďár"));

        let mut set = RecordSet::new();
        let counts = entry.parse_into(&mut set);
        assert_eq!(counts, RowCounts { parsed: 1, skipped: 0 });
        match set.column(51) {
            Some(ColumnData::Str(v)) => assert_eq!(v[0], "Žďár"),
            other => panic!("unexpected column {:?}", other),
        }
        match set.column(REGION_COLUMN) {
            Some(ColumnData::Str(v)) => assert_eq!(v[0], "VYS"),
            other => panic!("unexpected column {:?}", other),
        }
    }

    #[test]
    fn missing_entry_is_not_found() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(&zip_bytes(&[("00.csv", b"".to_vec())])).unwrap();
        assert!(open_region_entry(tmp.path(), Region::Msk).unwrap().is_none());
    }

    #[test]
    fn non_zip_file_is_corrupt() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(b"definitely not a zip").unwrap();
        let err = open_region_entry(tmp.path(), Region::Pha).unwrap_err();
        assert!(matches!(err, IngestError::CorruptArchive { .. }));
    }

    #[test]
    fn cut_off_archive_is_corrupt() {
        let bytes = zip_bytes(&[("00.csv", csv_text(&[raw_row(1)]).into_bytes())]);
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(&bytes[..bytes.len() / 2]).unwrap();
        let err = open_region_entry(tmp.path(), Region::Pha).unwrap_err();
        assert!(matches!(err, IngestError::CorruptArchive { .. }));
    }

    #[test]
    fn bad_rows_are_skipped() {
        let mut bad_date = raw_row(2);
        bad_date[3] = "yesterday".into();
        let short = raw_row(3)[..10].to_vec();
        let text = csv_text(&[raw_row(1), bad_date, short, raw_row(4)]);
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(&zip_bytes(&[("00.csv", text.into_bytes())]))
            .unwrap();

        let entry = open_region_entry(tmp.path(), Region::Pha).unwrap().unwrap();
        let mut set = RecordSet::new();
        let counts = entry.parse_into(&mut set);
        assert_eq!(counts, RowCounts { parsed: 2, skipped: 2 });
        assert_eq!(set.column(0), Some(&ColumnData::Int(vec![1, 4])));
    }

    #[test]
    fn lists_zip_files_in_name_order() {
        let dir = tempdir().unwrap();
        for name in ["b.zip", "a.zip", "notes.txt", "c.zip"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("d.zip")).unwrap();

        let names: Vec<String> = list_archives(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.zip", "b.zip", "c.zip"]);
    }
}
