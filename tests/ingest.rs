use izvscraper::{assemble, IngestError, Region, RegionCache};
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::tempdir;
use zip::write::FileOptions;
use zip::CompressionMethod;

/// One publisher-style row: quoted, `;`-separated, date in field 3, `id` in p1.
fn row(id: &str) -> String {
    let fields: Vec<String> = (0..64)
        .map(|i| match i {
            0 => id.to_string(),
            3 => "2021-06-30".to_string(),
            45..=50 | 57 => "1,5".to_string(),
            51..=56 | 58 | 59 | 62 => "text".to_string(),
            _ => "2".to_string(),
        })
        .map(|f| format!("\"{}\"", f))
        .collect();
    fields.join(";") + "\r\n"
}

fn write_zip(path: &Path, entries: &[(&str, String)]) {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options: FileOptions<'_, ()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, text) in entries {
            zip.start_file(*name, options).unwrap();
            let (bytes, _, _) = encoding_rs::WINDOWS_1250.encode(text);
            zip.write_all(&bytes).unwrap();
        }
        zip.finish().unwrap();
    }
    fs::write(path, buf).unwrap();
}

#[test]
fn two_archives_make_one_region() {
    let root = tempdir().unwrap();
    let archives = root.path().join("data");
    fs::create_dir_all(&archives).unwrap();

    let first = [row("1"), row("2"), row("3"), row("N/A")].concat();
    write_zip(&archives.join("datagis-01-2021.zip"), &[("06.csv", first)]);
    let second = [row("5"), row("6")].concat();
    write_zip(&archives.join("datagis-02-2021.zip"), &[("06.csv", second)]);

    let template = root.path().join("cache").join("data_{}.parquet");
    let cache = RegionCache::new(&archives, template.to_string_lossy()).unwrap();
    let jhm = cache.get_region(Region::Jhm).unwrap();

    assert_eq!(jhm.len(), 6);
    let ds = assemble(&cache, Some(&[Region::Jhm])).unwrap();
    assert_eq!(ds.ints("p1"), Some(&[1, 2, 3, -1, 5, 6][..]));
    assert_eq!(ds.len(), 6);
    for column in ds.records().columns() {
        assert_eq!(column.len(), 6);
    }
    assert!(ds.strs("region").unwrap().iter().all(|r| r == "JHM"));
    assert!(ds.floats("a").unwrap().iter().all(|&v| v == 1.5));
    assert!(cache.entry_path(Region::Jhm).is_file());
}

#[test]
fn region_missing_from_an_archive_does_not_stop_others() {
    let root = tempdir().unwrap();
    let archives = root.path().join("data");
    fs::create_dir_all(&archives).unwrap();

    // the older archive predates the Vysocina split
    write_zip(&archives.join("a.zip"), &[("00.csv", row("1"))]);
    write_zip(
        &archives.join("b.zip"),
        &[("00.csv", row("2")), ("16.csv", row("3"))],
    );

    let template = root.path().join("data_{}.parquet");
    let cache = RegionCache::new(&archives, template.to_string_lossy()).unwrap();
    let ds = assemble(&cache, Some(&[Region::Vys, Region::Pha])).unwrap();

    assert_eq!(ds.ints("p1"), Some(&[3, 1, 2][..]));
    assert_eq!(
        ds.strs("region").unwrap(),
        &["VYS".to_string(), "PHA".into(), "PHA".into()]
    );
}

#[test]
fn unknown_region_fails_fast() {
    let err = Region::parse_list("PHA,ABC").unwrap_err();
    assert!(matches!(err, IngestError::UnknownRegion(code) if code == "ABC"));
}

#[test]
fn building_without_archives_is_reported() {
    let root = tempdir().unwrap();
    let template = root.path().join("data_{}.parquet");
    let cache = RegionCache::new(root.path().join("empty"), template.to_string_lossy()).unwrap();
    let err = assemble(&cache, None).unwrap_err();
    assert!(matches!(err, IngestError::NoArchives(_)));
}
