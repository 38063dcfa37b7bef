// src/cache/mod.rs

use once_cell::sync::OnceCell;
use std::{
    collections::HashMap,
    fs,
    io,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex, PoisonError,
    },
    time::Instant,
};
use tracing::{debug, info, instrument, warn};

use crate::columns::RecordSet;
use crate::config::Config;
use crate::error::{IngestError, Result};
use crate::process::{self, RowCounts};
use crate::region::Region;

pub mod store;

/// Placeholder in the cache template that is replaced by the region code.
pub const REGION_PLACEHOLDER: &str = "{}";

/// Where a region is in its `Uncached → Parsing → Cached` lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionState {
    Uncached,
    Parsing,
    Cached,
}

#[derive(Default)]
struct Slot {
    value: OnceCell<Arc<RecordSet>>,
    parsing: AtomicBool,
}

/// Per-region memoizing builder of parsed record sets.
///
/// Every region is parsed at most once per process and, as long as its
/// Parquet entry exists, at most once per entry. Concurrent `get_region`
/// calls for the same region share one slot: the first caller builds, the
/// others block on the slot and receive the same `Arc`.
pub struct RegionCache {
    archive_dir: PathBuf,
    cache_template: String,
    slots: Mutex<HashMap<Region, Arc<Slot>>>,
    builds: AtomicUsize,
}

impl RegionCache {
    /// `cache_template` must contain exactly one `{}`, e.g. `cache/data_{}.parquet`.
    pub fn new(archive_dir: impl Into<PathBuf>, cache_template: impl Into<String>) -> Result<Self> {
        let cache_template = cache_template.into();
        if cache_template.matches(REGION_PLACEHOLDER).count() != 1 {
            return Err(IngestError::Config(format!(
                "cache template `{}` must contain exactly one `{}`",
                cache_template, REGION_PLACEHOLDER
            )));
        }
        Ok(Self {
            archive_dir: archive_dir.into(),
            cache_template,
            slots: Mutex::new(HashMap::new()),
            builds: AtomicUsize::new(0),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.archive_dir, config.cache_template.clone())
    }

    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    /// On-disk location of `region`'s cache entry.
    pub fn entry_path(&self, region: Region) -> PathBuf {
        PathBuf::from(
            self.cache_template
                .replacen(REGION_PLACEHOLDER, region.code(), 1),
        )
    }

    /// Number of times any region went through `Parsing` on this cache.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn state(&self, region: Region) -> RegionState {
        let slot = self.slot(region);
        if slot.value.get().is_some() {
            RegionState::Cached
        } else if slot.parsing.load(Ordering::SeqCst) {
            RegionState::Parsing
        } else if self.entry_path(region).is_file() {
            RegionState::Cached
        } else {
            RegionState::Uncached
        }
    }

    /// The full record set for `region`, from memory, disk, or a fresh parse.
    pub fn get_region(&self, region: Region) -> Result<Arc<RecordSet>> {
        let slot = self.slot(region);
        slot.value
            .get_or_try_init(|| self.load_or_build(region, &slot))
            .map(Arc::clone)
    }

    /// Forget `region`: drop the in-memory copy and delete its cache entry.
    ///
    /// Nothing calls this automatically; it is how a caller opts into
    /// re-parsing after new archives have been fetched.
    pub fn invalidate(&self, region: Region) -> Result<()> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&region);
        let path = self.entry_path(region);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(%region, path = %path.display(), "cache entry removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(IngestError::cache_io(path, e)),
        }
    }

    fn slot(&self, region: Region) -> Arc<Slot> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(region).or_default())
    }

    fn load_or_build(&self, region: Region, slot: &Slot) -> Result<Arc<RecordSet>> {
        let path = self.entry_path(region);
        if path.is_file() {
            debug!(%region, path = %path.display(), "cache hit");
            return store::read_record_set(&path).map(Arc::new);
        }

        slot.parsing.store(true, Ordering::SeqCst);
        self.builds.fetch_add(1, Ordering::SeqCst);
        let built = self.build(region);
        slot.parsing.store(false, Ordering::SeqCst);

        let set = built?;
        store::write_record_set(&path, &set)?;
        Ok(Arc::new(set))
    }

    /// Parse `region` out of every archive in the archive directory.
    ///
    /// Archives that cannot be opened are skipped; so are rows that fail to
    /// parse. It is only an error when no archive could be read at all.
    #[instrument(level = "info", skip(self), fields(archive_dir = %self.archive_dir.display()))]
    fn build(&self, region: Region) -> Result<RecordSet> {
        let start = Instant::now();
        let archives = process::list_archives(&self.archive_dir)?;

        let mut set = RecordSet::new();
        let mut totals = RowCounts::default();
        let mut readable = 0usize;

        for archive in &archives {
            match process::open_region_entry(archive, region) {
                Ok(Some(entry)) => {
                    readable += 1;
                    totals.add(entry.parse_into(&mut set));
                }
                Ok(None) => {
                    readable += 1;
                    debug!(%region, archive = %archive.display(), "no entry for region");
                }
                Err(e) => warn!(%region, error = %e, "skipping archive"),
            }
        }

        if readable == 0 {
            return Err(IngestError::NoArchives(self.archive_dir.clone()));
        }

        info!(
            %region,
            archives = archives.len(),
            rows = totals.parsed,
            skipped = totals.skipped,
            elapsed = ?start.elapsed(),
            "region parsed"
        );
        Ok(set)
    }
}
