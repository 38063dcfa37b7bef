//! Ingestion of the national traffic-accident open-data archive.
//!
//! Monthly ZIP archives are discovered and downloaded by [`fetch`], each
//! region's CSV is pulled out and typed by [`process`], parsed regions are
//! memoized on disk by [`cache`], and [`dataset::assemble`] merges the
//! requested regions into one columnar [`Dataset`].

pub mod cache;
pub mod columns;
pub mod config;
pub mod dataset;
pub mod error;
pub mod fetch;
pub mod process;
pub mod region;
pub mod schema;

pub use cache::{RegionCache, RegionState};
pub use columns::{ColumnData, RecordSet, Value};
pub use config::Config;
pub use dataset::{assemble, Dataset};
pub use error::{IngestError, Result};
pub use region::Region;
