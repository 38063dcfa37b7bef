// src/config.rs

use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};

use crate::error::{IngestError, Result};

pub const DEFAULT_LISTING_URL: &str = "https://ehw.fit.vutbr.cz/izv/";

/// Where archives come from and where they and the cache live.
///
/// Every field has a default, so an empty YAML file is a valid config.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Page listing the downloadable monthly archives.
    pub listing_url: String,
    /// Directory the archives are downloaded into and parsed from.
    pub archive_dir: PathBuf,
    /// Path of a region's cache entry; `{}` becomes the region code.
    pub cache_template: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            archive_dir: PathBuf::from("data"),
            cache_template: "data_{}.parquet".to_string(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(s).map_err(|e| IngestError::Config(e.to_string()))
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| IngestError::Config(format!("reading {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text)
    }
}
