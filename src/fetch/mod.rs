// src/fetch/mod.rs

use reqwest::{header, Client};
use std::{
    fs::File,
    path::{Path, PathBuf},
};
use tracing::{info, instrument, warn};
use url::Url;
use zip::ZipArchive;

use crate::error::{IngestError, Result};

pub mod urls;
pub mod zips;

pub use urls::{discover_latest_archives, ArchiveDescriptor};
pub use zips::fetch_archive;

/// The listing host serves an empty page to clients without a browser UA.
const USER_AGENT: &str = "Mozilla/5.0";

pub fn http_client() -> Result<Client> {
    let mut headers = header::HeaderMap::new();
    headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));
    Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|source| IngestError::Fetch {
            url: String::new(),
            source,
        })
}

/// True when `path` exists and its central directory can be read.
fn is_complete_archive(path: &Path) -> bool {
    File::open(path)
        .ok()
        .and_then(|file| ZipArchive::new(file).ok())
        .is_some()
}

/// Discover the latest archives and download those not yet in `archive_dir`.
///
/// Downloads run one after another. Returns the paths fetched by this call.
/// Archives already on disk are left untouched unless they do not open as a
/// ZIP, which is what an interrupted earlier download leaves behind.
#[instrument(
    level = "info",
    skip(client, archive_dir),
    fields(archive_dir = %archive_dir.as_ref().display())
)]
pub async fn sync_archives(
    client: &Client,
    listing_url: &str,
    archive_dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>> {
    let archive_dir = archive_dir.as_ref();
    let listing = Url::parse(listing_url)
        .map_err(|e| IngestError::Config(format!("listing url `{}`: {}", listing_url, e)))?;

    let latest = discover_latest_archives(client, &listing).await?;
    info!(count = latest.len(), "latest archives");

    let mut fetched = Vec::new();
    for archive in &latest {
        let local = archive_dir.join(&archive.file_name);
        if is_complete_archive(&local) {
            info!(name = %archive.file_name, "already present");
            continue;
        }
        if local.exists() {
            warn!(name = %archive.file_name, "local copy is unreadable, fetching again");
        }
        info!(name = %archive.file_name, "downloading");
        fetched.push(fetch_archive(client, archive, archive_dir).await?);
    }
    Ok(fetched)
}
