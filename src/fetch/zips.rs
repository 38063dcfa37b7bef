use futures_util::StreamExt;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, instrument};

use super::urls::ArchiveDescriptor;
use crate::error::{IngestError, Result};

/// Stream `archive` into `dest_dir/<file_name>` and return the written path.
///
/// Chunks are written as they arrive, straight into the final file. A failed
/// transfer leaves a truncated archive behind; the extractor reports it as
/// corrupt when it is read. Nothing is retried here.
#[instrument(level = "info", skip(client, archive, dest_dir), fields(url = %archive.url))]
pub async fn fetch_archive(
    client: &Client,
    archive: &ArchiveDescriptor,
    dest_dir: impl AsRef<Path>,
) -> Result<PathBuf> {
    let dest_dir = dest_dir.as_ref();
    let dest_path = dest_dir.join(&archive.file_name);
    let write_err = |source| IngestError::ArchiveWrite {
        path: dest_path.clone(),
        source,
    };
    let fetch_err = |source| IngestError::Fetch {
        url: archive.url.to_string(),
        source,
    };

    fs::create_dir_all(dest_dir).await.map_err(write_err)?;

    let resp = client
        .get(archive.url.clone())
        .send()
        .await
        .map_err(fetch_err)?
        .error_for_status()
        .map_err(fetch_err)?;

    let mut file = fs::File::create(&dest_path).await.map_err(write_err)?;
    let mut stream = resp.bytes_stream();
    let mut total = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(fetch_err)?;
        file.write_all(&chunk).await.map_err(write_err)?;
        total += chunk.len() as u64;
    }
    file.flush().await.map_err(write_err)?;

    debug!(bytes = total, path = %dest_path.display(), "archive written");
    Ok(dest_path)
}
