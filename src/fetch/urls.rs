// src/fetch/urls.rs
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, instrument, trace};
use url::Url;

use crate::error::{IngestError, Result};

/// Download buttons on the listing page carry exactly these classes.
const ARCHIVE_LINK_SELECTOR: &str = "a.btn.btn-sm.btn-primary[href]";

/// Substring of an archive link that marks the first archive of a year.
pub const YEAR_START_MARKER: &str = "01-";

/// One downloadable archive as linked from the listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveDescriptor {
    /// The `href` exactly as written in the page.
    pub href: String,
    /// `href` resolved against the listing URL.
    pub url: Url,
    /// Last path segment of `url`; the name the archive is stored under.
    pub file_name: String,
}

impl ArchiveDescriptor {
    pub fn is_year_start(&self) -> bool {
        self.href.contains(YEAR_START_MARKER)
    }
}

/// All archive links in `html`, in document order.
pub fn extract_archive_links(html: &str, base: &Url) -> Vec<ArchiveDescriptor> {
    let selector = Selector::parse(ARCHIVE_LINK_SELECTOR)
        .expect("CSS selector for archive links should be valid");
    Html::parse_document(html)
        .select(&selector)
        .filter_map(|e| e.value().attr("href"))
        .filter_map(|href| {
            let url = base.join(href).ok()?;
            let file_name = url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|name| !name.is_empty())?
                .to_string();
            Some(ArchiveDescriptor {
                href: href.to_string(),
                url,
                file_name,
            })
        })
        .collect()
}

/// Pick the archives worth fetching from links in document order.
///
/// Links are walked newest first. The newest is always taken; after that
/// links are skipped until one carries [`YEAR_START_MARKER`], and the link
/// right after such a marker is taken as well. A taken link never arms the
/// marker itself.
///
/// This relies on the publisher's naming convention: each year's archive
/// run starts with a `01-` archive and the one just before it is the last,
/// complete archive of the previous year. Archives outside that pattern are
/// silently passed over.
pub fn select_latest(mut links: Vec<ArchiveDescriptor>) -> Vec<ArchiveDescriptor> {
    links.reverse();
    let mut take_next = true;
    let mut selected = Vec::new();
    for link in links {
        if take_next {
            trace!(href = %link.href, "selected");
            selected.push(link);
            take_next = false;
        } else if link.is_year_start() {
            take_next = true;
        }
    }
    selected
}

/// Scrape `listing` and return the archives that should be present locally.
#[instrument(level = "info", skip(client, listing), fields(listing = %listing))]
pub async fn discover_latest_archives(
    client: &Client,
    listing: &Url,
) -> Result<Vec<ArchiveDescriptor>> {
    let fetch_err = |source| IngestError::Fetch {
        url: listing.to_string(),
        source,
    };
    let html = client
        .get(listing.clone())
        .send()
        .await
        .map_err(fetch_err)?
        .error_for_status()
        .map_err(fetch_err)?
        .text()
        .await
        .map_err(fetch_err)?;

    let links = extract_archive_links(&html, listing);
    debug!(links = links.len(), "archive links found");
    Ok(select_latest(links))
}
