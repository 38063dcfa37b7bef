use anyhow::{Context, Result};
use clap::Parser;
use izvscraper::{assemble, fetch, Config, Region, RegionCache};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Download the accident archives and build the per-region cache.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// YAML file with `listing_url`, `archive_dir` and `cache_template`
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma-separated region codes (default: all 14)
    #[arg(long)]
    regions: Option<String>,

    /// Directory holding the downloaded archives
    #[arg(long)]
    archive_dir: Option<PathBuf>,

    /// Cache entry path, `{}` is replaced by the region code
    #[arg(long)]
    cache_template: Option<String>,

    /// Work only from archives already on disk
    #[arg(long)]
    skip_fetch: bool,

    /// Drop the requested regions' cache entries before loading
    #[arg(long)]
    refresh: bool,

    /// Write the assembled dataset to this Parquet file
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_yaml_file(path)?,
            None => Config::default(),
        };
        if let Some(dir) = &self.archive_dir {
            config.archive_dir = dir.clone();
        }
        if let Some(template) = &self.cache_template {
            config.cache_template = template.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    let args = Args::parse();
    let config = args.config()?;
    let regions = match &args.regions {
        Some(list) => Region::parse_list(list)?,
        None => Region::ALL.to_vec(),
    };
    info!(?config, regions = ?regions, "startup");

    // fetching runs to completion before any region is parsed
    if args.skip_fetch {
        info!("fetch skipped");
    } else {
        let client = fetch::http_client()?;
        let fetched = fetch::sync_archives(&client, &config.listing_url, &config.archive_dir)
            .await
            .context("syncing archives")?;
        info!(count = fetched.len(), "archives fetched");
        if !fetched.is_empty() && !args.refresh {
            warn!("new archives are not in existing cache entries until --refresh");
        }
    }

    let cache = RegionCache::from_config(&config)?;
    if args.refresh {
        for &region in &regions {
            cache.invalidate(region)?;
        }
    }

    let output = args.output.clone();
    let dataset = tokio::task::spawn_blocking(move || -> Result<_> {
        let dataset = assemble(&cache, Some(regions.as_slice())).context("assembling dataset")?;
        if let Some(path) = &output {
            dataset
                .write_parquet(path)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        Ok(dataset)
    })
    .await??;

    info!(rows = dataset.len(), columns = dataset.names().len(), "done");
    Ok(())
}
