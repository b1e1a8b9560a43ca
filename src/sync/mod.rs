//! The release synchronization workflow: fetch the latest release, skip it
//! while it is still fresh, filter its assets, download the matches
//! sequentially, and record the processed tag.

mod download;
mod error;
mod filter;

pub use error::SyncError;
pub use filter::{ASSET_PATTERN, filter_assets};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use std::path::{Path, PathBuf};

use crate::github::{FetchLatestRelease, GitHub, GitHubRepo};
use crate::http::HttpClient;
use crate::runtime::Runtime;

use download::download_asset;

/// Everything a single synchronization run needs to know.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub repo: GitHubRepo,
    /// Directory the downloaded assets are written into.
    pub dest_dir: PathBuf,
    /// File recording the tag of the last fully processed release.
    pub marker_path: PathBuf,
    /// Releases younger than this are skipped.
    pub min_age: Duration,
}

/// Terminal state of a successful run.
#[derive(Debug, PartialEq)]
pub enum SyncOutcome {
    /// The latest release is younger than the freshness window; nothing was
    /// downloaded and the marker file was not touched.
    SkippedFresh { tag: String },
    /// Every matching asset was downloaded and the marker was updated.
    Completed { tag: String, downloaded: usize },
}

pub struct Config<R: Runtime, G: FetchLatestRelease> {
    pub runtime: R,
    pub github: G,
    pub http_client: HttpClient,
}

impl<R: Runtime> Config<R, GitHub> {
    pub fn new(runtime: R, api_url: Option<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Ok(token) = runtime.env_var("GITHUB_TOKEN") {
            let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token))?;
            auth_value.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth_value);
            debug!("Using GITHUB_TOKEN for authentication ({} chars)", token.len());
        }

        let client = Client::builder()
            .user_agent("pbsync-cli")
            .default_headers(headers)
            .build()?;

        let http_client = HttpClient::new(client);
        let github = GitHub::new(http_client.clone(), api_url);

        Ok(Self {
            runtime,
            github,
            http_client,
        })
    }
}

pub struct Synchronizer<R: Runtime, G: FetchLatestRelease> {
    runtime: R,
    github: G,
    http_client: HttpClient,
}

impl<R: Runtime, G: FetchLatestRelease> Synchronizer<R, G> {
    pub fn new(runtime: R, github: G, http_client: HttpClient) -> Self {
        Self {
            runtime,
            github,
            http_client,
        }
    }

    /// Runs the whole workflow once against the current time.
    #[tracing::instrument(skip(self, opts))]
    pub async fn sync(&self, opts: &SyncOptions) -> Result<SyncOutcome> {
        self.sync_at(opts, Utc::now()).await
    }

    /// Runs the whole workflow once, with an explicit "now" for the
    /// freshness check.
    #[tracing::instrument(skip(self, opts, now))]
    pub async fn sync_at(&self, opts: &SyncOptions, now: DateTime<Utc>) -> Result<SyncOutcome> {
        info!("Fetching latest release information for {}...", opts.repo);

        let release = self
            .github
            .latest_release(&opts.repo)
            .await
            .map_err(SyncError::fetch)?;

        info!("Successfully fetched latest release: {}", release.tag_name);

        if release.published_within(opts.min_age, now) {
            info!(
                "Release {} was published within the last {} hours, skipping",
                release.tag_name,
                opts.min_age.num_hours()
            );
            return Ok(SyncOutcome::SkippedFresh {
                tag: release.tag_name,
            });
        }

        let assets = filter_assets(&release.assets)?;
        if assets.is_empty() {
            return Err(SyncError::NoMatchingAssets {
                tag: release.tag_name,
            }
            .into());
        }

        debug!(
            "{} of {} assets match the asset pattern",
            assets.len(),
            release.assets.len()
        );

        self.runtime
            .create_dir_all(&opts.dest_dir)
            .with_context(|| {
                format!("Failed to create destination directory {:?}", opts.dest_dir)
            })?;

        for asset in &assets {
            download_asset(&self.runtime, asset, &opts.dest_dir, &self.http_client).await?;
        }

        self.record_processed_tag(&opts.marker_path, &release.tag_name)?;

        info!(
            "Synchronized {} assets from release {}",
            assets.len(),
            release.tag_name
        );

        Ok(SyncOutcome::Completed {
            tag: release.tag_name,
            downloaded: assets.len(),
        })
    }

    /// Records the tag of a fully processed release, replacing any previous
    /// content. Only reached after every selected asset downloaded.
    fn record_processed_tag(&self, marker_path: &Path, tag: &str) -> Result<()> {
        self.runtime
            .write(marker_path, tag.as_bytes())
            .map_err(|e| SyncError::write(marker_path, e))?;
        debug!("Recorded processed release {} in {:?}", tag, marker_path);
        Ok(())
    }
}

/// Entry point used by the binary: builds the real services and runs one
/// synchronization pass.
#[tracing::instrument(skip(runtime, opts, api_url))]
pub async fn sync<R: Runtime>(
    runtime: R,
    opts: SyncOptions,
    api_url: Option<String>,
) -> Result<SyncOutcome> {
    let config = Config::new(runtime, api_url)?;
    let synchronizer = Synchronizer::new(config.runtime, config.github, config.http_client);
    synchronizer.sync(&opts).await
}
