use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::http::HttpClient;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FetchLatestRelease: Send + Sync {
    async fn latest_release(&self, repo: &GitHubRepo) -> Result<Release>;
}

pub struct GitHub {
    pub client: HttpClient,
    pub api_url: String,
}

impl GitHub {
    #[tracing::instrument(skip(client, api_url))]
    pub fn new(client: HttpClient, api_url: Option<String>) -> Self {
        let api_url = api_url.unwrap_or_else(|| "https://api.github.com".to_string());
        Self { client, api_url }
    }
}

#[async_trait]
impl FetchLatestRelease for GitHub {
    #[tracing::instrument(skip(self, repo))]
    async fn latest_release(&self, repo: &GitHubRepo) -> Result<Release> {
        GitHub::fetch_latest_release(repo, &self.client, &self.api_url).await
    }
}

impl GitHub {
    #[tracing::instrument(skip(client, api_url))]
    pub async fn fetch_latest_release(
        repo: &GitHubRepo,
        client: &HttpClient,
        api_url: &str,
    ) -> Result<Release> {
        let url = format!(
            "{}/repos/{}/{}/releases/latest",
            api_url, repo.owner, repo.repo
        );

        debug!("Fetching latest release from {}...", url);

        client
            .get_json::<Release>(&url)
            .await
            .context("Failed to fetch latest release from GitHub API")
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct GitHubRepo {
    pub owner: String,
    pub repo: String,
}

impl std::fmt::Display for GitHubRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for GitHubRepo {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            Err(anyhow!("Invalid repository format. Expected 'owner/repo'."))
        } else {
            Ok(GitHubRepo {
                owner: parts[0].to_string(),
                repo: parts[1].to_string(),
            })
        }
    }
}

/// Represents a GitHub release asset
#[derive(Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// Represents a GitHub release
#[derive(Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct Release {
    pub tag_name: String,
    pub name: Option<String>,
    pub published_at: DateTime<Utc>,
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// True if the release was published within `window` of `now`.
    /// A publish timestamp in the future also counts as within the window.
    pub fn published_within(&self, window: Duration, now: DateTime<Utc>) -> bool {
        now - self.published_at <= window
    }
}
