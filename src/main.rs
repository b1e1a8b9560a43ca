use anyhow::Result;
use clap::Parser;
use pbsync::github::GitHubRepo;
use pbsync::sync::{SyncOptions, sync};
use std::path::PathBuf;
use std::str::FromStr;

/// pbsync - python-build-standalone release mirror
///
/// Fetches the latest release of astral-sh/python-build-standalone, skips it
/// if it was published within the last 24 hours, downloads the x86_64 Linux
/// CPython archives into the destination directory, and records the
/// processed release tag.
///
/// If the GITHUB_TOKEN environment variable is set, it will be used for
/// authentication. This is useful for avoiding rate limits.
#[derive(Parser, Debug)]
#[command(author, version = env!("PBSYNC_VERSION"), about)]
struct Cli {
    /// The GitHub repository to mirror, in the format "owner/repo"
    #[arg(
        long,
        value_name = "OWNER/REPO",
        default_value = "astral-sh/python-build-standalone"
    )]
    repo: String,

    /// Destination directory for downloaded assets (also via PBSYNC_DEST)
    #[arg(long, env = "PBSYNC_DEST", value_name = "PATH", default_value = "artifact")]
    dest: PathBuf,

    /// File recording the tag of the last fully processed release
    #[arg(long, value_name = "PATH", default_value = "version.txt")]
    marker: PathBuf,

    /// GitHub API URL (defaults to https://api.github.com)
    #[arg(long = "api-url", value_name = "URL")]
    api_url: Option<String>,

    /// Skip releases published within the last HOURS hours
    #[arg(long = "min-age-hours", value_name = "HOURS", default_value_t = 24)]
    min_age_hours: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let runtime = pbsync::runtime::RealRuntime;

    let opts = SyncOptions {
        repo: GitHubRepo::from_str(&cli.repo)?,
        dest_dir: cli.dest,
        marker_path: cli.marker,
        min_age: chrono::Duration::hours(cli.min_age_hours),
    };

    sync(runtime, opts, cli.api_url).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["pbsync"]).unwrap();
        assert_eq!(cli.repo, "astral-sh/python-build-standalone");
        assert_eq!(cli.dest, PathBuf::from("artifact"));
        assert_eq!(cli.marker, PathBuf::from("version.txt"));
        assert_eq!(cli.api_url, None);
        assert_eq!(cli.min_age_hours, 24);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "pbsync",
            "--repo",
            "owner/repo",
            "--dest",
            "/tmp/assets",
            "--marker",
            "/tmp/version.txt",
            "--api-url",
            "http://localhost:1234",
            "--min-age-hours",
            "0",
        ])
        .unwrap();
        assert_eq!(cli.repo, "owner/repo");
        assert_eq!(cli.dest, PathBuf::from("/tmp/assets"));
        assert_eq!(cli.marker, PathBuf::from("/tmp/version.txt"));
        assert_eq!(cli.api_url, Some("http://localhost:1234".to_string()));
        assert_eq!(cli.min_age_hours, 0);
    }

    #[test]
    fn test_cli_rejects_unknown_flag() {
        assert!(Cli::try_parse_from(["pbsync", "--unknown"]).is_err());
    }
}
