use anyhow::{Context, Result};
use regex::Regex;

use crate::github::ReleaseAsset;

/// Pattern for the asset names worth mirroring: the x86_64 glibc Linux
/// CPython archives, matched against the whole asset name.
/// Example asset name: cpython-3.12.3+20240325-x86_64-unknown-linux-gnu-install_only.tar.gz
pub const ASSET_PATTERN: &str = r"^.*-x86_64-unknown-linux-gnu.*$";

/// Selects the assets whose name matches [`ASSET_PATTERN`], preserving the
/// release's original asset order. Matching is case-sensitive.
pub fn filter_assets(assets: &[ReleaseAsset]) -> Result<Vec<ReleaseAsset>> {
    let pattern = Regex::new(ASSET_PATTERN).context("Invalid asset name pattern")?;

    Ok(assets
        .iter()
        .filter(|asset| pattern.is_match(&asset.name))
        .cloned()
        .collect())
}
