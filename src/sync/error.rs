//! Error taxonomy for the synchronization workflow.

use std::path::{Path, PathBuf};

/// A failed step of a synchronization run. Every variant is fatal: the run
/// terminates and the marker file is left untouched.
#[derive(Debug)]
pub enum SyncError {
    /// The release metadata request failed or returned unparseable content.
    Fetch(String),
    /// The fetched release has no asset matching the asset pattern.
    NoMatchingAssets { tag: String },
    /// An asset's HTTP download failed.
    Download { asset: String, reason: String },
    /// Writing downloaded bytes or the marker file to disk failed.
    Write { path: PathBuf, reason: String },
}

impl SyncError {
    pub(crate) fn fetch(err: anyhow::Error) -> Self {
        SyncError::Fetch(format!("{:#}", err))
    }

    pub(crate) fn download(asset: &str, err: anyhow::Error) -> Self {
        SyncError::Download {
            asset: asset.to_string(),
            reason: format!("{:#}", err),
        }
    }

    pub(crate) fn write(path: &Path, err: anyhow::Error) -> Self {
        SyncError::Write {
            path: path.to_path_buf(),
            reason: format!("{:#}", err),
        }
    }
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::Fetch(msg) => {
                write!(f, "Failed to fetch release metadata: {}", msg)
            }
            SyncError::NoMatchingAssets { tag } => {
                write!(f, "No assets in release {} match the asset pattern", tag)
            }
            SyncError::Download { asset, reason } => {
                write!(f, "Failed to download asset {}: {}", asset, reason)
            }
            SyncError::Write { path, reason } => {
                write!(f, "Failed to write {:?}: {}", path, reason)
            }
        }
    }
}

impl std::error::Error for SyncError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_error_display() {
        let err = SyncError::Fetch("connection refused".to_string());
        assert!(err.to_string().contains("fetch release metadata"));
        assert!(err.to_string().contains("connection refused"));

        let err = SyncError::NoMatchingAssets {
            tag: "20240325".to_string(),
        };
        assert!(err.to_string().contains("No assets"));
        assert!(err.to_string().contains("20240325"));

        let err = SyncError::Download {
            asset: "cpython.tar.gz".to_string(),
            reason: "HTTP 500".to_string(),
        };
        assert!(err.to_string().contains("cpython.tar.gz"));
        assert!(err.to_string().contains("HTTP 500"));

        let err = SyncError::Write {
            path: PathBuf::from("artifact/cpython.tar.gz"),
            reason: "disk full".to_string(),
        };
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_sync_error_downcast_through_anyhow() {
        let err: anyhow::Error = SyncError::NoMatchingAssets {
            tag: "20240325".to_string(),
        }
        .into();
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::NoMatchingAssets { .. })
        ));
    }
}
