use anyhow::Result;
use log::{debug, info};
use std::io::Write;
use std::path::Path;

use crate::github::ReleaseAsset;
use crate::http::HttpClient;
use crate::runtime::Runtime;

use super::error::SyncError;

/// Downloads one release asset into `dest_dir`, overwriting any existing
/// file with the same name. Returns the number of bytes written.
///
/// HTTP failures surface as [`SyncError::Download`], file I/O failures as
/// [`SyncError::Write`].
#[tracing::instrument(skip(runtime, asset, dest_dir, http_client))]
pub(crate) async fn download_asset<R: Runtime>(
    runtime: &R,
    asset: &ReleaseAsset,
    dest_dir: &Path,
    http_client: &HttpClient,
) -> Result<u64> {
    let dest_path = dest_dir.join(&asset.name);

    info!(
        "Downloading {} from {}...",
        asset.name, asset.browser_download_url
    );

    let mut response = http_client
        .get_stream(&asset.browser_download_url)
        .await
        .map_err(|e| SyncError::download(&asset.name, e))?;

    let mut writer = runtime
        .create_file(&dest_path)
        .map_err(|e| SyncError::write(&dest_path, e))?;

    let mut downloaded_bytes: u64 = 0;
    loop {
        let chunk = response
            .chunk()
            .await
            .map_err(|e| SyncError::download(&asset.name, e.into()))?;
        let Some(chunk) = chunk else { break };

        writer
            .write_all(&chunk)
            .map_err(|e| SyncError::write(&dest_path, e.into()))?;
        downloaded_bytes += chunk.len() as u64;
    }

    debug!(
        "Downloaded {:.2} MB to {:?}",
        downloaded_bytes as f64 / (1024.0 * 1024.0),
        dest_path
    );

    Ok(downloaded_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use reqwest::Client;
    use std::path::PathBuf;

    fn test_asset(url: &str) -> ReleaseAsset {
        ReleaseAsset {
            name: "cpython-3.12.3+20240325-x86_64-unknown-linux-gnu-install_only.tar.gz"
                .to_string(),
            browser_download_url: format!("{}/asset.tar.gz", url),
        }
    }

    #[tokio::test]
    async fn test_download_asset() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/asset.tar.gz")
            .with_status(200)
            .with_body("archive bytes")
            .create_async()
            .await;

        let asset = test_asset(&url);
        let expected_path = PathBuf::from("artifact").join(&asset.name);

        let mut runtime = MockRuntime::new();
        runtime
            .expect_create_file()
            .with(eq(expected_path))
            .returning(|_| Ok(Box::new(std::io::sink())));

        let http_client = HttpClient::new(Client::new());
        let bytes = download_asset(&runtime, &asset, Path::new("artifact"), &http_client)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(bytes, 13); // "archive bytes"
    }

    #[tokio::test]
    async fn test_download_asset_http_failure() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/asset.tar.gz")
            .with_status(500)
            .create_async()
            .await;

        let asset = test_asset(&url);

        // No expectations: the file must never be created on an HTTP failure
        let runtime = MockRuntime::new();

        let http_client = HttpClient::new(Client::new());
        let result = download_asset(&runtime, &asset, Path::new("artifact"), &http_client).await;

        mock.assert_async().await;
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::Download { .. })
        ));
    }

    #[tokio::test]
    async fn test_download_asset_write_failure() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/asset.tar.gz")
            .with_status(200)
            .with_body("archive bytes")
            .create_async()
            .await;

        let asset = test_asset(&url);

        let mut runtime = MockRuntime::new();
        runtime
            .expect_create_file()
            .returning(|_| Err(anyhow::anyhow!("permission denied")));

        let http_client = HttpClient::new(Client::new());
        let result = download_asset(&runtime, &asset, Path::new("artifact"), &http_client).await;

        mock.assert_async().await;
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::Write { .. })
        ));
    }
}
