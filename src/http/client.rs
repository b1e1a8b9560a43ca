//! Thin wrapper around reqwest for JSON requests and streamed downloads.

use anyhow::{Context, Result};
use log::debug;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

/// HTTP client used for both the release API and asset downloads.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Performs a GET request and deserializes the JSON response.
    #[tracing::instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET JSON from {}...", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        let response = response
            .error_for_status()
            .context("Request returned an error status")?;

        let result = response
            .json::<T>()
            .await
            .context("Failed to parse JSON response")?;

        Ok(result)
    }

    /// Starts a GET request and returns the response for chunk-wise reading.
    /// Redirects are followed by the underlying client.
    #[tracing::instrument(skip(self))]
    pub async fn get_stream(&self, url: &str) -> Result<Response> {
        debug!("GET {}...", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        let response = response
            .error_for_status()
            .context("Request returned an error status")?;

        Ok(response)
    }
}
