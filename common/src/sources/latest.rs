use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;

use crate::Snapshot;

pub const DEFAULT_LATEST_API_URL: &str = "http://127.0.0.1:5001/api/latest";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

pub async fn fetch_latest(client: &Client, url: &str) -> Result<Snapshot> {
    log::debug!("Fetching latest snapshot from: {url}");

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to send request to {url}"))?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Request failed with status: {}",
            response.status()
        ));
    }

    let snapshot = response
        .json::<Snapshot>()
        .await
        .map_err(|e| anyhow!("Failed to deserialize response: {}", e))?;

    Ok(snapshot)
}

/// Polling handle for the latest-snapshot endpoint.
///
/// Cheap to clone; clones share the underlying connection pool so each tick
/// can fetch from its own task.
#[derive(Clone, Debug)]
pub struct LatestSource {
    client: Client,
    url: String,
}

impl LatestSource {
    pub fn new(url: &str) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    /// Every request is abandoned after `timeout`. There are no retries, the
    /// next refresh tick is the retry.
    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(LatestSource {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch(&self) -> Result<Snapshot> {
        fetch_latest(&self.client, &self.url).await
    }
}
