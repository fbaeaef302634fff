use anyhow::{Context, Result};
use std::time::Duration;

/// Default timeout for playlist and API requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(25);

pub const USER_AGENT: &str = concat!("playlist-sync/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by every request of a run.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// True for addresses fetched over HTTP; anything else is a local path.
pub fn is_remote(address: &str) -> bool {
    let lower = address.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Fetch a playlist from a URL or read it from a local path.
///
/// Any transport error or non-2xx status is fatal for the run.
pub async fn fetch_text(client: &reqwest::Client, address: &str) -> Result<String> {
    if !is_remote(address) {
        let text = tokio::fs::read_to_string(address)
            .await
            .with_context(|| format!("Failed to read {address}"))?;
        tracing::info!(path = %address, bytes = text.len(), "Read local playlist");
        return Ok(text);
    }

    tracing::info!(url = %address, "Fetching");
    let response = client
        .get(address)
        .send()
        .await
        .with_context(|| format!("Failed to fetch {address}"))?;

    let status = response.status();
    anyhow::ensure!(status.is_success(), "HTTP {status} for {address}");

    let text = response
        .text()
        .await
        .context("Failed to read response body")?;
    tracing::info!(bytes = text.len(), "Received playlist");
    Ok(text)
}
