use crate::core::types::{Detail, PackageDetails};
use crate::error::{Result, UnipkgError};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_LENGTH;
use std::time::Duration;

const USER_AGENT: &str = concat!("unipkg/", env!("CARGO_PKG_VERSION"));
const HEAD_TIMEOUT_SECS: u64 = 15;

const BYTES_PER_MB: u64 = 1024 * 1024;

pub fn client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(HEAD_TIMEOUT_SECS))
        .build()
        .map_err(|e| UnipkgError::RemoteFetchError(format!("Could not build HTTP client: {}", e)))
}

/// Size of a remote file in whole megabytes, from a HEAD request's Content-Length.
pub fn installer_size_mb(client: &Client, url: &str) -> Result<u64> {
    let resp = client
        .head(url)
        .send()
        .map_err(|e| UnipkgError::RemoteFetchError(format!("Network error: {}", e)))?;

    if !resp.status().is_success() {
        return Err(UnipkgError::RemoteFetchError(format!(
            "HEAD {} returned {}",
            url,
            resp.status()
        )));
    }

    let bytes = resp
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .ok_or_else(|| UnipkgError::RemoteFetchError(format!("No Content-Length for {}", url)))?;

    Ok(bytes_to_mb(bytes))
}

pub fn bytes_to_mb(bytes: u64) -> u64 {
    bytes / BYTES_PER_MB
}

/// Fill `installer_size` when an installer URL is known; failures leave the sentinel.
pub fn fill_installer_size(details: &mut PackageDetails) {
    let Some(url) = details.installer_url.as_known().cloned() else {
        return;
    };
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return;
    }
    match client().and_then(|c| installer_size_mb(&c, &url)) {
        Ok(size) => details.installer_size = Detail::Known(size),
        Err(e) => tracing::debug!(%url, error = %e, "installer size unavailable"),
    }
}
