// src/core/net.rs
// Plain page fetch for the document path. No rendering, no script execution:
// whatever the server returns is what the extractor sees.

use std::time::Duration;

use crate::error::FetchError;

pub fn http_client(timeout_secs: u64) -> Result<reqwest::blocking::Client, FetchError> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("parcel_track/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(FetchError::Client)
}

/// GET `url` and return the body text. Non-2xx statuses are errors.
pub fn fetch_page(client: &reqwest::blocking::Client, url: &str) -> Result<String, FetchError> {
    let resp = client.get(url).send().map_err(FetchError::Transport)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status { url: url.to_string(), status: status.as_u16() });
    }
    resp.text().map_err(FetchError::Transport)
}
