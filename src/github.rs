use crate::config::Source;
use crate::error::{EndgetError, Result};
use crate::shell::UntrustedScript;
use log::debug;
use reqwest::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;

// GitHub rejects API calls without a User-Agent.
const AGENT: &str = concat!("endget/", env!("CARGO_PKG_VERSION"));

/// One entry of a contents API directory listing. Other fields are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GithubFile {
    pub name: String,
}

/// Lists the program directory. Only the first page the API returns is read.
pub async fn list_directory(client: &Client, source: &Source) -> Result<Vec<GithubFile>> {
    let url = source.listing_url();
    debug!("GET {}", url);

    let response = client
        .get(&url)
        .header(USER_AGENT, AGENT)
        .header(ACCEPT, "application/vnd.github+json")
        .send()
        .await
        .map_err(|e| EndgetError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(EndgetError::Network(format!(
            "GitHub API request failed with status: {}",
            status
        )));
    }

    let text = response
        .text()
        .await
        .map_err(|e| EndgetError::Network(e.to_string()))?;

    serde_json::from_str(&text).map_err(|e| EndgetError::Parse(e.to_string()))
}

/// Downloads a script body into memory.
///
/// The body is kept as raw bytes. Decoding it as text would swap invalid UTF-8
/// for replacement characters, and then the script that runs would not be the
/// one that was served.
pub async fn download_script(client: &Client, url: &str) -> Result<UntrustedScript> {
    let fetch_error = |reason: String| EndgetError::Fetch {
        url: url.to_string(),
        reason,
    };

    debug!("GET {}", url);
    let response = client
        .get(url)
        .header(USER_AGENT, AGENT)
        .send()
        .await
        .map_err(|e| fetch_error(e.to_string()))?;

    if !response.status().is_success() {
        return Err(fetch_error(format!("server answered {}", response.status())));
    }

    let content_length = response.content_length();
    let body = response
        .bytes()
        .await
        .map_err(|e| fetch_error(e.to_string()))?;

    Ok(UntrustedScript::new(url, body.to_vec(), content_length))
}
