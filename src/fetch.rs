// src/fetch.rs
// =============================================================================
// HTTP downloads for pages, stylesheets and images.
//
// One reqwest Client is built per crawl and cloned into every task
// (cloning is cheap, it shares the connection pool).
//
// Every failure comes back as ArchiveError::FetchFailed. Callers decide
// whether that matters (it never does for a single page).
// =============================================================================

use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::config::CrawlConfig;
use crate::error::{ArchiveError, Result};

// A downloaded HTML page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Where we ended up after redirects; relative links resolve against it
    pub location: Url,
    pub body: String,
}

// Builds the shared HTTP client for a crawl
//
// Uses the configured user agent, the page timeout and any host overrides.
pub fn build_client(config: &CrawlConfig) -> Result<Client> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.page_timeout)
        .redirect(reqwest::redirect::Policy::limited(10));

    for (host, addr) in &config.resolve {
        builder = builder.resolve(host, *addr);
    }

    builder.build().map_err(|e| ArchiveError::FetchFailed {
        url: config.root_url.clone(),
        reason: format!("could not build http client: {}", e),
    })
}

// Fetches a web page and returns its HTML content
pub async fn fetch_page(client: &Client, url: &str) -> Result<FetchedPage> {
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| ArchiveError::fetch(url, &e))?;

    let location = response.url().clone();
    let body = response.text().await.map_err(|e| ArchiveError::fetch(url, &e))?;

    Ok(FetchedPage { location, body })
}

// Fetches a text resource (stylesheet) with its own timeout
pub async fn fetch_text(client: &Client, url: &str, timeout: Duration) -> Result<String> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| ArchiveError::fetch(url, &e))?;

    response.text().await.map_err(|e| ArchiveError::fetch(url, &e))
}

// Fetches raw bytes, whatever the declared content type is
pub async fn fetch_bytes(client: &Client, url: &str) -> Result<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| ArchiveError::fetch(url, &e))?;

    let bytes = response.bytes().await.map_err(|e| ArchiveError::fetch(url, &e))?;
    Ok(bytes.to_vec())
}
