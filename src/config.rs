// src/config.rs
// =============================================================================
// Settings for one crawl.
//
// A CrawlConfig is built once (usually from the command line), validated,
// and then shared read-only by every worker. Nothing here changes after
// Crawler::init() runs.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ArchiveError, Result};

// Hard cap on workers per pool
pub const MAX_WORKERS: usize = 10;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) site-archiver/0.1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Seed URL, e.g. "https://www.example.com"
    pub root_url: String,
    /// Concurrent tasks per pool (1..=10)
    pub workers: usize,
    /// How many pages to write before stopping
    pub page_budget: usize,
    /// Download images in a second phase after the pages
    pub download_images: bool,
    /// Report every recovered failure to the operator, not just the log
    pub stacktrace: bool,
    /// Folder that holds the "domains" tree
    pub base_dir: PathBuf,
    pub user_agent: String,
    pub page_timeout: Duration,
    pub stylesheet_timeout: Duration,
    /// Host name overrides, like curl --resolve
    #[serde(default)]
    pub resolve: Vec<(String, SocketAddr)>,
}

impl CrawlConfig {
    pub fn new(root_url: impl Into<String>, workers: usize, page_budget: usize, download_images: bool) -> Self {
        Self {
            root_url: root_url.into(),
            workers,
            page_budget,
            download_images,
            stacktrace: false,
            base_dir: PathBuf::from("."),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            page_timeout: Duration::from_secs(60),
            stylesheet_timeout: Duration::from_secs(30),
            resolve: Vec::new(),
        }
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn with_stacktrace(mut self, stacktrace: bool) -> Self {
        self.stacktrace = stacktrace;
        self
    }

    pub fn with_resolve(mut self, host: impl Into<String>, addr: SocketAddr) -> Self {
        self.resolve.push((host.into(), addr));
        self
    }

    // Checks the numeric limits
    //
    // The seed URL itself is validated by the archive layout, since that's
    // where its pieces (domain name) are actually used.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(ArchiveError::InvalidConfig(format!(
                "worker count must be between 1 and {}, got {}",
                MAX_WORKERS, self.workers
            )));
        }
        if self.page_budget == 0 {
            return Err(ArchiveError::InvalidConfig(
                "page budget must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CrawlConfig::new("https://www.example.com", 4, 100, true);
        assert_eq!(config.page_timeout, Duration::from_secs(60));
        assert_eq!(config.stylesheet_timeout, Duration::from_secs(30));
        assert!(!config.stacktrace);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_worker_bounds() {
        assert!(CrawlConfig::new("https://www.example.com", 0, 10, false).validate().is_err());
        assert!(CrawlConfig::new("https://www.example.com", 11, 10, false).validate().is_err());
        assert!(CrawlConfig::new("https://www.example.com", 10, 10, false).validate().is_ok());
        assert!(CrawlConfig::new("https://www.example.com", 1, 10, false).validate().is_ok());
    }

    #[test]
    fn test_page_budget_must_be_positive() {
        let err = CrawlConfig::new("https://www.example.com", 2, 0, false)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidConfig(_)));
    }
}
