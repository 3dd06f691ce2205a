// src/error.rs
// =============================================================================
// Error types for the archive engine.
//
// Two kinds of failure exist:
// - Fatal: the seed URL is unusable, the config is out of range, or the
//   archive folders can't be created. These come back from Crawler::new
//   before any worker starts.
// - Recoverable: a single page, stylesheet or image failed. Workers log and
//   count these, then drop the task. Siblings keep going.
//
// Rust concepts:
// - thiserror: derives std::error::Error and Display from attributes
// - #[from]: lets the ? operator convert io/serde errors automatically
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The seed URL failed validation (needs "www", "http(s)" and two dots)
    #[error("invalid seed url '{url}': {reason}")]
    InvalidSeedUrl { url: String, reason: String },

    /// A configuration value is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// One of the archive folders could not be created
    #[error("failed to init dir {path}: {source}")]
    DirectoryInitFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A page, stylesheet or image could not be downloaded
    #[error("fetch failed for {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    /// Downloaded image bytes could not be decoded or re-encoded
    #[error("decode failed for {url}: {reason}")]
    DecodeFailed { url: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl ArchiveError {
    // Builds a FetchFailed from a reqwest error, with a short category
    // in front so the operator can tell timeouts from DNS problems
    pub fn fetch(url: &str, error: &reqwest::Error) -> Self {
        let error_string = error.to_string();

        let reason = if error.is_timeout() {
            "request timed out".to_string()
        } else if error.is_redirect() {
            "too many redirects".to_string()
        } else if error.is_connect() {
            if error_string.contains("dns") {
                "could not resolve hostname".to_string()
            } else {
                format!("connection failed: {}", error_string)
            }
        } else if let Some(status) = error.status() {
            format!("HTTP {}", status.as_u16())
        } else {
            error_string
        };

        ArchiveError::FetchFailed {
            url: url.to_string(),
            reason,
        }
    }

    pub fn decode(url: &str, reason: impl ToString) -> Self {
        ArchiveError::DecodeFailed {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for errors that abort a crawl before it starts
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ArchiveError::InvalidSeedUrl { .. }
                | ArchiveError::InvalidConfig(_)
                | ArchiveError::DirectoryInitFailed { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ArchiveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let seed = ArchiveError::InvalidSeedUrl {
            url: "nope".to_string(),
            reason: "missing www".to_string(),
        };
        assert!(seed.is_fatal());

        let fetch = ArchiveError::FetchFailed {
            url: "https://www.example.com".to_string(),
            reason: "HTTP 500".to_string(),
        };
        assert!(!fetch.is_fatal());
        assert!(!ArchiveError::decode("https://www.example.com/a.png", "bad header").is_fatal());
    }

    #[test]
    fn test_display_mentions_url() {
        let err = ArchiveError::decode("https://www.example.com/a.png", "bad header");
        assert_eq!(
            err.to_string(),
            "decode failed for https://www.example.com/a.png: bad header"
        );
    }
}
