// src/archive/records.rs
// =============================================================================
// Small files stored next to an archive in the day folder.
//
// - url.data: the seed URL, so a viewer can recompute which hashed file is
//   the start page without opening any HTML
// - log.json: a summary of the finished crawl
// =============================================================================

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub const SEED_RECORD_FILE: &str = "url.data";
pub const CRAWL_LOG_FILE: &str = "log.json";

// Writers are async since they run inside crawl tasks; the readers serve
// the inspect command and stay blocking.
pub async fn write_seed_url(home: &Path, root_url: &str) -> Result<()> {
    tokio::fs::write(home.join(SEED_RECORD_FILE), root_url).await?;
    Ok(())
}

pub fn read_seed_url(home: &Path) -> Result<String> {
    let content = fs::read_to_string(home.join(SEED_RECORD_FILE))?;
    Ok(content.trim().to_string())
}

// Summary written once a crawl reaches Completed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlLog {
    pub root_url: String,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub html_seconds: f64,
    pub image_seconds: f64,
    pub pages_written: usize,
    pub page_failures: usize,
    pub images_saved: usize,
    pub image_failures: usize,
    pub html_folder: PathBuf,
}

pub async fn write_crawl_log(home: &Path, log: &CrawlLog) -> Result<()> {
    let json = serde_json::to_string_pretty(log)?;
    tokio::fs::write(home.join(CRAWL_LOG_FILE), json).await?;
    Ok(())
}

// Returns Ok(None) when the crawl never finished (no log written)
pub fn read_crawl_log(home: &Path) -> Result<Option<CrawlLog>> {
    let path = home.join(CRAWL_LOG_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_seed_record() {
        let dir = TempDir::new().unwrap();
        write_seed_url(dir.path(), "https://www.example.com").await.unwrap();
        assert_eq!(read_seed_url(dir.path()).unwrap(), "https://www.example.com");

        // a second crawl the same day overwrites the record
        write_seed_url(dir.path(), "https://www.example.com/blog").await.unwrap();
        assert_eq!(read_seed_url(dir.path()).unwrap(), "https://www.example.com/blog");
    }

    #[test]
    fn test_missing_seed_record_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(read_seed_url(dir.path()).is_err());
    }

    #[tokio::test]
    async fn test_crawl_log() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_crawl_log(dir.path()).unwrap(), None);

        let now = Local::now();
        let log = CrawlLog {
            root_url: "https://www.example.com".to_string(),
            started_at: now,
            finished_at: now,
            html_seconds: 1.5,
            image_seconds: 0.0,
            pages_written: 5,
            page_failures: 1,
            images_saved: 0,
            image_failures: 0,
            html_folder: dir.path().join("html"),
        };
        write_crawl_log(dir.path(), &log).await.unwrap();

        let read = read_crawl_log(dir.path()).unwrap().unwrap();
        assert_eq!(read.pages_written, 5);
        assert_eq!(read.page_failures, 1);
        assert_eq!(read.root_url, "https://www.example.com");
    }
}
