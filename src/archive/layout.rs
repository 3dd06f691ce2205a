// src/archive/layout.rs
// =============================================================================
// Works out where a crawl's files go and creates the folders.
//
// Layout (the archive viewer depends on it exactly):
//
//   <base>/domains/<DOMAIN>/<YEAR>/<MONTH>/<DAY>/html/
//   <base>/domains/<DOMAIN>/<YEAR>/<MONTH>/<DAY>/assets/css/
//   <base>/domains/<DOMAIN>/<YEAR>/<MONTH>/<DAY>/assets/images/
//
// Example for https://www.example.com crawled on Friday 16 October 2026:
//
//   domains/EXAMPLE/2026/OCTOBER/16TH, FRI/html/
//
// The date is taken when the crawl is created, not from the pages.
// =============================================================================

use chrono::{Datelike, Local, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{ArchiveError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLocation {
    domain: String,
    year: String,
    month: String,
    day: String,
    home: PathBuf,
    html: PathBuf,
    css: PathBuf,
    images: PathBuf,
}

impl ArchiveLocation {
    // Validates the seed URL and creates today's folders under base_dir
    pub fn open(root_url: &str, base_dir: &Path) -> Result<Self> {
        Self::open_on(root_url, base_dir, Local::now().date_naive())
    }

    // Same as open() but for a given date
    //
    // Running it twice for the same seed and day reuses the folders.
    pub fn open_on(root_url: &str, base_dir: &Path, date: NaiveDate) -> Result<Self> {
        let domain = parse_domain_name(root_url)?.to_uppercase();
        let year = date.year().to_string();
        let month = date.format("%B").to_string().to_uppercase();
        let day = day_label(date);

        let home = base_dir
            .join("domains")
            .join(&domain)
            .join(&year)
            .join(&month)
            .join(&day);
        let html = home.join("html");
        let assets = home.join("assets");
        let css = assets.join("css");
        let images = assets.join("images");

        for dir in [&html, &css, &images] {
            fs::create_dir_all(dir).map_err(|source| ArchiveError::DirectoryInitFailed {
                path: dir.clone(),
                source,
            })?;
        }

        Ok(Self {
            domain,
            year,
            month,
            day,
            home,
            html,
            css,
            images,
        })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn month(&self) -> &str {
        &self.month
    }

    pub fn day(&self) -> &str {
        &self.day
    }

    /// The day folder; holds url.data and log.json
    pub fn home_folder(&self) -> &Path {
        &self.home
    }

    pub fn html_folder(&self) -> &Path {
        &self.html
    }

    pub fn css_folder(&self) -> &Path {
        &self.css
    }

    pub fn images_folder(&self) -> &Path {
        &self.images
    }
}

// Pulls the folder name out of a seed URL
//
// Rules:
// - must parse as an absolute http(s) URL with a host
// - must contain "www" and "http"
// - must contain at least two dots
// The name is whatever sits between the first and second dot:
//   "https://www.example.com" -> "example"
pub fn parse_domain_name(root_url: &str) -> Result<String> {
    let invalid = |reason: &str| ArchiveError::InvalidSeedUrl {
        url: root_url.to_string(),
        reason: reason.to_string(),
    };

    let parsed = Url::parse(root_url).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(invalid("url must be an absolute http(s) url with a host"));
    }

    if !root_url.contains("http") || !root_url.contains("www") {
        return Err(invalid(
            "url must always contain 'www' and either contain 'http' or 'https'",
        ));
    }

    if root_url.matches('.').count() < 2 {
        return Err(invalid("url must consist of at least two dots"));
    }

    let first_dot = root_url.find('.').ok_or_else(|| invalid("missing dot"))?;
    let name = root_url[first_dot + 1..]
        .split('.')
        .next()
        .unwrap_or("");

    if name.is_empty() {
        return Err(invalid("empty domain label"));
    }

    Ok(name.to_string())
}

// "16TH, FRI" style label for the day folder
pub fn day_label(date: NaiveDate) -> String {
    let day = date.day();
    format!(
        "{}{}, {}",
        day,
        ordinal_suffix(day).to_uppercase(),
        date.format("%a").to_string().to_uppercase()
    )
}

fn ordinal_suffix(day: u32) -> &'static str {
    match day {
        1 | 21 | 31 => "st",
        2 | 22 => "nd",
        3 | 23 => "rd",
        _ => "th",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_domain_name() {
        assert_eq!(parse_domain_name("https://www.example.com").unwrap(), "example");
        assert_eq!(parse_domain_name("http://www.aftonbladet.se/nyheter").unwrap(), "aftonbladet");
        assert_eq!(parse_domain_name("http://www.example.com:8080/").unwrap(), "example");
    }

    #[test]
    fn test_rejects_bad_seeds() {
        for url in [
            "https://example.com",
            "www.example.com",
            "ftp://www.example.com",
            "https://www-example",
            "not a url",
        ] {
            let err = parse_domain_name(url).unwrap_err();
            assert!(matches!(err, ArchiveError::InvalidSeedUrl { .. }), "{}", url);
        }
    }

    #[test]
    fn test_day_labels() {
        assert_eq!(day_label(date(2026, 10, 16)), "16TH, FRI");
        assert_eq!(day_label(date(2026, 10, 1)), "1ST, THU");
        assert_eq!(day_label(date(2026, 10, 22)), "22ND, THU");
        assert_eq!(day_label(date(2026, 10, 23)), "23RD, FRI");
        assert_eq!(day_label(date(2026, 10, 11)), "11TH, SUN");
        assert_eq!(day_label(date(2026, 10, 31)), "31ST, SAT");
    }

    #[test]
    fn test_creates_full_tree() {
        let base = TempDir::new().unwrap();
        let location =
            ArchiveLocation::open_on("https://www.example.com", base.path(), date(2026, 10, 16)).unwrap();

        let expected_home = base
            .path()
            .join("domains")
            .join("EXAMPLE")
            .join("2026")
            .join("OCTOBER")
            .join("16TH, FRI");
        assert_eq!(location.home_folder(), expected_home.as_path());
        assert_eq!(location.domain(), "EXAMPLE");
        assert_eq!(location.month(), "OCTOBER");
        assert!(location.html_folder().is_dir());
        assert!(location.css_folder().ends_with("assets/css"));
        assert!(location.images_folder().is_dir());
    }

    #[test]
    fn test_open_is_idempotent() {
        let base = TempDir::new().unwrap();
        let first =
            ArchiveLocation::open_on("https://www.example.com", base.path(), date(2026, 10, 16)).unwrap();
        std::fs::write(first.html_folder().join("1.html"), "<html></html>").unwrap();

        let second =
            ArchiveLocation::open_on("https://www.example.com", base.path(), date(2026, 10, 16)).unwrap();
        assert_eq!(first, second);
        assert!(second.html_folder().join("1.html").exists());
    }

    #[test]
    fn test_directory_failure_is_reported() {
        let base = TempDir::new().unwrap();
        // a file where the "domains" folder should go
        std::fs::write(base.path().join("domains"), "blocker").unwrap();

        let err = ArchiveLocation::open_on("https://www.example.com", base.path(), date(2026, 10, 16))
            .unwrap_err();
        assert!(matches!(err, ArchiveError::DirectoryInitFailed { .. }));
    }
}
