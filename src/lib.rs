// src/lib.rs
// =============================================================================
// site-archiver: crawls a website and stores it for offline browsing.
//
// Give it a seed URL and it will:
// 1. Create a dated folder for the site (domains/NAME/YEAR/MONTH/DAY)
// 2. Download the seed page's stylesheets
// 3. Crawl pages reachable from the seed with a fixed number of workers
// 4. Rewrite each page so links, CSS and images point at local files
// 5. Save pages until the page budget is reached
// 6. Optionally download every image the saved pages refer to
//
// The binary in main.rs is a thin command line around Crawler.
// =============================================================================

pub mod archive;
pub mod config;
pub mod crawl;
pub mod error;
pub mod fetch;
pub mod html;
pub mod logging;
pub mod notify;
pub mod progress;
pub mod urls;

pub use archive::ArchiveLocation;
pub use config::CrawlConfig;
pub use crawl::{CrawlStats, Crawler, Phase, ShutdownOutcome};
pub use error::{ArchiveError, Result};
pub use notify::{ConsoleObserver, CrawlObserver, Severity};
pub use progress::{ProgressKind, ProgressSnapshot};
