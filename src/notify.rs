// src/notify.rs
// =============================================================================
// How the crawler talks to whoever is watching it.
//
// The engine doesn't know about terminals or GUIs. It only calls:
// - report(): a human readable message with a severity
// - archive_updated(): once per finished crawl, with the folder names that
//   now exist, so a directory browser can add them without rescanning
//
// ConsoleObserver is the default used by the command line.
// =============================================================================

use tracing::{debug, info};

use crate::archive::ArchiveLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Output,
    Warning,
    Error,
}

pub trait CrawlObserver: Send + Sync {
    fn report(&self, text: &str, severity: Severity);

    fn archive_updated(&self, domain: &str, year: &str, month: &str, day: &str);
}

// Convenience for the crawler, which holds an ArchiveLocation
pub(crate) fn notify_archive(observer: &dyn CrawlObserver, location: &ArchiveLocation) {
    observer.archive_updated(location.domain(), location.year(), location.month(), location.day());
}

// Prints reports to stdout/stderr; copies land in the debug log
#[derive(Debug, Default, Clone)]
pub struct ConsoleObserver;

impl CrawlObserver for ConsoleObserver {
    fn report(&self, text: &str, severity: Severity) {
        debug!(?severity, "{}", text);
        match severity {
            Severity::Output => println!("{}", text),
            Severity::Warning => eprintln!("⚠️  {}", text),
            Severity::Error => eprintln!("❌ {}", text),
        }
    }

    fn archive_updated(&self, domain: &str, year: &str, month: &str, day: &str) {
        info!(domain, year, month, day, "archive updated");
        println!("📁 Archive updated: {}/{}/{}/{}", domain, year, month, day);
    }
}
