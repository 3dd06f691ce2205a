// src/archive/mod.rs
// =============================================================================
// This module owns everything about the archive on disk.
//
// Submodules:
// - layout: computes and creates the dated folder tree for a crawl
// - records: the seed URL record and the crawl log kept in the day folder
// =============================================================================

mod layout;
mod records;

pub use layout::{day_label, parse_domain_name, ArchiveLocation};
pub use records::{
    read_crawl_log, read_seed_url, write_crawl_log, write_seed_url, CrawlLog, CRAWL_LOG_FILE,
    SEED_RECORD_FILE,
};
