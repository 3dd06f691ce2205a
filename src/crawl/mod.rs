// src/crawl/mod.rs
// =============================================================================
// This module handles the crawl itself.
//
// Features:
// - Bounded worker pools (1-10 workers each) on tokio tasks
// - A frontier that lets each URL be crawled at most once
// - Page budget enforced when pages are written
// - A second phase that downloads every unique image found
// - Staged shutdown: HTML pools -> image pool -> completion report
//
// Submodules:
// - crawler: the public Crawler handle and the lifecycle
// - worker: crawl and write jobs
// - download: stylesheet prefetch and image jobs
// - frontier: dedup set and the unique image list
// - pool: the worker pool
// =============================================================================

mod crawler;
mod download;
mod frontier;
mod pool;
mod worker;

pub use crawler::{CrawlStats, Crawler, Phase, ShutdownOutcome};
pub use download::save_image;
pub use frontier::{Frontier, UniqueImageList};
pub use pool::WorkerPool;
pub use worker::ArchivedPage;
