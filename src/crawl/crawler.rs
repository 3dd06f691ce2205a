// src/crawl/crawler.rs
// =============================================================================
// The crawler: owns the worker pools, the shared state and the lifecycle.
//
// Lifecycle:
//
//   Created -> CrawlingHtml -> DownloadingImages -> Completed   (images on)
//   Created -> CrawlingHtml -> ShutdownRequested -> Completed   (images off)
//   DownloadingImages -> ShutdownRequested -> Completed         (abort)
//
// The HTML phase runs two pools side by side: crawl workers (fetch and
// rewrite) and write workers (save to disk). It ends when the page budget
// is written, when no crawl or write work is left, or when the operator
// calls shutdown(). Whichever comes first wins a compare-and-set on the
// phase; everyone else sees a phase that already moved on.
//
// The image phase and the final bookkeeping run on their own task, spawned
// through the runtime handle saved by init(), so whoever triggered the
// shutdown (often a worker, sometimes a UI thread outside the runtime)
// never waits for them.
// =============================================================================

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use url::Url;

use super::download::{download_image, prefetch_stylesheets};
use super::frontier::{Frontier, UniqueImageList};
use super::pool::WorkerPool;
use super::worker::{crawl_page, write_page, ArchivedPage};
use crate::archive::{write_crawl_log, write_seed_url, ArchiveLocation, CrawlLog};
use crate::config::CrawlConfig;
use crate::error::{ArchiveError, Result};
use crate::fetch::build_client;
use crate::notify::{notify_archive, CrawlObserver, Severity};
use crate::progress::{ProgressKind, ProgressSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Created,
    CrawlingHtml,
    DownloadingImages,
    /// Stopping; Completed follows once the last phase has wound down
    ShutdownRequested,
    Completed,
}

// What a call to shutdown() did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    Initiated,
    AlreadyShutdown,
    NotInitialized,
}

// Counters shared by every worker; all lock-free
#[derive(Debug, Default)]
pub(crate) struct Counters {
    /// Write slots handed out, never more than the page budget
    pub reserved: AtomicUsize,
    /// Writes finished (saved or failed)
    pub pages_completed: AtomicUsize,
    pub pages_written: AtomicUsize,
    pub page_failures: AtomicUsize,
    pub images_attempted: AtomicUsize,
    pub images_saved: AtomicUsize,
    pub image_failures: AtomicUsize,
    /// Crawl and write jobs submitted but not finished
    pub pending: AtomicUsize,
}

// Read-only copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CrawlStats {
    pub urls_discovered: usize,
    pub pages_written: usize,
    pub page_failures: usize,
    pub images_found: usize,
    pub images_saved: usize,
    pub image_failures: usize,
}

#[derive(Debug, Default)]
struct Stopwatch {
    started: Option<Instant>,
    frozen: Option<Duration>,
}

impl Stopwatch {
    // A frozen stopwatch stays frozen
    fn start(&mut self) {
        if self.frozen.is_none() {
            self.started = Some(Instant::now());
        }
    }

    fn freeze(&mut self) {
        if self.frozen.is_none() {
            self.frozen = Some(self.elapsed());
        }
    }

    fn is_running(&self) -> bool {
        self.started.is_some() && self.frozen.is_none()
    }

    fn elapsed(&self) -> Duration {
        match (self.frozen, self.started) {
            (Some(frozen), _) => frozen,
            (None, Some(started)) => started.elapsed(),
            (None, None) => Duration::ZERO,
        }
    }
}

pub(crate) struct CrawlShared {
    pub config: CrawlConfig,
    /// The seed as the url crate prints it; what links to it resolve to
    pub seed: String,
    pub location: ArchiveLocation,
    pub client: Client,
    pub observer: Arc<dyn CrawlObserver>,
    pub frontier: Frontier,
    pub images: UniqueImageList,
    pub counters: Counters,
    crawl_pool: WorkerPool,
    write_pool: WorkerPool,
    image_pool: WorkerPool,
    phase: watch::Sender<Phase>,
    /// Runtime the crawl runs on; set by init()
    runtime: OnceLock<Handle>,
    html_clock: Mutex<Stopwatch>,
    image_clock: Mutex<Stopwatch>,
    started_at: Mutex<Option<DateTime<Local>>>,
}

impl CrawlShared {
    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    // Schedules a page for crawling; the caller has already passed the frontier
    pub fn submit_crawl(self: &Arc<Self>, url: String) {
        self.counters.pending.fetch_add(1, Ordering::SeqCst);
        let shared = Arc::clone(self);
        if !self.crawl_pool.submit(crawl_page(shared, url)) {
            self.counters.pending.fetch_sub(1, Ordering::SeqCst);
        }
    }

    pub fn submit_write(self: &Arc<Self>, page: ArchivedPage) {
        self.counters.pending.fetch_add(1, Ordering::SeqCst);
        let shared = Arc::clone(self);
        if !self.write_pool.submit(write_page(shared, page)) {
            self.counters.pending.fetch_sub(1, Ordering::SeqCst);
        }
    }

    // Called at the end of every crawl and write job
    //
    // If this was the last outstanding job, nothing can ever schedule more
    // work, so the HTML phase is over even though the budget wasn't reached.
    pub fn job_finished(self: &Arc<Self>) {
        if self.counters.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.end_html_phase("no more pages to crawl");
        }
    }

    // Logs a recovered failure; also shows it to the operator in stacktrace mode
    pub fn recovered(&self, error: &ArchiveError) {
        warn!(error = %error, "recovered failure");
        if self.config.stacktrace {
            self.observer.report(&error.to_string(), Severity::Error);
        }
    }

    // Leaves the HTML phase, at most once per crawl
    //
    // Returns false when the phase had already moved on.
    pub fn end_html_phase(self: &Arc<Self>, reason: &str) -> bool {
        let next = if self.config.download_images {
            Phase::DownloadingImages
        } else {
            Phase::ShutdownRequested
        };

        let won = self.phase.send_if_modified(|phase| {
            if *phase == Phase::CrawlingHtml {
                *phase = next;
                true
            } else {
                false
            }
        });
        if !won {
            return false;
        }

        self.crawl_pool.shutdown_now();
        self.write_pool.shutdown_now();
        self.html_clock.lock().freeze();
        info!(reason, pages = self.counters.pages_completed.load(Ordering::SeqCst), "html phase finished");

        let Some(runtime) = self.runtime.get() else {
            // Unreachable: the phase only becomes CrawlingHtml after init() saved the handle
            warn!("no runtime to finish the crawl on");
            return true;
        };
        let shared = Arc::clone(self);
        if self.config.download_images {
            runtime.spawn(async move { shared.run_image_phase().await });
        } else {
            runtime.spawn(async move { shared.finish().await });
        }
        true
    }

    // Supervisor for the image phase
    async fn run_image_phase(self: Arc<Self>) {
        self.image_clock.lock().start();

        let urls = self.images.snapshot();
        info!(images = urls.len(), "starting image downloads");
        self.observer.report(
            &format!("html crawl finished -> downloading {} images", urls.len()),
            Severity::Output,
        );

        for url in urls {
            let shared = Arc::clone(&self);
            if !self.image_pool.submit(download_image(shared, url)) {
                break;
            }
        }
        self.image_pool.shutdown();
        self.image_pool.await_termination().await;

        self.image_clock.lock().freeze();
        self.finish().await;
    }

    // Final bookkeeping; runs exactly once, from whoever ended the last phase
    async fn finish(&self) {
        self.html_clock.lock().freeze();
        self.image_clock.lock().freeze();
        let html_elapsed = self.html_clock.lock().elapsed();
        let image_elapsed = self.image_clock.lock().elapsed();

        let log = CrawlLog {
            root_url: self.config.root_url.clone(),
            started_at: self.started_at.lock().unwrap_or_else(Local::now),
            finished_at: Local::now(),
            html_seconds: html_elapsed.as_secs_f64(),
            image_seconds: image_elapsed.as_secs_f64(),
            pages_written: self.counters.pages_written.load(Ordering::SeqCst),
            page_failures: self.counters.page_failures.load(Ordering::SeqCst),
            images_saved: self.counters.images_saved.load(Ordering::SeqCst),
            image_failures: self.counters.image_failures.load(Ordering::SeqCst),
            html_folder: self.location.html_folder().to_path_buf(),
        };
        if let Err(e) = write_crawl_log(self.location.home_folder(), &log).await {
            warn!(error = %e, "failed to write crawl log");
            self.observer.report("failed to log crawl", Severity::Error);
        }

        notify_archive(self.observer.as_ref(), &self.location);
        self.observer.report(
            &format!(
                "crawl executed in {:.1} s -> {} pages, {} images",
                (html_elapsed + image_elapsed).as_secs_f64(),
                log.pages_written,
                log.images_saved
            ),
            Severity::Output,
        );

        self.phase.send_replace(Phase::Completed);
    }

    fn snapshot(&self, kind: ProgressKind) -> ProgressSnapshot {
        match kind {
            ProgressKind::Html => ProgressSnapshot::compute(
                kind,
                self.html_clock.lock().elapsed(),
                self.counters.pages_completed.load(Ordering::SeqCst),
                self.config.page_budget,
                self.location.html_folder(),
            ),
            ProgressKind::Images => ProgressSnapshot::compute(
                kind,
                self.image_clock.lock().elapsed(),
                self.counters.images_attempted.load(Ordering::SeqCst),
                self.images.len(),
                self.location.images_folder(),
            ),
        }
    }
}

// Public handle to one crawl
//
// Example:
//   let crawler = Crawler::new(config, Arc::new(ConsoleObserver))?;
//   crawler.init().await;
//   crawler.wait_for_completion().await;
pub struct Crawler {
    shared: Arc<CrawlShared>,
}

impl Crawler {
    // Validates the config and prepares the archive folders
    //
    // Fails with InvalidConfig, InvalidSeedUrl or DirectoryInitFailed; no
    // network traffic happens here.
    pub fn new(config: CrawlConfig, observer: Arc<dyn CrawlObserver>) -> Result<Self> {
        config.validate()?;
        let location = ArchiveLocation::open(&config.root_url, &config.base_dir)?;
        let client = build_client(&config)?;
        let seed = Url::parse(&config.root_url)
            .map_err(|e| ArchiveError::InvalidSeedUrl {
                url: config.root_url.clone(),
                reason: e.to_string(),
            })?
            .to_string();

        let workers = config.workers;
        let (phase, _) = watch::channel(Phase::Created);

        observer.report("ready -> init to start crawling", Severity::Output);

        Ok(Self {
            shared: Arc::new(CrawlShared {
                config,
                seed,
                location,
                client,
                observer,
                frontier: Frontier::new(),
                images: UniqueImageList::new(),
                counters: Counters::default(),
                crawl_pool: WorkerPool::new("crawl", workers),
                write_pool: WorkerPool::new("write", workers),
                image_pool: WorkerPool::new("image", workers),
                phase,
                runtime: OnceLock::new(),
                html_clock: Mutex::new(Stopwatch::default()),
                image_clock: Mutex::new(Stopwatch::default()),
                started_at: Mutex::new(None),
            }),
        })
    }

    // Starts the crawl
    //
    // Records the seed URL, downloads the seed page's stylesheets, then hands
    // the seed to the crawl pool. Returns once crawling is under way.
    pub async fn init(&self) {
        let shared = &self.shared;
        let _ = shared.runtime.set(Handle::current());
        let started = shared.phase.send_if_modified(|phase| {
            if *phase == Phase::Created {
                *phase = Phase::CrawlingHtml;
                true
            } else {
                false
            }
        });
        if !started {
            shared.observer.report("crawler is already initialized", Severity::Warning);
            return;
        }

        *shared.started_at.lock() = Some(Local::now());
        if let Err(e) = write_seed_url(shared.location.home_folder(), &shared.seed).await {
            warn!(error = %e, "failed to write seed record");
            shared.observer.report(&format!("failed to record seed url: {}", e), Severity::Error);
        }

        let stylesheets = prefetch_stylesheets(shared).await;
        debug!(stylesheets, "stylesheet prefetch done");

        // shutdown() may have ended the crawl while we were downloading
        if shared.phase() != Phase::CrawlingHtml {
            debug!("crawl stopped during setup");
            return;
        }

        shared.html_clock.lock().start();
        shared
            .observer
            .report("root dependencies setup finished -> crawl initiated", Severity::Output);
        info!(root = %shared.config.root_url, workers = shared.config.workers, budget = shared.config.page_budget, "crawl started");

        let root = shared.seed.clone();
        shared.frontier.try_enqueue(&root);
        shared.submit_crawl(root);
    }

    // Stops the crawl
    //
    // During the HTML phase this aborts crawl and write workers and moves on
    // to images (if requested) or completion. During the image phase it
    // aborts the image workers. Anything later is a no-op that reports
    // "already shut down". Never blocks, and works from threads outside the
    // tokio runtime.
    pub fn shutdown(&self) -> ShutdownOutcome {
        let shared = &self.shared;

        match shared.phase() {
            Phase::Created => {
                shared.observer.report("crawler has not been initialized", Severity::Warning);
                return ShutdownOutcome::NotInitialized;
            }
            Phase::CrawlingHtml => {
                if shared.end_html_phase("shutdown requested") {
                    shared.observer.report("shutdown invoked", Severity::Output);
                    return ShutdownOutcome::Initiated;
                }
            }
            Phase::DownloadingImages => {
                let won = shared.phase.send_if_modified(|phase| {
                    if *phase == Phase::DownloadingImages {
                        *phase = Phase::ShutdownRequested;
                        true
                    } else {
                        false
                    }
                });
                if won {
                    shared.image_pool.shutdown_now();
                    shared.observer.report("shutdown invoked", Severity::Output);
                    return ShutdownOutcome::Initiated;
                }
            }
            Phase::ShutdownRequested | Phase::Completed => {}
        }

        shared.observer.report("crawler is already shutdown", Severity::Warning);
        ShutdownOutcome::AlreadyShutdown
    }

    // Resolves once the crawl has reached Completed
    pub async fn wait_for_completion(&self) {
        let mut rx = self.shared.phase.subscribe();
        // The sender lives in self, so the channel can't close under us
        let _ = rx.wait_for(|phase| *phase == Phase::Completed).await;
    }

    pub fn phase(&self) -> Phase {
        self.shared.phase()
    }

    pub fn is_html_running(&self) -> bool {
        self.shared.html_clock.lock().is_running()
    }

    pub fn location(&self) -> &ArchiveLocation {
        &self.shared.location
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.shared.config
    }

    // Progress for one phase; None for images when they weren't requested
    pub fn snapshot(&self, kind: ProgressKind) -> Option<ProgressSnapshot> {
        if kind == ProgressKind::Images && !self.shared.config.download_images {
            return None;
        }
        Some(self.shared.snapshot(kind))
    }

    pub fn stats(&self) -> CrawlStats {
        let counters = &self.shared.counters;
        CrawlStats {
            urls_discovered: self.shared.frontier.len(),
            pages_written: counters.pages_written.load(Ordering::SeqCst),
            page_failures: counters.page_failures.load(Ordering::SeqCst),
            images_found: self.shared.images.len(),
            images_saved: counters.images_saved.load(Ordering::SeqCst),
            image_failures: counters.image_failures.load(Ordering::SeqCst),
        }
    }

    // Reports progress through the observer
    //
    // kind = None prints both phases (images only if requested).
    pub fn print_status(&self, kind: Option<ProgressKind>) {
        let observer = &self.shared.observer;
        if self.phase() == Phase::Created {
            observer.report("crawler has not been initialized", Severity::Warning);
            return;
        }

        let kinds = match kind {
            Some(kind) => vec![kind],
            None if self.shared.config.download_images => vec![ProgressKind::Html, ProgressKind::Images],
            None => vec![ProgressKind::Html],
        };

        for kind in kinds {
            match self.snapshot(kind) {
                Some(snapshot) => observer.report(&snapshot.to_string(), Severity::Output),
                None => observer.report(
                    "crawler has not been instructed to crawl for images",
                    Severity::Warning,
                ),
            }
        }
    }
}
