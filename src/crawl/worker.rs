// src/crawl/worker.rs
// =============================================================================
// The two jobs of the HTML phase.
//
// crawl_page (one per unique URL):
// 1. Fetch the page
// 2. Rewrite links, stylesheets and images to local paths
// 3. Schedule every new in-scope link through the frontier
// 4. Remember the images for the image phase
// 5. Hand the rewritten page to the write pool
//
// write_page (one per fetched page):
// - Takes a write slot if the page budget has room and saves the page
// - The job that completes the last slot ends the HTML phase
//
// Crawling doesn't stop at the budget on its own: pages past the budget
// are still fetched and their links followed until the phase ends, so the
// link graph of the written pages is complete.
// =============================================================================

use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, trace};

use super::crawler::CrawlShared;
use crate::error::ArchiveError;
use crate::fetch::fetch_page;
use crate::html::rewrite_page;
use crate::urls::html_file_name;

// A rewritten page waiting to be saved
#[derive(Debug, Clone)]
pub struct ArchivedPage {
    /// The URL it was crawled as; names the file
    pub url: String,
    pub html: String,
}

pub(crate) async fn crawl_page(shared: Arc<CrawlShared>, url: String) {
    if let Err(e) = crawl_and_rewrite(&shared, &url).await {
        shared.counters.page_failures.fetch_add(1, Ordering::SeqCst);
        shared.recovered(&e);
    }
    shared.job_finished();
}

async fn crawl_and_rewrite(shared: &Arc<CrawlShared>, url: &str) -> Result<(), ArchiveError> {
    let page = fetch_page(&shared.client, url).await?;
    trace!(url, bytes = page.body.len(), "fetched page");

    let rewritten = rewrite_page(
        &page.body,
        &page.location,
        &shared.config.root_url,
        shared.config.download_images,
    )
    .map_err(|e| ArchiveError::FetchFailed {
        url: url.to_string(),
        reason: format!("could not rewrite html: {}", e),
    })?;

    let mut scheduled = 0;
    for link in rewritten.links {
        if shared.frontier.try_enqueue(&link) {
            shared.submit_crawl(link);
            scheduled += 1;
        }
    }
    for image in &rewritten.images {
        shared.images.push(image);
    }
    debug!(url, scheduled, images = rewritten.images.len(), "crawled page");

    shared.submit_write(ArchivedPage {
        url: url.to_string(),
        html: rewritten.html,
    });
    Ok(())
}

pub(crate) async fn write_page(shared: Arc<CrawlShared>, page: ArchivedPage) {
    let budget = shared.config.page_budget;

    // Hand out at most `budget` slots, even with many writers racing
    let slot = shared
        .counters
        .reserved
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |taken| {
            (taken < budget).then_some(taken + 1)
        });

    match slot {
        Ok(_) => {
            let path = shared.location.html_folder().join(html_file_name(&page.url));
            match tokio::fs::write(&path, page.html).await {
                Ok(()) => {
                    shared.counters.pages_written.fetch_add(1, Ordering::SeqCst);
                    trace!(url = %page.url, path = %path.display(), "wrote page");
                }
                Err(e) => {
                    shared.counters.page_failures.fetch_add(1, Ordering::SeqCst);
                    shared.recovered(&ArchiveError::Io(e));
                }
            }

            let completed = shared.counters.pages_completed.fetch_add(1, Ordering::SeqCst) + 1;
            if completed == budget {
                shared.end_html_phase("page budget reached");
            }
        }
        Err(_) => {
            // Budget used up. Only stop once every reserved write is done,
            // otherwise we'd abort a write that still counts.
            if shared.counters.pages_completed.load(Ordering::SeqCst) >= budget {
                shared.end_html_phase("page budget reached");
            }
        }
    }

    shared.job_finished();
}
