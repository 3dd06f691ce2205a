// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = pages archived, 1 = nothing archived, 2 = error)
//
// Ctrl-C during a crawl calls Crawler::shutdown(): the first press ends the
// page phase (images still download if requested), a second one aborts
// the image downloads.
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval};

use site_archiver::archive::{read_crawl_log, read_seed_url};
use site_archiver::logging::init_logging;
use site_archiver::{ConsoleObserver, CrawlConfig, Crawler};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Crawl {
            url,
            workers,
            pages,
            images,
            stacktrace,
            base_dir,
            resolve,
            status_every,
        } => {
            let mut config = CrawlConfig::new(url, workers, pages, images)
                .with_base_dir(base_dir)
                .with_stacktrace(stacktrace);
            config.resolve = resolve;
            handle_crawl(config, status_every).await
        }
        Commands::Inspect { day_folder, json } => handle_inspect(&day_folder, json),
    }
}

// Handles the 'crawl' subcommand
async fn handle_crawl(config: CrawlConfig, status_every: Option<u64>) -> Result<i32> {
    println!("🔍 Archiving: {}", config.root_url);
    println!("📊 Workers: {}, page budget: {}, images: {}", config.workers, config.page_budget, config.download_images);

    let crawler = Crawler::new(config, Arc::new(ConsoleObserver)).context("could not set up crawl")?;
    println!("📁 Archive folder: {}", crawler.location().home_folder().display());

    crawler.init().await;

    let mut ticker = status_every
        .filter(|secs| *secs > 0)
        .map(|secs| {
            let period = Duration::from_secs(secs);
            interval_at(Instant::now() + period, period)
        });

    let completion = crawler.wait_for_completion();
    tokio::pin!(completion);

    loop {
        tokio::select! {
            _ = &mut completion => break,
            _ = tokio::signal::ctrl_c() => {
                crawler.shutdown();
            }
            _ = next_tick(&mut ticker) => crawler.print_status(None),
        }
    }

    crawler.print_status(None);
    let stats = crawler.stats();

    println!();
    println!("📊 Summary:");
    println!("   📄 Pages written: {}", stats.pages_written);
    println!("   ❌ Page failures: {}", stats.page_failures);
    println!("   🔗 URLs discovered: {}", stats.urls_discovered);
    if crawler.config().download_images {
        println!("   🖼️  Images saved: {}/{}", stats.images_saved, stats.images_found);
        println!("   ❌ Image failures: {}", stats.image_failures);
    }

    Ok(if stats.pages_written > 0 { 0 } else { 1 })
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

// Handles the 'inspect' subcommand
fn handle_inspect(day_folder: &Path, json: bool) -> Result<i32> {
    let seed = read_seed_url(day_folder)
        .with_context(|| format!("no seed record in {}", day_folder.display()))?;
    let log = read_crawl_log(day_folder)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&log)?);
        return Ok(0);
    }

    println!("🔗 Seed: {}", seed);
    println!("📄 Start page: {}", start_page(day_folder, &seed).display());
    match log {
        Some(log) => {
            println!("🕒 Started:  {}", log.started_at.format("%Y-%m-%d %H:%M:%S"));
            println!("🕒 Finished: {}", log.finished_at.format("%Y-%m-%d %H:%M:%S"));
            println!("   HTML: {:.1} s, images: {:.1} s", log.html_seconds, log.image_seconds);
            println!("   Pages written: {} ({} failed)", log.pages_written, log.page_failures);
            println!("   Images saved: {} ({} failed)", log.images_saved, log.image_failures);
        }
        None => println!("⚠️  No crawl log: the crawl never finished"),
    }
    Ok(0)
}

fn start_page(day_folder: &Path, seed: &str) -> PathBuf {
    day_folder
        .join("html")
        .join(site_archiver::urls::html_file_name(seed))
}
