// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - crawl: archive a site
// - inspect: show what an archived day folder contains (seed + crawl log)
// =============================================================================

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "site-archiver",
    version = "0.1.0",
    about = "Crawl a website and archive it for offline browsing",
    long_about = "site-archiver crawls pages reachable from a seed URL with a bounded number of workers, \
                  rewrites them to point at local copies, and stores them under \
                  domains/<NAME>/<YEAR>/<MONTH>/<DAY>."
)]
pub struct Cli {
    /// Log debug details (same as RUST_LOG=site_archiver=debug)
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Archive a website
    ///
    /// Example: site-archiver crawl https://www.example.com --workers 4 --pages 200 --images
    Crawl {
        /// Seed URL; must contain "www" and at least two dots
        url: String,

        /// Workers per pool (1-10)
        #[arg(long, short = 'w', default_value_t = 4)]
        workers: usize,

        /// Number of pages to archive
        #[arg(long, short = 'p', default_value_t = 100)]
        pages: usize,

        /// Also download images once the pages are done
        #[arg(long)]
        images: bool,

        /// Print every page/image failure, not just a count
        #[arg(long)]
        stacktrace: bool,

        /// Folder that holds (or will hold) the "domains" tree
        #[arg(long, default_value = ".")]
        base_dir: PathBuf,

        /// Send requests for HOST to ADDR, e.g. www.example.com=127.0.0.1:8080
        #[arg(long, value_parser = parse_resolve)]
        resolve: Vec<(String, SocketAddr)>,

        /// Print progress every N seconds
        #[arg(long)]
        status_every: Option<u64>,
    },

    /// Show the seed URL and crawl log of an archived day folder
    ///
    /// Example: site-archiver inspect "domains/EXAMPLE/2026/OCTOBER/16TH, FRI"
    Inspect {
        day_folder: PathBuf,

        /// Output the crawl log as JSON
        #[arg(long)]
        json: bool,
    },
}

// Parses "host=ip:port"
fn parse_resolve(value: &str) -> Result<(String, SocketAddr), String> {
    let (host, addr) = value
        .split_once('=')
        .ok_or_else(|| format!("expected HOST=ADDR, got '{}'", value))?;
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| format!("invalid address '{}': {}", addr, e))?;
    Ok((host.to_string(), addr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crawl_defaults() {
        let cli = Cli::parse_from(["site-archiver", "crawl", "https://www.example.com"]);
        match cli.command {
            Commands::Crawl { url, workers, pages, images, .. } => {
                assert_eq!(url, "https://www.example.com");
                assert_eq!(workers, 4);
                assert_eq!(pages, 100);
                assert!(!images);
            }
            _ => panic!("expected crawl"),
        }
    }

    #[test]
    fn test_parse_resolve() {
        let cli = Cli::parse_from([
            "site-archiver",
            "crawl",
            "http://www.example.com",
            "--resolve",
            "www.example.com=127.0.0.1:8080",
        ]);
        match cli.command {
            Commands::Crawl { resolve, .. } => {
                assert_eq!(resolve.len(), 1);
                assert_eq!(resolve[0].0, "www.example.com");
                assert_eq!(resolve[0].1.port(), 8080);
            }
            _ => panic!("expected crawl"),
        }
        assert!(parse_resolve("no-equals-sign").is_err());
        assert!(parse_resolve("host=not-an-addr").is_err());
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is value_parser?
//    - clap calls our function on the raw text of each --resolve flag
//    - Returning Err(String) makes clap print the message and exit
//    - Vec<...> as the field type lets the flag appear many times
// -----------------------------------------------------------------------------
