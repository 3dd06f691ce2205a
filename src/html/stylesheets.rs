// src/html/stylesheets.rs
// =============================================================================
// Finds the stylesheets a page links to.
//
// Used once, before the crawl starts, to download the seed page's CSS into
// the archive. We only read the document here, so scraper is enough.
// =============================================================================

use scraper::{Html, Selector};
use url::Url;

use super::rewrite::is_stylesheet_rel;
use crate::urls::resolve_url;

// Extracts the absolute URL of every <link rel="stylesheet" href=...>
//
// Example:
//   html = r#"<link rel="stylesheet" href="/main.css">"#
//   base = "https://www.example.com/"
//   result = ["https://www.example.com/main.css"]
pub fn extract_stylesheet_urls(html: &str, base: &Url) -> Vec<String> {
    let document = Html::parse_document(html);

    // Constant selector, known to be valid
    let selector = Selector::parse("link[rel][href]").unwrap();

    let mut urls = Vec::new();
    for element in document.select(&selector) {
        let rel = element.value().attr("rel").unwrap_or("");
        if !is_stylesheet_rel(rel) {
            continue;
        }
        if let Some(absolute) = element.value().attr("href").and_then(|href| resolve_url(base, href)) {
            if !urls.contains(&absolute) {
                urls.push(absolute);
            }
        }
    }

    urls
}
