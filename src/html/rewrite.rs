// src/html/rewrite.rs
// =============================================================================
// Rewrites a downloaded page so it works offline.
//
// Every reference that will exist in the archive is pointed at its local
// copy, named by the hash of its absolute URL:
//
//   <a href="/about">                 -> <a href="-1234.html">
//   <link rel="stylesheet" href=..>   -> href="../assets/css/5678.css"
//   <img src="cat.png">               -> src="../assets/images/91011.png"
//
// Because names only depend on the target URL, pages link to each other
// correctly no matter which order they were crawled in.
//
// We use lol_html, a streaming rewriter, because scraper's DOM is read-only.
// The rewriter is not Send, so all of this stays in one synchronous call.
// =============================================================================

use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, RewriteStrSettings};
use std::cell::RefCell;
use url::Url;

use crate::urls::{
    convert_srcset_to_url, css_file_name, extension_type, html_file_name, image_file_name,
    resolve_url, NO_CONTENT_TYPE,
};

// What a crawl worker gets back from rewriting one page
#[derive(Debug, Clone, Default)]
pub struct RewrittenPage {
    /// The page with every href/src pointing at local files
    pub html: String,
    /// In-scope links to crawl next (absolute, may contain duplicates)
    pub links: Vec<String>,
    /// Absolute image URLs with an accepted extension
    pub images: Vec<String>,
}

// Rewrites one page
//
// Parameters:
//   html: raw page text
//   page_url: where the page came from (base for relative links)
//   root_page: the seed URL; links that don't contain it aren't followed
//   rewrite_images: whether <img>/<picture> sources should be localised
pub fn rewrite_page(
    html: &str,
    page_url: &Url,
    root_page: &str,
    rewrite_images: bool,
) -> Result<RewrittenPage, lol_html::errors::RewritingError> {
    let links = RefCell::new(Vec::new());
    let images = RefCell::new(Vec::new());

    let mut handlers = vec![
        element!("a[href]", |el| {
            let href = el.get_attribute("href").unwrap_or_default();
            let absolute = resolve_url(page_url, &href).unwrap_or_default();

            el.set_attribute("href", &html_file_name(&absolute))?;

            // Fragment-only links and anything outside the seed stay local-only.
            // The seed check is a plain substring test on purpose.
            if href.trim_start().starts_with('#') || !absolute.contains(root_page) {
                return Ok(());
            }

            links.borrow_mut().push(absolute);
            Ok(())
        }),
        element!("link[href]", |el| {
            let rel = el.get_attribute("rel").unwrap_or_default();
            if !is_stylesheet_rel(&rel) {
                return Ok(());
            }

            let href = el.get_attribute("href").unwrap_or_default();
            let absolute = resolve_url(page_url, &href).unwrap_or_default();
            el.set_attribute("href", &format!("../assets/css/{}", css_file_name(&absolute)))?;
            Ok(())
        }),
    ];

    if rewrite_images {
        handlers.push(element!("img", |el| {
            let Some(raw) = pick_image_source(el.get_attribute("src"), el.get_attribute("srcset"))
            else {
                return Ok(());
            };

            match localise_image(page_url, &raw) {
                Some((absolute, local)) => {
                    el.set_attribute("src", &local)?;
                    images.borrow_mut().push(absolute);
                }
                None => {
                    el.set_attribute("src", &raw)?;
                    el.set_attribute("alt", &format!("{} found", NO_CONTENT_TYPE))?;
                }
            }
            el.remove_attribute("srcset");
            Ok(())
        }));

        // <picture><source srcset> becomes a plain <img>
        handlers.push(element!("picture source", |el| {
            let Some(raw) = pick_image_source(el.get_attribute("src"), el.get_attribute("srcset"))
            else {
                return Ok(());
            };

            let replacement = match localise_image(page_url, &raw) {
                Some((absolute, local)) => {
                    images.borrow_mut().push(absolute);
                    format!(r#"<img src="{}">"#, escape_attribute(&local))
                }
                None => format!(
                    r#"<img src="{}" alt="{} found">"#,
                    escape_attribute(&raw),
                    NO_CONTENT_TYPE
                ),
            };
            el.replace(&replacement, ContentType::Html);
            Ok(())
        }));
    }

    let output = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::default()
        },
    )?;

    Ok(RewrittenPage {
        html: output,
        links: links.into_inner(),
        images: images.into_inner(),
    })
}

// rel can hold several tokens, e.g. "stylesheet preload"
pub fn is_stylesheet_rel(rel: &str) -> bool {
    rel.split_ascii_whitespace()
        .any(|token| token.eq_ignore_ascii_case("stylesheet"))
}

// Chooses which attribute an image element should be downloaded from
//
// - only src set      -> src
// - only srcset set   -> first srcset candidate
// - both set          -> first srcset candidate
// - neither           -> None
fn pick_image_source(src: Option<String>, srcset: Option<String>) -> Option<String> {
    let src = src.unwrap_or_default();
    let srcset = srcset.unwrap_or_default();

    if src.is_empty() && srcset.is_empty() {
        return None;
    }
    if srcset.is_empty() {
        return Some(src);
    }

    let first = convert_srcset_to_url(srcset.trim());
    if first.is_empty() {
        None
    } else {
        Some(first)
    }
}

// Returns (absolute url, local path) when the image can be archived
fn localise_image(page_url: &Url, raw: &str) -> Option<(String, String)> {
    let absolute = resolve_url(page_url, raw)?;
    let extension = extension_type(&absolute)?;
    let local = format!("../assets/images/{}", image_file_name(&absolute, &extension));
    Some((absolute, local))
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
